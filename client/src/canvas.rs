use std::cell::{Cell, RefCell};
use std::rc::Rc;

use geo_types::{Coord, Geometry, LineString, Polygon, Rect};
use gridatlas_shared::hit;
use gridatlas_shared::{LatLng, MapView, PathStyle, RenderedFeature};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, CanvasWindingRule, HtmlCanvasElement, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::app::{FeaturePopup, SelectedFeature, SiteProbe, SiteProbeState, TilesLoaded};
use crate::loader;
use crate::render_loop::RenderScheduler;
use crate::tiles::TileCache;
use crate::viewport::Viewport;

const BACKGROUND: &str = "#dddddd";
const POINT_RADIUS: f64 = 5.0;
const POINT_FILL_OPACITY: f64 = 0.8;
const HIT_SLOP: f64 = 3.0;
const CLICK_MOVE_TOLERANCE: f64 = 5.0;
const SELECTED_BRIGHTEN: f64 = 1.25;

/// Base tiles and overlay features on a 2D canvas, with drag-to-pan,
/// wheel zoom, click popups and right-click site scoring.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let map_view: RwSignal<MapView> = expect_context();
    let viewport: RwSignal<Viewport> = expect_context();
    let SelectedFeature(selected) = expect_context();
    let SiteProbe(site_probe) = expect_context();
    let TilesLoaded(tiles_loaded) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let is_dragging = Rc::new(Cell::new(false));
    let drag_start = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last_pos = Rc::new(Cell::new((0.0f64, 0.0f64)));

    let tile_cache = Rc::new(RefCell::new(TileCache::new(tiles_loaded)));
    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let scheduler = RenderScheduler::new({
        let tile_cache = tile_cache.clone();
        move || {
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let canvas: &HtmlCanvasElement = &canvas;
            let vp = viewport.get_untracked();
            if vp.width <= 0.0 || vp.height <= 0.0 {
                return;
            }

            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0)
                .max(1.0);
            let pixel_w = (vp.width * dpr).round() as u32;
            let pixel_h = (vp.height * dpr).round() as u32;
            if canvas.width() != pixel_w || canvas.height() != pixel_h {
                canvas.set_width(pixel_w);
                canvas.set_height(pixel_h);
                cached_ctx.borrow_mut().take();
            }

            let mut ctx_slot = cached_ctx.borrow_mut();
            if ctx_slot.is_none() {
                *ctx_slot = context_2d(canvas);
            }
            let Some(ctx) = ctx_slot.as_ref() else {
                return;
            };
            let _ = ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

            let selected = selected.get_untracked();
            map_view.with_untracked(|view| {
                draw_scene(
                    ctx,
                    &vp,
                    view,
                    &mut tile_cache.borrow_mut(),
                    selected.as_ref(),
                );
            });
        }
    });
    let scheduler = Rc::new(scheduler);

    let sched_state = scheduler.clone();
    Effect::new(move || {
        let _ = canvas_ref.get();
        map_view.track();
        viewport.track();
        tiles_loaded.track();
        selected.track();
        sched_state.mark_dirty();
    });

    let local_point = move |client_x: i32, client_y: i32| -> (f64, f64) {
        canvas_ref
            .get_untracked()
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                (client_x as f64 - rect.left(), client_y as f64 - rect.top())
            })
            .unwrap_or((client_x as f64, client_y as f64))
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (x, y) = local_point(e.client_x(), e.client_y());
        let delta = e.delta_y();
        viewport.update(|vp| vp.zoom_at(delta, x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            is_dragging.set(true);
            let pos = (e.client_x() as f64, e.client_y() as f64);
            drag_start.set(pos);
            last_pos.set(pos);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            if is_dragging.get() {
                let (lx, ly) = last_pos.get();
                let (x, y) = (e.client_x() as f64, e.client_y() as f64);
                last_pos.set((x, y));
                viewport.update(|vp| vp.pan(x - lx, y - ly));
                return;
            }

            let (x, y) = local_point(e.client_x(), e.client_y());
            let vp = viewport.get_untracked();
            let over_feature =
                map_view.with_untracked(|view| feature_at(view, &vp, (x, y)).is_some());
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                let cursor = if over_feature { "pointer" } else { "grab" };
                el.style().set_property("cursor", cursor).ok();
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_click = {
        let drag_start = drag_start.clone();
        move |e: MouseEvent| {
            let (sx, sy) = drag_start.get();
            let dx = (e.client_x() as f64 - sx).abs();
            let dy = (e.client_y() as f64 - sy).abs();
            if dx >= CLICK_MOVE_TOLERANCE || dy >= CLICK_MOVE_TOLERANCE {
                return;
            }

            let (x, y) = local_point(e.client_x(), e.client_y());
            let vp = viewport.get_untracked();
            let popup = map_view.with_untracked(|view| {
                let (overlay_index, feature_index) = feature_at(view, &vp, (x, y))?;
                let overlay = &view.overlays[overlay_index];
                let rendered = &overlay.layer.features[feature_index];
                let anchor = match &rendered.feature.geometry {
                    Geometry::Point(p) => LatLng::new(p.y(), p.x()),
                    _ => vp.screen_to_lat_lng(x, y),
                };
                Some(FeaturePopup {
                    kind: overlay.descriptor.kind,
                    index: feature_index,
                    title: overlay.descriptor.title,
                    anchor,
                    content: rendered.popup.clone(),
                })
            });
            selected.set(popup);
        }
    };

    let on_context_menu = move |e: MouseEvent| {
        e.prevent_default();
        let (x, y) = local_point(e.client_x(), e.client_y());
        let site = viewport.get_untracked().screen_to_lat_lng(x, y);
        site_probe.set(Some(SiteProbeState {
            site,
            result: None,
        }));

        wasm_bindgen_futures::spawn_local(async move {
            let result = loader::fetch_site_score(site).await;
            if let Err(e) = &result {
                web_sys::console::warn_1(&format!("Site score failed: {e}").into());
            }
            site_probe.update(|probe| {
                if let Some(probe) = probe
                    && probe.site == site
                {
                    probe.result = Some(result);
                }
            });
        });
    };

    view! {
        <canvas
            node_ref=canvas_ref
            style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:click=on_click
            on:contextmenu=on_context_menu
        />
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

fn draw_scene(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    view: &MapView,
    tiles: &mut TileCache,
    selected: Option<&FeaturePopup>,
) {
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, vp.width, vp.height);

    if let Some(base) = view.control.active_base() {
        let z = vp.tile_zoom(base.max_zoom);
        for placement in vp.visible_tiles(z) {
            if let Some(image) = tiles.get_or_load(&base.tile_url(placement.id)) {
                let (x, y, size) = vp.tile_screen_rect(&placement, z);
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                    &image, x, y, size, size,
                );
            }
        }
        tiles.prune();
    }

    ctx.set_line_join("round");
    ctx.set_line_cap("round");
    for overlay in view.visible_overlays() {
        for (index, rendered) in overlay.layer.features.iter().enumerate() {
            if !on_screen(vp, rendered.bounds.as_ref()) {
                continue;
            }
            let is_selected =
                selected.is_some_and(|s| s.kind == overlay.descriptor.kind && s.index == index);
            let style = if is_selected {
                highlight(&rendered.style)
            } else {
                rendered.style
            };
            draw_geometry(ctx, vp, &rendered.feature.geometry, &style);
        }
    }
}

fn highlight(style: &PathStyle) -> PathStyle {
    PathStyle {
        color: style.color.brighten(SELECTED_BRIGHTEN),
        weight: style.weight + 2.0,
        opacity: 1.0,
        ..*style
    }
}

/// Whether a lon/lat bounding box intersects the screen.
fn on_screen(vp: &Viewport, bounds: Option<&Rect<f64>>) -> bool {
    let Some(bounds) = bounds else {
        return false;
    };
    let (x0, y0) = vp.coord_to_screen(Coord {
        x: bounds.min().x,
        y: bounds.max().y,
    });
    let (x1, y1) = vp.coord_to_screen(Coord {
        x: bounds.max().x,
        y: bounds.min().y,
    });
    let margin = POINT_RADIUS + HIT_SLOP;
    x1 >= -margin && y1 >= -margin && x0 <= vp.width + margin && y0 <= vp.height + margin
}

fn draw_geometry(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    geometry: &Geometry<f64>,
    style: &PathStyle,
) {
    match geometry {
        Geometry::Point(p) => draw_point(ctx, vp, p.0, style),
        Geometry::MultiPoint(mp) => {
            for p in &mp.0 {
                draw_point(ctx, vp, p.0, style);
            }
        }
        Geometry::Line(line) => {
            ctx.begin_path();
            trace_path(ctx, vp, &LineString::from(vec![line.start, line.end]), false);
            stroke(ctx, style);
        }
        Geometry::LineString(ls) => {
            ctx.begin_path();
            trace_path(ctx, vp, ls, false);
            stroke(ctx, style);
        }
        Geometry::MultiLineString(mls) => {
            ctx.begin_path();
            for ls in &mls.0 {
                trace_path(ctx, vp, ls, false);
            }
            stroke(ctx, style);
        }
        Geometry::Polygon(poly) => draw_polygons(ctx, vp, std::slice::from_ref(poly), style),
        Geometry::MultiPolygon(mp) => draw_polygons(ctx, vp, &mp.0, style),
        Geometry::Rect(r) => draw_polygons(ctx, vp, &[r.to_polygon()], style),
        Geometry::Triangle(t) => draw_polygons(ctx, vp, &[t.to_polygon()], style),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                draw_geometry(ctx, vp, g, style);
            }
        }
    }
}

fn draw_point(ctx: &CanvasRenderingContext2d, vp: &Viewport, c: Coord<f64>, style: &PathStyle) {
    let (x, y) = vp.coord_to_screen(c);
    ctx.begin_path();
    if ctx
        .arc(x, y, POINT_RADIUS, 0.0, std::f64::consts::TAU)
        .is_err()
    {
        return;
    }
    ctx.set_fill_style_str(&style.fill_color.rgba_css(POINT_FILL_OPACITY));
    ctx.fill();
    ctx.set_line_width(2.0);
    ctx.set_stroke_style_str(&style.color.rgba_css(style.opacity));
    ctx.stroke();
}

fn draw_polygons(
    ctx: &CanvasRenderingContext2d,
    vp: &Viewport,
    polygons: &[Polygon<f64>],
    style: &PathStyle,
) {
    ctx.begin_path();
    for poly in polygons {
        trace_path(ctx, vp, poly.exterior(), true);
        for hole in poly.interiors() {
            trace_path(ctx, vp, hole, true);
        }
    }
    if style.fill {
        ctx.set_fill_style_str(&style.fill_color.rgba_css(style.fill_opacity));
        ctx.fill_with_canvas_winding_rule(CanvasWindingRule::Evenodd);
    }
    stroke(ctx, style);
}

fn trace_path(ctx: &CanvasRenderingContext2d, vp: &Viewport, path: &LineString<f64>, close: bool) {
    let mut coords = path.0.iter();
    let Some(first) = coords.next() else {
        return;
    };
    let (x, y) = vp.coord_to_screen(*first);
    ctx.move_to(x, y);
    for c in coords {
        let (x, y) = vp.coord_to_screen(*c);
        ctx.line_to(x, y);
    }
    if close {
        ctx.close_path();
    }
}

fn stroke(ctx: &CanvasRenderingContext2d, style: &PathStyle) {
    ctx.set_line_width(style.weight);
    ctx.set_stroke_style_str(&style.color.rgba_css(style.opacity));
    ctx.stroke();
}

/// Topmost visible feature under a screen point, as
/// `(overlay index, feature index)`.
fn feature_at(view: &MapView, vp: &Viewport, p: (f64, f64)) -> Option<(usize, usize)> {
    let project = |c: Coord<f64>| vp.coord_to_screen(c);
    view.overlays
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, overlay)| view.control.is_visible(overlay.descriptor.kind))
        .find_map(|(overlay_index, overlay)| {
            overlay
                .layer
                .features
                .iter()
                .rposition(|rendered| feature_hit(rendered, p, &project))
                .map(|feature_index| (overlay_index, feature_index))
        })
}

fn feature_hit(
    rendered: &RenderedFeature,
    p: (f64, f64),
    project: &impl Fn(Coord<f64>) -> (f64, f64),
) -> bool {
    let tolerance = match rendered.feature.geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => POINT_RADIUS + HIT_SLOP,
        _ => rendered.style.weight / 2.0 + HIT_SLOP,
    };
    hit::hits(&rendered.feature.geometry, p, project, tolerance)
}
