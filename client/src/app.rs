use futures::future::join_all;
use gloo_storage::Storage;
use gridatlas_shared::{
    ControlSnapshot, DatasetDescriptor, DatasetKind, LatLng, LoadError, MapView, PopupContent,
    SiteScore, ViewConfig, initialize,
};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::canvas::MapCanvas;
use crate::layer_control::LayerControlPanel;
use crate::loader;
use crate::popup::{FeaturePopupView, SiteScorePopup};
use crate::viewport::Viewport;

const CONTROL_STORAGE_KEY: &str = "gridatlas_layers";

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

/// The feature whose popup is open.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeaturePopup {
    pub kind: DatasetKind,
    pub index: usize,
    pub title: &'static str,
    pub anchor: LatLng,
    pub content: PopupContent,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SiteProbeState {
    pub site: LatLng,
    /// None while the request is in flight.
    pub result: Option<Result<SiteScore, LoadError>>,
}

#[derive(Clone, Copy)]
pub(crate) struct SelectedFeature(pub RwSignal<Option<FeaturePopup>>);
#[derive(Clone, Copy)]
pub(crate) struct SiteProbe(pub RwSignal<Option<SiteProbeState>>);
/// Bumped whenever a base tile finishes loading.
#[derive(Clone, Copy)]
pub(crate) struct TilesLoaded(pub RwSignal<u64>);

/// Fetch one overlay and store the result in its own layer. A failure is
/// logged and leaves the layer empty.
async fn load_overlay(
    map_view: RwSignal<MapView>,
    descriptor: DatasetDescriptor,
) -> Result<usize, LoadError> {
    let result = loader::fetch_dataset(descriptor.url).await;
    if let Err(e) = &result {
        web_sys::console::error_1(&format!("Error loading {}: {e}", descriptor.title).into());
    }
    let outcome = match &result {
        Ok(decoded) => Ok(decoded.features.len()),
        Err(e) => Err(e.clone()),
    };
    map_view.update(|view| view.complete_load(descriptor.kind, result));
    outcome
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let mut initial = initialize(ViewConfig::default());
    let saved: ControlSnapshot =
        gloo_storage::LocalStorage::get(CONTROL_STORAGE_KEY).unwrap_or_default();
    initial.control.restore(&saved);

    let mut vp = Viewport::new(initial.center, initial.zoom);
    let (w, h) = canvas_dimensions();
    vp.resize(w, h);

    let descriptors: Vec<DatasetDescriptor> =
        initial.overlays.iter().map(|o| o.descriptor).collect();

    let map_view: RwSignal<MapView> = RwSignal::new(initial);
    let viewport: RwSignal<Viewport> = RwSignal::new(vp);
    let selected: RwSignal<Option<FeaturePopup>> = RwSignal::new(None);
    let site_probe: RwSignal<Option<SiteProbeState>> = RwSignal::new(None);
    let tiles_loaded: RwSignal<u64> = RwSignal::new(0);

    provide_context(map_view);
    provide_context(viewport);
    provide_context(SelectedFeature(selected));
    provide_context(SiteProbe(site_probe));
    provide_context(TilesLoaded(tiles_loaded));

    // Persist layer choices on any control change
    Effect::new(move || {
        let snapshot = map_view.with(|view| view.control.snapshot());
        let _ = gloo_storage::LocalStorage::set(CONTROL_STORAGE_KEY, &snapshot);
    });

    // A popup on an overlay that was switched off goes with it
    Effect::new(move || {
        let Some(kind) = selected.with(|s| s.as_ref().map(|popup| popup.kind)) else {
            return;
        };
        if !map_view.with(|view| view.control.is_visible(kind)) {
            selected.set(None);
        }
    });

    let resize_listener = window_event_listener(leptos::ev::resize, move |_| {
        let (w, h) = canvas_dimensions();
        viewport.update(|vp| vp.resize(w, h));
    });
    on_cleanup(move || resize_listener.remove());

    // Every overlay loads concurrently and lands in its own layer as soon as
    // it arrives; the join only feeds the summary log.
    let loads: Vec<_> = descriptors
        .into_iter()
        .map(|descriptor| load_overlay(map_view, descriptor))
        .collect();
    spawn_local(async move {
        let outcomes = join_all(loads).await;
        let total = outcomes.len();
        let loaded = outcomes.iter().filter(|o| o.is_ok()).count();
        let features: usize = outcomes.iter().filter_map(|o| o.as_ref().ok()).sum();
        web_sys::console::info_1(
            &format!("Loaded {loaded}/{total} overlays ({features} features)").into(),
        );
    });

    let attribution = move || {
        map_view.with(|view| {
            view.control
                .active_base()
                .map(|base| base.attribution.clone())
                .unwrap_or_default()
        })
    };

    view! {
        <div style="position: relative; width: 100vw; height: 100vh; overflow: hidden; background: #dddddd;">
            <MapCanvas />
            <div style="position: absolute; top: 10px; left: 10px; z-index: 10; display: flex; flex-direction: column; background: #ffffff; border-radius: 4px; box-shadow: 0 1px 5px rgba(0,0,0,0.4); overflow: hidden;">
                <button
                    title="Zoom in"
                    style="width: 30px; height: 30px; border: none; border-bottom: 1px solid #cccccc; background: #ffffff; font-size: 18px; cursor: pointer;"
                    on:click=move |_| viewport.update(|vp| vp.zoom_by(1.0))
                >
                    "+"
                </button>
                <button
                    title="Zoom out"
                    style="width: 30px; height: 30px; border: none; background: #ffffff; font-size: 18px; cursor: pointer;"
                    on:click=move |_| viewport.update(|vp| vp.zoom_by(-1.0))
                >
                    "−"
                </button>
            </div>
            <LayerControlPanel />
            <FeaturePopupView />
            <SiteScorePopup />
            <div style="position: absolute; right: 0; bottom: 0; z-index: 10; background: rgba(255,255,255,0.8); padding: 0 5px; font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 11px; color: #333333;">
                {attribution}
            </div>
        </div>
    }
}
