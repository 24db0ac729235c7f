use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use js_sys::Reflect;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

const MAX_CACHED_TILES: usize = 256;
const ONLOAD_HANDLE_KEY: &str = "__gridatlasTileOnload";
const ONERROR_HANDLE_KEY: &str = "__gridatlasTileOnerror";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileState {
    Loading,
    Ready,
    Failed,
}

struct CachedTile {
    image: HtmlImageElement,
    state: Rc<Cell<TileState>>,
}

/// Raster tiles keyed by URL. Loads start on first request; `loaded` is
/// bumped whenever one finishes so the canvas can repaint.
pub struct TileCache {
    tiles: HashMap<String, CachedTile>,
    order: VecDeque<String>,
    loaded: RwSignal<u64>,
}

impl TileCache {
    pub fn new(loaded: RwSignal<u64>) -> Self {
        Self {
            tiles: HashMap::new(),
            order: VecDeque::new(),
            loaded,
        }
    }

    /// The decoded image for `url`, or None while it is loading or if it
    /// failed. Starts a load on first sight.
    pub fn get_or_load(&mut self, url: &str) -> Option<HtmlImageElement> {
        if let Some(tile) = self.tiles.get(url) {
            return (tile.state.get() == TileState::Ready).then(|| tile.image.clone());
        }

        let tile = load_tile(url, self.loaded)?;
        self.tiles.insert(url.to_owned(), tile);
        self.order.push_back(url.to_owned());
        None
    }

    /// Drop the oldest tiles beyond the cache size.
    pub fn prune(&mut self) {
        while self.order.len() > MAX_CACHED_TILES {
            let Some(url) = self.order.pop_front() else {
                break;
            };
            if let Some(tile) = self.tiles.remove(&url) {
                clear_image_handlers(&tile.image);
            }
        }
    }
}

fn load_tile(url: &str, loaded: RwSignal<u64>) -> Option<CachedTile> {
    let img = HtmlImageElement::new().ok()?;
    let state = Rc::new(Cell::new(TileState::Loading));

    let img_for_load = img.clone();
    let state_for_load = state.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);
        state_for_load.set(TileState::Ready);
        loaded.update(|n| *n = n.wrapping_add(1));
    });

    let img_for_error = img.clone();
    let state_for_error = state.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        state_for_error.set(TileState::Failed);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    // Keep the closures reachable from the image until it settles.
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONLOAD_HANDLE_KEY),
        &onload_js,
    );
    let _ = Reflect::set(
        img.as_ref(),
        &JsValue::from_str(ONERROR_HANDLE_KEY),
        &onerror_js,
    );
    img.set_src(url);

    Some(CachedTile { image: img, state })
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}
