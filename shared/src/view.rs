use serde::{Deserialize, Serialize};

use crate::basemap::BaseLayer;
use crate::dataset::{DatasetDescriptor, DatasetKind, RenderedFeature};
use crate::error::LoadError;
use crate::feature::Decoded;
use crate::projection::LatLng;

/// Centre of mainland Australia.
pub const DEFAULT_CENTER: LatLng = LatLng::new(-25.2744, 133.7751);
pub const DEFAULT_ZOOM: f64 = 4.0;

/// Fixed parameters of the map view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub base_layers: Vec<BaseLayer>,
    /// Index into `base_layers` of the layer shown at start.
    pub default_base: usize,
    pub overlays: Vec<DatasetDescriptor>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            base_layers: vec![BaseLayer::openstreetmap(), BaseLayer::satellite()],
            default_base: 0,
            overlays: DatasetKind::ALL.map(DatasetKind::descriptor).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    Pending,
    Loaded { admitted: usize, rejected: usize },
    Failed(String),
}

/// Features of one overlay. Populated once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub features: Vec<RenderedFeature>,
    pub status: LoadStatus,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            status: LoadStatus::Pending,
        }
    }
}

impl Layer {
    /// Build the layer for a descriptor from decoded features.
    pub fn populate(descriptor: &DatasetDescriptor, decoded: Decoded) -> Self {
        let total = decoded.features.len();
        let features: Vec<RenderedFeature> = decoded
            .features
            .into_iter()
            .filter_map(|feature| descriptor.render(feature))
            .collect();
        let admitted = features.len();
        Self {
            features,
            status: LoadStatus::Loaded {
                admitted,
                rejected: total - admitted + decoded.skipped,
            },
        }
    }

    /// An empty layer recording why it could not be loaded.
    pub fn failed(error: &LoadError) -> Self {
        Self {
            features: Vec::new(),
            status: LoadStatus::Failed(error.to_string()),
        }
    }

    pub fn from_result(descriptor: &DatasetDescriptor, result: Result<Decoded, LoadError>) -> Self {
        match result {
            Ok(decoded) => Self::populate(descriptor, decoded),
            Err(e) => Self::failed(&e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    pub kind: DatasetKind,
    pub title: String,
    pub visible: bool,
}

/// Persistable subset of the control state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSnapshot {
    pub base: Option<String>,
    pub hidden: Vec<DatasetKind>,
}

/// Layer selection: base layers are radio-exclusive, overlays are
/// independent checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerControl {
    base_layers: Vec<BaseLayer>,
    active_base: usize,
    overlays: Vec<OverlayEntry>,
}

impl LayerControl {
    pub fn new(base_layers: Vec<BaseLayer>, default_base: usize, overlays: &[DatasetDescriptor]) -> Self {
        let active_base = if default_base < base_layers.len() {
            default_base
        } else {
            0
        };
        Self {
            base_layers,
            active_base,
            overlays: overlays
                .iter()
                .map(|d| OverlayEntry {
                    kind: d.kind,
                    title: d.title.to_owned(),
                    visible: true,
                })
                .collect(),
        }
    }

    pub fn base_layers(&self) -> &[BaseLayer] {
        &self.base_layers
    }

    pub fn overlays(&self) -> &[OverlayEntry] {
        &self.overlays
    }

    pub fn active_base_index(&self) -> usize {
        self.active_base
    }

    pub fn active_base(&self) -> Option<&BaseLayer> {
        self.base_layers.get(self.active_base)
    }

    /// Switch base layer. Returns false for an unknown index.
    pub fn select_base(&mut self, index: usize) -> bool {
        if index >= self.base_layers.len() {
            return false;
        }
        self.active_base = index;
        true
    }

    pub fn is_visible(&self, kind: DatasetKind) -> bool {
        self.overlays
            .iter()
            .any(|entry| entry.kind == kind && entry.visible)
    }

    /// Show or hide one overlay. Returns false if the overlay is unknown.
    pub fn set_overlay_visible(&mut self, kind: DatasetKind, visible: bool) -> bool {
        match self.overlays.iter_mut().find(|entry| entry.kind == kind) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Flip one overlay. Returns its new visibility.
    pub fn toggle_overlay(&mut self, kind: DatasetKind) -> Option<bool> {
        let entry = self.overlays.iter_mut().find(|entry| entry.kind == kind)?;
        entry.visible = !entry.visible;
        Some(entry.visible)
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            base: self.active_base().map(|b| b.name.clone()),
            hidden: self
                .overlays
                .iter()
                .filter(|entry| !entry.visible)
                .map(|entry| entry.kind)
                .collect(),
        }
    }

    /// Re-apply a saved selection. Unknown names and kinds are ignored.
    pub fn restore(&mut self, snapshot: &ControlSnapshot) {
        if let Some(name) = &snapshot.base
            && let Some(index) = self.base_layers.iter().position(|b| &b.name == name)
        {
            self.active_base = index;
        }
        for entry in &mut self.overlays {
            entry.visible = !snapshot.hidden.contains(&entry.kind);
        }
    }
}

/// One overlay: its descriptor and the features loaded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub descriptor: DatasetDescriptor,
    pub layer: Layer,
}

/// The single map instance.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: f64,
    pub control: LayerControl,
    pub overlays: Vec<Overlay>,
}

/// Build the map view: fixed center and zoom, base layers registered with
/// the default active, one empty pending overlay per dataset, and the layer
/// control covering all of them.
pub fn initialize(config: ViewConfig) -> MapView {
    let control = LayerControl::new(config.base_layers, config.default_base, &config.overlays);
    let overlays = config
        .overlays
        .into_iter()
        .map(|descriptor| Overlay {
            descriptor,
            layer: Layer::default(),
        })
        .collect();
    MapView {
        center: config.center,
        zoom: config.zoom,
        control,
        overlays,
    }
}

impl MapView {
    pub fn overlay(&self, kind: DatasetKind) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.descriptor.kind == kind)
    }

    /// Store the outcome of one dataset fetch in its own overlay.
    pub fn complete_load(&mut self, kind: DatasetKind, result: Result<Decoded, LoadError>) {
        if let Some(overlay) = self.overlays.iter_mut().find(|o| o.descriptor.kind == kind) {
            overlay.layer = Layer::from_result(&overlay.descriptor, result);
        }
    }

    /// Overlays currently switched on, in draw order.
    pub fn visible_overlays(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays
            .iter()
            .filter(|o| self.control.is_visible(o.descriptor.kind))
    }
}
