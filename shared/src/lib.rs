pub mod basemap;
pub mod colors;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod hit;
pub mod measure;
pub mod popup;
pub mod projection;
pub mod properties;
pub mod scoring;
pub mod style;
pub mod view;

pub use basemap::BaseLayer;
pub use colors::Color;
pub use dataset::{DatasetDescriptor, DatasetKind, FeatureFilter, RenderedFeature};
pub use error::{DecodeError, LoadError};
pub use feature::{Decoded, MapFeature, decode_features};
pub use popup::{PopupContent, PopupField, PopupLine};
pub use projection::{LatLng, TileId};
pub use scoring::{SiteIndex, SiteScore};
pub use style::{PathStyle, StyleRule};
pub use view::{
    ControlSnapshot, Layer, LayerControl, LoadStatus, MapView, Overlay, ViewConfig, initialize,
};
