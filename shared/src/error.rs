use thiserror::Error;

/// Why a GeoJSON body could not be turned into map features.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("unsupported geometry: {0}")]
    Geometry(#[source] geojson::Error),
}

/// Failure of a single dataset fetch. Reported per overlay, never propagated
/// beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        Self::Parse(e.to_string())
    }
}
