use geo::{BoundingRect, CoordsIter};
use geo_types::{Coord, Geometry, Rect};
use geojson::GeoJson;

use crate::error::DecodeError;
use crate::properties::Properties;

/// One geometry plus its property set, as read from a GeoJSON source.
/// Coordinates are WGS84 degrees with `x = longitude`, `y = latitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub geometry: Geometry<f64>,
    pub properties: Properties,
}

/// Features decoded from one GeoJSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub features: Vec<MapFeature>,
    /// Features without a usable geometry (null, or not convertible).
    pub skipped: usize,
}

impl MapFeature {
    pub fn is_polygonal(&self) -> bool {
        matches!(
            self.geometry,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_)
        )
    }

    /// A single representative coordinate: the point itself, or the first
    /// vertex of anything larger.
    pub fn anchor(&self) -> Option<Coord<f64>> {
        self.geometry.coords_iter().next()
    }
}

/// Decode a GeoJSON document. A FeatureCollection, a single Feature and a
/// bare Geometry are all accepted; a bare geometry gets empty properties.
pub fn decode_features(body: &str) -> Result<Decoded, DecodeError> {
    let geojson: GeoJson = body.parse()?;
    let mut decoded = Decoded::default();

    let mut push = |geometry: Option<geojson::Geometry>, properties: Option<Properties>| {
        let converted = geometry.map(to_geometry);
        match converted {
            Some(Ok(geometry)) => decoded.features.push(MapFeature {
                geometry,
                properties: properties.unwrap_or_default(),
            }),
            Some(Err(_)) | None => decoded.skipped += 1,
        }
    };

    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                push(feature.geometry, feature.properties);
            }
        }
        GeoJson::Feature(feature) => push(feature.geometry, feature.properties),
        GeoJson::Geometry(geometry) => push(Some(geometry), None),
    }

    Ok(decoded)
}

fn to_geometry(geometry: geojson::Geometry) -> Result<Geometry<f64>, DecodeError> {
    Geometry::try_from(geometry).map_err(DecodeError::Geometry)
}

/// Bounding box of a geometry, `None` for an empty one.
pub fn bounds(geometry: &Geometry<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}
