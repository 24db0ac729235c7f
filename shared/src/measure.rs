//! Spherical measurements on WGS84 longitude/latitude geometries.

use geo::{
    ChamberlainDuquetteArea, Closest, Distance, Haversine, HaversineClosestPoint, Point,
};
use geo_types::{Coord, Geometry};

/// Area in square meters. Only polygonal parts contribute; holes are
/// subtracted and ring orientation does not matter.
pub fn area_m2(geometry: &Geometry<f64>) -> f64 {
    geometry.chamberlain_duquette_unsigned_area()
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine::distance(Point(a), Point(b)) / 1000.0
}

/// Distance in kilometers from `p` to the nearest part of a geometry, with
/// segments taken as great-circle arcs. A point inside a polygon is at zero.
/// `None` for empty geometries.
pub fn distance_km(p: Coord<f64>, geometry: &Geometry<f64>) -> Option<f64> {
    let from = Point(p);
    match geometry.haversine_closest_point(&from) {
        Closest::Intersection(_) => Some(0.0),
        Closest::SinglePoint(nearest) => Some(Haversine::distance(from, nearest) / 1000.0),
        Closest::Indeterminate => None,
    }
}
