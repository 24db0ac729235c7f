//! Screen-space hit testing of feature geometries.

use geo::{Distance, Euclidean, MapCoords, Point};
use geo_types::{Coord, Geometry};

/// Whether screen point `p` hits `geometry`, given a projection from
/// lon/lat to screen pixels. Points and lines hit within `tolerance`
/// pixels; polygons hit anywhere inside (holes excluded) or near the border.
pub fn hits(
    geometry: &Geometry<f64>,
    p: (f64, f64),
    project: &impl Fn(Coord<f64>) -> (f64, f64),
    tolerance: f64,
) -> bool {
    let on_screen = geometry.map_coords(|c| {
        let (x, y) = project(c);
        Coord { x, y }
    });
    Euclidean::distance(&Point::new(p.0, p.1), &on_screen) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, Polygon};

    fn identity(c: Coord<f64>) -> (f64, f64) {
        (c.x, c.y)
    }

    #[test]
    fn point_hit_within_tolerance() {
        let g = Geometry::Point(Point::new(10.0, 10.0));
        assert!(hits(&g, (13.0, 14.0), &identity, 5.0));
        assert!(!hits(&g, (14.0, 14.0), &identity, 5.0));
    }

    #[test]
    fn line_hit_uses_segment_distance() {
        let g = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]));
        assert!(hits(&g, (50.0, 3.0), &identity, 4.0));
        assert!(!hits(&g, (50.0, 5.0), &identity, 4.0));
        assert!(!hits(&g, (106.0, 0.0), &identity, 4.0));
    }

    #[test]
    fn polygon_hit_excludes_holes() {
        let outer = LineString::from(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0), (40.0, 40.0)]);
        let g = Geometry::Polygon(Polygon::new(outer, vec![hole]));
        assert!(hits(&g, (20.0, 20.0), &identity, 1.0));
        assert!(!hits(&g, (50.0, 50.0), &identity, 1.0));
        assert!(!hits(&g, (150.0, 50.0), &identity, 1.0));
        assert!(hits(&g, (100.5, 50.0), &identity, 1.0));
    }

    #[test]
    fn projection_is_applied() {
        let g = Geometry::Point(Point::new(1.0, 1.0));
        let scale = |c: Coord<f64>| (c.x * 100.0, c.y * 100.0);
        assert!(hits(&g, (100.0, 100.0), &scale, 1.0));
        assert!(!hits(&g, (1.0, 1.0), &scale, 1.0));
    }
}
