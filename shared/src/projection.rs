//! Spherical Web Mercator, the projection raster tile providers use.

use serde::{Deserialize, Serialize};

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Size of the whole world in pixels at a (possibly fractional) zoom.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Project to world pixel coordinates at `zoom`. Origin is the top-left
/// corner (180°W, 85.05°N); y grows southwards.
pub fn project(ll: LatLng, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = ll.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (ll.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng { lat, lng }
}

/// One raster tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile to draw: which one to fetch and where its top-left corner falls in
/// world pixels at the tile's own zoom. `column` may fall outside the world
/// when the view wraps across the antimeridian; `id.x` is already wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub id: TileId,
    pub column: i64,
    pub row: i64,
}

impl TilePlacement {
    pub fn world_origin(&self) -> (f64, f64) {
        (self.column as f64 * TILE_SIZE, self.row as f64 * TILE_SIZE)
    }
}

/// Tiles covering a world-pixel rectangle at integer zoom `z`.
pub fn tiles_covering(z: u8, min: (f64, f64), max: (f64, f64)) -> Vec<TilePlacement> {
    let count = 1i64 << z;
    let col_min = (min.0 / TILE_SIZE).floor() as i64;
    let col_max = (max.0 / TILE_SIZE).floor() as i64;
    let row_min = ((min.1 / TILE_SIZE).floor() as i64).max(0);
    let row_max = ((max.1 / TILE_SIZE).floor() as i64).min(count - 1);

    let mut tiles = Vec::new();
    for row in row_min..=row_max {
        for column in col_min..=col_max {
            tiles.push(TilePlacement {
                id: TileId {
                    z,
                    x: column.rem_euclid(count) as u32,
                    y: row as u32,
                },
                column,
                row,
            });
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn null_island_is_world_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0.0);
        assert!(close(x, 128.0));
        assert!(close(y, 128.0));
    }

    #[test]
    fn project_unproject_inverse() {
        let ll = LatLng::new(-25.2744, 133.7751);
        let (x, y) = project(ll, 4.0);
        let back = unproject(x, y, 4.0);
        assert!(close(back.lat, ll.lat));
        assert!(close(back.lng, ll.lng));
    }

    #[test]
    fn latitude_is_clamped() {
        let (_, y) = project(LatLng::new(90.0, 0.0), 0.0);
        assert!(close(y, 0.0));
    }

    #[test]
    fn tiles_wrap_horizontally_and_clamp_vertically() {
        let tiles = tiles_covering(1, (-10.0, -10.0), (300.0, 600.0));
        let ids: Vec<(u32, u32)> = tiles.iter().map(|t| (t.id.x, t.id.y)).collect();
        assert_eq!(ids, vec![(1, 0), (0, 0), (1, 0), (1, 1), (0, 1), (1, 1)]);
        assert_eq!(tiles[0].column, -1);
        assert_eq!(tiles[0].world_origin(), (-256.0, 0.0));
    }
}
