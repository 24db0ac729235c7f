use geo_types::Coord;
use gridatlas_shared::projection::{self, LatLng, TILE_SIZE, TilePlacement};

const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 18.0;
const ZOOM_SENSITIVITY: f64 = 0.002;

/// Slippy-map viewport: a geographic center and fractional zoom, plus the
/// canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn center_world(&self, zoom: f64) -> (f64, f64) {
        projection::project(self.center, zoom)
    }

    pub fn lat_lng_to_screen(&self, ll: LatLng) -> (f64, f64) {
        let (cx, cy) = self.center_world(self.zoom);
        let (x, y) = projection::project(ll, self.zoom);
        (x - cx + self.width / 2.0, y - cy + self.height / 2.0)
    }

    /// Screen position of a GeoJSON coordinate (`x` = longitude).
    pub fn coord_to_screen(&self, c: Coord<f64>) -> (f64, f64) {
        self.lat_lng_to_screen(LatLng::new(c.y, c.x))
    }

    pub fn screen_to_lat_lng(&self, sx: f64, sy: f64) -> LatLng {
        let (cx, cy) = self.center_world(self.zoom);
        projection::unproject(
            cx + sx - self.width / 2.0,
            cy + sy - self.height / 2.0,
            self.zoom,
        )
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.center_world(self.zoom);
        self.center = projection::unproject(cx - dx, cy - dy, self.zoom);
    }

    /// Zoom toward a focus point (screen coordinates). Positive `delta`
    /// zooms out, matching wheel deltas.
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        self.set_zoom_around(self.zoom - delta * ZOOM_SENSITIVITY, screen_x, screen_y);
    }

    /// Zoom by whole levels around the view center.
    pub fn zoom_by(&mut self, levels: f64) {
        self.set_zoom_around(self.zoom + levels, self.width / 2.0, self.height / 2.0);
    }

    fn set_zoom_around(&mut self, zoom: f64, screen_x: f64, screen_y: f64) {
        let anchor = self.screen_to_lat_lng(screen_x, screen_y);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);

        // Keep the point under the cursor fixed.
        let (ax, ay) = projection::project(anchor, self.zoom);
        self.center = projection::unproject(
            ax - (screen_x - self.width / 2.0),
            ay - (screen_y - self.height / 2.0),
            self.zoom,
        );
    }

    /// Integer zoom to fetch tiles at, capped by the provider.
    pub fn tile_zoom(&self, max_zoom: u8) -> u8 {
        self.zoom.round().clamp(0.0, max_zoom as f64) as u8
    }

    /// Tiles covering the viewport at `tile_zoom`.
    pub fn visible_tiles(&self, tile_zoom: u8) -> Vec<TilePlacement> {
        let scale = self.tile_scale(tile_zoom);
        let (cx, cy) = self.center_world(tile_zoom as f64);
        let half_w = self.width / 2.0 / scale;
        let half_h = self.height / 2.0 / scale;
        projection::tiles_covering(tile_zoom, (cx - half_w, cy - half_h), (cx + half_w, cy + half_h))
    }

    /// Screen rectangle `(x, y, size)` of a tile placed at `tile_zoom`.
    pub fn tile_screen_rect(&self, placement: &TilePlacement, tile_zoom: u8) -> (f64, f64, f64) {
        let scale = self.tile_scale(tile_zoom);
        let (cx, cy) = self.center_world(tile_zoom as f64);
        let (ox, oy) = placement.world_origin();
        (
            (ox - cx) * scale + self.width / 2.0,
            (oy - cy) * scale + self.height / 2.0,
            TILE_SIZE * scale,
        )
    }

    fn tile_scale(&self, tile_zoom: u8) -> f64 {
        (self.zoom - tile_zoom as f64).exp2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn sized(center: LatLng, zoom: f64) -> Viewport {
        let mut vp = Viewport::new(center, zoom);
        vp.resize(800.0, 600.0);
        vp
    }

    #[test]
    fn center_maps_to_middle_of_screen() {
        let center = LatLng::new(-25.2744, 133.7751);
        let vp = sized(center, 4.0);
        let (x, y) = vp.lat_lng_to_screen(center);
        assert!(close(x, 400.0));
        assert!(close(y, 300.0));
        let back = vp.screen_to_lat_lng(x, y);
        assert!(close(back.lat, center.lat) && close(back.lng, center.lng));
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = sized(LatLng::new(-25.2744, 133.7751), 4.0);
        let focus = vp.screen_to_lat_lng(120.0, 450.0);
        vp.zoom_at(-500.0, 120.0, 450.0);
        assert!(close(vp.zoom, 5.0));
        let (x, y) = vp.lat_lng_to_screen(focus);
        assert!(close(x, 120.0));
        assert!(close(y, 450.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = sized(LatLng::new(0.0, 0.0), 4.0);
        vp.zoom_by(40.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom_by(-40.0);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut vp = sized(LatLng::new(-25.0, 134.0), 4.0);
        let target = LatLng::new(-33.8688, 151.2093);
        let (x0, y0) = vp.lat_lng_to_screen(target);
        vp.pan(30.0, -20.0);
        let (x1, y1) = vp.lat_lng_to_screen(target);
        assert!(close(x1 - x0, 30.0));
        assert!(close(y1 - y0, -20.0));
    }

    #[test]
    fn tiles_cover_the_screen() {
        let vp = sized(LatLng::new(-25.2744, 133.7751), 4.4);
        let z = vp.tile_zoom(18);
        assert_eq!(z, 4);
        assert_eq!(vp.tile_zoom(3), 3);
        let tiles = vp.visible_tiles(z);
        assert!(!tiles.is_empty());
        let covers = |sx: f64, sy: f64| {
            tiles.iter().any(|t| {
                let (x, y, size) = vp.tile_screen_rect(t, z);
                sx >= x && sx < x + size && sy >= y && sy < y + size
            })
        };
        assert!(covers(0.0, 0.0));
        assert!(covers(799.0, 599.0));
        assert!(covers(400.0, 300.0));
    }
}
