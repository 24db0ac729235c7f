use serde::{Deserialize, Serialize};

use crate::projection::TileId;

const DEFAULT_SUBDOMAINS: &[&str] = &["a", "b", "c"];

/// A background raster tile source. Exactly one is shown at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayer {
    pub name: String,
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    pub attribution: String,
    pub subdomains: Vec<String>,
    pub max_zoom: u8,
}

impl BaseLayer {
    pub fn new(name: &str, url_template: &str, attribution: &str) -> Self {
        Self {
            name: name.to_owned(),
            url_template: url_template.to_owned(),
            attribution: attribution.to_owned(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| (*s).to_owned()).collect(),
            max_zoom: 18,
        }
    }

    pub fn openstreetmap() -> Self {
        Self::new(
            "OpenStreetMap",
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            "© OpenStreetMap",
        )
    }

    /// Labelled "Satellite" in the layer control; served by OpenTopoMap.
    pub fn satellite() -> Self {
        Self {
            max_zoom: 17,
            ..Self::new(
                "Satellite",
                "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
                "© OpenTopoMap",
            )
        }
    }

    /// Concrete URL for one tile. Subdomains rotate by `(x + y) % n` so
    /// neighbouring tiles spread across hosts.
    pub fn tile_url(&self, tile: TileId) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = (tile.x as usize + tile.y as usize) % self.subdomains.len();
            self.subdomains[idx].as_str()
        };
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}
