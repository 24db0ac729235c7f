//! Site suitability: how well a candidate location is served by nearby
//! generation, substations and transmission lines.

use geo_types::{Coord, Geometry};
use serde::{Deserialize, Serialize};

use crate::feature::MapFeature;
use crate::measure::{distance_km, haversine_km};
use crate::properties::{self, Properties};
use crate::style::CAPACITY_PROPERTY;

pub const STATION_RADIUS_KM: f64 = 300.0;
pub const STATION_PENALTY: f64 = 1000.0;
pub const SUBSTATION_RADIUS_KM: f64 = 100.0;
pub const SUBSTATION_TOP_N: usize = 5;
pub const SUBSTATION_PENALTY: f64 = 100.0;
pub const DEFAULT_SUBSTATION_KV: f64 = 110.0;
pub const LINE_RADIUS_KM: f64 = 100.0;
pub const LINE_PENALTY: f64 = 100.0;

const GENERATION_TYPE_PROPERTY: &str = "generationtype";
const VOLTAGE_PROPERTY: &str = "voltagekv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    Coal,
    Gas,
    Hydro,
    Solar,
    Wind,
    Biomass,
    Diesel,
    LandfillGas,
    Unknown,
}

impl GenerationType {
    /// Classify a free-text generation type. Anything after the first `/`,
    /// `(` or `[` is commentary and ignored.
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let head = lowered
            .split(['/', '(', '['])
            .next()
            .unwrap_or_default()
            .trim();

        if head.contains("hydro") {
            Self::Hydro
        } else if head.contains("wind") {
            Self::Wind
        } else if head.contains("coal") {
            Self::Coal
        } else if head.contains("gas") && !head.contains("landfill") {
            Self::Gas
        } else if head.contains("landfill") {
            Self::LandfillGas
        } else if head.contains("biomass") {
            Self::Biomass
        } else if head.contains("solar") {
            Self::Solar
        } else if head.contains("diesel") {
            Self::Diesel
        } else {
            Self::Unknown
        }
    }

    /// Proxy nameplate capacity in MW.
    pub const fn capacity_mw(self) -> f64 {
        match self {
            Self::Coal => 1000.0,
            Self::Gas => 300.0,
            Self::Hydro => 500.0,
            Self::Solar | Self::Unknown => 100.0,
            Self::Wind => 200.0,
            Self::Biomass | Self::LandfillGas => 20.0,
            Self::Diesel => 30.0,
        }
    }

    pub const fn is_renewable(self) -> bool {
        matches!(
            self,
            Self::Hydro | Self::Solar | Self::Wind | Self::Biomass | Self::LandfillGas
        )
    }

    /// Score multiplier favouring renewable generation.
    pub const fn green_weight(self) -> f64 {
        if self.is_renewable() { 1.2 } else { 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub location: Coord<f64>,
    pub generation: GenerationType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Substation {
    pub location: Coord<f64>,
    pub voltage_kv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionLine {
    pub geometry: Geometry<f64>,
    pub capacity_kv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteScore {
    pub lat: f64,
    pub lon: f64,
    pub station: f64,
    pub substation: f64,
    pub line: f64,
    pub total: f64,
}

/// Infrastructure to score candidate sites against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteIndex {
    pub stations: Vec<Station>,
    pub substations: Vec<Substation>,
    pub lines: Vec<TransmissionLine>,
}

fn generation_of(props: &Properties) -> GenerationType {
    match props.get(GENERATION_TYPE_PROPERTY) {
        Some(value) if !value.is_null() => {
            GenerationType::normalize(&properties::display_value(value))
        }
        _ => GenerationType::Unknown,
    }
}

impl SiteIndex {
    pub fn from_features(
        stations: &[MapFeature],
        substations: &[MapFeature],
        lines: &[MapFeature],
    ) -> Self {
        Self {
            stations: stations
                .iter()
                .filter_map(|f| {
                    Some(Station {
                        location: f.anchor()?,
                        generation: generation_of(&f.properties),
                    })
                })
                .collect(),
            substations: substations
                .iter()
                .filter_map(|f| {
                    Some(Substation {
                        location: f.anchor()?,
                        voltage_kv: properties::number(&f.properties, VOLTAGE_PROPERTY)
                            .unwrap_or(DEFAULT_SUBSTATION_KV),
                    })
                })
                .collect(),
            lines: lines
                .iter()
                .map(|f| TransmissionLine {
                    geometry: f.geometry.clone(),
                    capacity_kv: properties::number(&f.properties, CAPACITY_PROPERTY)
                        .unwrap_or(0.0),
                })
                .collect(),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.stations.len() + self.substations.len() + self.lines.len()
    }

    /// Generation within 300 km, weighted by capacity, renewables and
    /// proximity.
    pub fn station_score(&self, site: Coord<f64>) -> f64 {
        let scores: Vec<f64> = self
            .stations
            .iter()
            .filter_map(|s| {
                let d = haversine_km(site, s.location);
                (d <= STATION_RADIUS_KM).then(|| {
                    s.generation.capacity_mw() * s.generation.green_weight() / (1.0 + d)
                })
            })
            .collect();
        if scores.is_empty() {
            STATION_PENALTY
        } else {
            scores.iter().sum()
        }
    }

    /// Best five substations within 100 km, by voltage over distance.
    pub fn substation_score(&self, site: Coord<f64>) -> f64 {
        let mut scores: Vec<f64> = self
            .substations
            .iter()
            .filter_map(|s| {
                let d = haversine_km(site, s.location);
                (d <= SUBSTATION_RADIUS_KM).then(|| s.voltage_kv / (1.0 + d))
            })
            .collect();
        if scores.is_empty() {
            return SUBSTATION_PENALTY;
        }
        scores.sort_by(|a, b| b.total_cmp(a));
        scores.iter().take(SUBSTATION_TOP_N).sum()
    }

    /// Transmission lines passing within 100 km, by capacity over distance.
    pub fn line_score(&self, site: Coord<f64>) -> f64 {
        let scores: Vec<f64> = self
            .lines
            .iter()
            .filter_map(|l| {
                let d = distance_km(site, &l.geometry)?;
                (d <= LINE_RADIUS_KM).then(|| l.capacity_kv / (d + 1.0))
            })
            .collect();
        if scores.is_empty() {
            LINE_PENALTY
        } else {
            scores.iter().sum()
        }
    }

    pub fn score(&self, lat: f64, lon: f64) -> SiteScore {
        let site = Coord { x: lon, y: lat };
        let station = self.station_score(site);
        let substation = self.substation_score(site);
        let line = self.line_score(site);
        SiteScore {
            lat,
            lon,
            station,
            substation,
            line,
            total: station + substation + line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::decode_features;

    const WAGGA: Coord<f64> = Coord {
        x: 147.3707,
        y: -35.1175,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn normalizes_generation_types() {
        let cases = [
            ("Coal", GenerationType::Coal),
            ("  Natural Gas / Diesel", GenerationType::Gas),
            ("Landfill Gas", GenerationType::LandfillGas),
            ("Pumped Hydro", GenerationType::Hydro),
            ("Solar (PV)", GenerationType::Solar),
            ("Wind Farm", GenerationType::Wind),
            // "bagasse" contains "gas"
            ("Bagasse / Biomass", GenerationType::Gas),
            ("Biomass", GenerationType::Biomass),
            ("Distillate [diesel]", GenerationType::Unknown),
            ("Diesel", GenerationType::Diesel),
            ("", GenerationType::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(GenerationType::normalize(raw), expected, "{raw:?}");
        }
    }

    #[test]
    fn renewable_weighting() {
        assert_eq!(GenerationType::Wind.green_weight(), 1.2);
        assert_eq!(GenerationType::LandfillGas.green_weight(), 1.2);
        assert_eq!(GenerationType::Coal.green_weight(), 1.0);
        assert_eq!(GenerationType::Unknown.green_weight(), 1.0);
        assert_eq!(GenerationType::Unknown.capacity_mw(), 100.0);
    }

    #[test]
    fn empty_index_scores_penalties() {
        let score = SiteIndex::default().score(WAGGA.y, WAGGA.x);
        assert_eq!(score.station, STATION_PENALTY);
        assert_eq!(score.substation, SUBSTATION_PENALTY);
        assert_eq!(score.line, LINE_PENALTY);
        assert_eq!(score.total, 1200.0);
    }

    #[test]
    fn station_at_site_contributes_full_capacity() {
        let index = SiteIndex {
            stations: vec![
                Station {
                    location: WAGGA,
                    generation: GenerationType::Wind,
                },
                // Perth: far outside the radius.
                Station {
                    location: Coord {
                        x: 115.8605,
                        y: -31.9505,
                    },
                    generation: GenerationType::Coal,
                },
            ],
            ..SiteIndex::default()
        };
        assert!(close(index.station_score(WAGGA), 240.0));
    }

    #[test]
    fn substation_score_keeps_top_five() {
        let substations = (0..7)
            .map(|i| Substation {
                location: WAGGA,
                voltage_kv: 100.0 * (i + 1) as f64,
            })
            .collect();
        let index = SiteIndex {
            substations,
            ..SiteIndex::default()
        };
        // 700 + 600 + 500 + 400 + 300 at distance zero
        assert!(close(index.substation_score(WAGGA), 2500.0));
    }

    #[test]
    fn line_score_measures_to_geometry() {
        let stations = decode_features(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"generationtype":"Hydro"},"geometry":{"type":"Point","coordinates":[147.3707,-35.1175]}}
            ]}"#,
        )
        .expect("decode stations")
        .features;
        let substations = decode_features(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"voltagekv":"unknown"},"geometry":{"type":"Point","coordinates":[147.3707,-35.1175]}}
            ]}"#,
        )
        .expect("decode substations")
        .features;
        let lines = decode_features(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"capacitykv":330},"geometry":{"type":"LineString","coordinates":[[146.0,-35.1175],[147.3707,-35.1175],[149.0,-35.1175]]}},
                {"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[146.0,-35.0],[149.0,-35.0]]}}
            ]}"#,
        )
        .expect("decode lines")
        .features;

        let index = SiteIndex::from_features(&stations, &substations, &lines);
        assert_eq!(index.feature_count(), 4);
        assert_eq!(index.substations[0].voltage_kv, DEFAULT_SUBSTATION_KV);

        let score = index.score(WAGGA.y, WAGGA.x);
        assert!(close(score.station, 600.0));
        assert!(close(score.substation, 110.0));
        // The line has a vertex at the site; the uncapacitated line adds nothing.
        assert!((score.line - 330.0).abs() < 1e-6, "line score {}", score.line);
        assert!(close(score.total, score.station + score.substation + score.line));
    }
}
