use geo_types::Rect;
use serde::{Deserialize, Serialize};

use crate::feature::{self, MapFeature};
use crate::measure;
use crate::popup::{PopupContent, PopupField, STANDARD_FIELDS};
use crate::style::{PathStyle, StyleRule};

/// Water bodies at or below this area (square meters) are not drawn.
pub const WATER_BODY_MIN_AREA_M2: f64 = 100_000_000.0;

/// The overlay datasets the map knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    PowerStations,
    Substations,
    TransmissionLines,
    WaterBodies,
}

impl DatasetKind {
    pub const ALL: [Self; 4] = [
        Self::PowerStations,
        Self::Substations,
        Self::TransmissionLines,
        Self::WaterBodies,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PowerStations => "Major_Power_Stations.geojson",
            Self::Substations => "Transmission_Substations.geojson",
            Self::TransmissionLines => "Electricity_Transmission_Lines.geojson",
            Self::WaterBodies => "Water_Bodies.geojson",
        }
    }

    pub const fn descriptor(self) -> DatasetDescriptor {
        match self {
            Self::PowerStations => DatasetDescriptor {
                kind: self,
                title: "Major Power Station Data",
                url: "/data/Major_Power_Stations.geojson",
                filter: FeatureFilter::All,
                style: StyleRule::Default,
                popup_fields: STANDARD_FIELDS,
            },
            Self::Substations => DatasetDescriptor {
                kind: self,
                title: "Transmission Substations Data",
                url: "/data/Transmission_Substations.geojson",
                filter: FeatureFilter::All,
                style: StyleRule::Default,
                popup_fields: STANDARD_FIELDS,
            },
            Self::TransmissionLines => DatasetDescriptor {
                kind: self,
                title: "Electricity Transmission Lines",
                url: "/data/Electricity_Transmission_Lines.geojson",
                filter: FeatureFilter::All,
                style: StyleRule::TransmissionCapacity,
                popup_fields: STANDARD_FIELDS,
            },
            Self::WaterBodies => DatasetDescriptor {
                kind: self,
                title: "Water Bodies",
                url: "/data/Water_Bodies.geojson",
                filter: FeatureFilter::LargePolygons {
                    min_area_m2: WATER_BODY_MIN_AREA_M2,
                },
                style: StyleRule::WaterBody,
                popup_fields: STANDARD_FIELDS,
            },
        }
    }
}

/// Which features of a dataset are admitted to its layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureFilter {
    All,
    /// Polygon or MultiPolygon strictly larger than the given area.
    LargePolygons { min_area_m2: f64 },
}

impl FeatureFilter {
    pub fn admits(self, feature: &MapFeature) -> bool {
        match self {
            Self::All => true,
            Self::LargePolygons { min_area_m2 } => {
                feature.is_polygonal() && measure::area_m2(&feature.geometry) > min_area_m2
            }
        }
    }
}

/// Everything needed to turn one GeoJSON resource into an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetDescriptor {
    pub kind: DatasetKind,
    pub title: &'static str,
    pub url: &'static str,
    pub filter: FeatureFilter,
    pub style: StyleRule,
    pub popup_fields: &'static [PopupField],
}

/// A feature admitted to a layer, with its style and popup resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub feature: MapFeature,
    pub style: PathStyle,
    pub popup: PopupContent,
    pub bounds: Option<Rect<f64>>,
}

impl DatasetDescriptor {
    /// Apply the filter, style rule and popup formatter to one feature.
    pub fn render(&self, feature: MapFeature) -> Option<RenderedFeature> {
        if !self.filter.admits(&feature) {
            return None;
        }
        let style = self.style.style_for(&feature.properties);
        let popup = PopupContent::build(self.popup_fields, &feature.properties);
        let bounds = feature::bounds(&feature.geometry);
        Some(RenderedFeature {
            feature,
            style,
            popup,
            bounds,
        })
    }
}
