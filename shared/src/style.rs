use serde::{Deserialize, Serialize};

use crate::colors::Color;
use crate::properties::{self, Properties};

/// Property carrying a transmission line's voltage class.
pub const CAPACITY_PROPERTY: &str = "capacitykv";

pub const DEFAULT_COLOR: Color = Color::rgb(0x33, 0x88, 0xff);
pub const HIGH_CAPACITY_COLOR: Color = Color::rgb(0xd7, 0x30, 0x27);
pub const MEDIUM_HIGH_CAPACITY_COLOR: Color = Color::rgb(0xfc, 0x8d, 0x59);
pub const MEDIUM_CAPACITY_COLOR: Color = Color::rgb(0xfe, 0xe0, 0x90);
pub const WATER_FILL_COLOR: Color = Color::rgb(0xa6, 0xce, 0xe3);
pub const WATER_BORDER_COLOR: Color = Color::rgb(0x1f, 0x78, 0xb4);

const LINE_OPACITY: f64 = 0.8;

/// Presentation of a path (line outline or polygon border + fill).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: Color,
    pub weight: f64,
    pub opacity: f64,
    pub fill: bool,
    pub fill_color: Color,
    pub fill_opacity: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            weight: 3.0,
            opacity: 1.0,
            fill: true,
            fill_color: DEFAULT_COLOR,
            fill_opacity: 0.2,
        }
    }
}

/// Voltage class of a transmission line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityBand {
    /// 500 kV and above.
    High,
    /// 220 kV up to 500 kV.
    MediumHigh,
    /// 110 kV up to 220 kV.
    Medium,
    /// Below 110 kV or unknown.
    Base,
}

impl CapacityBand {
    pub fn classify(capacity_kv: Option<f64>) -> Self {
        match capacity_kv {
            Some(kv) if kv >= 500.0 => Self::High,
            Some(kv) if kv >= 220.0 => Self::MediumHigh,
            Some(kv) if kv >= 110.0 => Self::Medium,
            _ => Self::Base,
        }
    }

    pub const fn color(self) -> Color {
        match self {
            Self::High => HIGH_CAPACITY_COLOR,
            Self::MediumHigh => MEDIUM_HIGH_CAPACITY_COLOR,
            Self::Medium => MEDIUM_CAPACITY_COLOR,
            Self::Base => DEFAULT_COLOR,
        }
    }

    pub const fn weight(self) -> f64 {
        match self {
            Self::High => 4.0,
            Self::MediumHigh => 3.0,
            Self::Medium | Self::Base => 2.0,
        }
    }
}

/// How a dataset's features are styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleRule {
    /// No override.
    Default,
    /// Color and weight by voltage class.
    TransmissionCapacity,
    /// Fixed water fill and border.
    WaterBody,
}

impl StyleRule {
    pub fn style_for(self, props: &Properties) -> PathStyle {
        match self {
            Self::Default => PathStyle::default(),
            Self::TransmissionCapacity => {
                let band = CapacityBand::classify(properties::number(props, CAPACITY_PROPERTY));
                PathStyle {
                    color: band.color(),
                    weight: band.weight(),
                    opacity: LINE_OPACITY,
                    fill_color: band.color(),
                    ..PathStyle::default()
                }
            }
            Self::WaterBody => PathStyle {
                color: WATER_BORDER_COLOR,
                weight: 1.0,
                opacity: 0.8,
                fill: true,
                fill_color: WATER_FILL_COLOR,
                fill_opacity: 0.5,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line_style(capacity: serde_json::Value) -> PathStyle {
        let mut props = Properties::new();
        props.insert(CAPACITY_PROPERTY.to_owned(), capacity);
        StyleRule::TransmissionCapacity.style_for(&props)
    }

    #[test]
    fn capacity_thresholds_select_color_and_weight() {
        let cases = [
            (json!(500), HIGH_CAPACITY_COLOR, 4.0),
            (json!(765), HIGH_CAPACITY_COLOR, 4.0),
            (json!(499.9), MEDIUM_HIGH_CAPACITY_COLOR, 3.0),
            (json!(330), MEDIUM_HIGH_CAPACITY_COLOR, 3.0),
            (json!(220), MEDIUM_HIGH_CAPACITY_COLOR, 3.0),
            (json!(219), MEDIUM_CAPACITY_COLOR, 2.0),
            (json!(110), MEDIUM_CAPACITY_COLOR, 2.0),
            (json!(66), DEFAULT_COLOR, 2.0),
            (json!(null), DEFAULT_COLOR, 2.0),
        ];
        for (capacity, color, weight) in cases {
            let style = line_style(capacity.clone());
            assert_eq!(style.color, color, "capacity {capacity}");
            assert_eq!(style.weight, weight, "capacity {capacity}");
            assert_eq!(style.opacity, 0.8);
        }
    }

    #[test]
    fn numeric_string_capacity_is_coerced() {
        assert_eq!(line_style(json!("330")).color, MEDIUM_HIGH_CAPACITY_COLOR);
    }

    #[test]
    fn absent_capacity_uses_default_line() {
        let style = StyleRule::TransmissionCapacity.style_for(&Properties::new());
        assert_eq!(style.color, DEFAULT_COLOR);
        assert_eq!(style.weight, 2.0);
    }

    #[test]
    fn water_style_is_fixed() {
        let style = StyleRule::WaterBody.style_for(&Properties::new());
        assert_eq!(style.color, WATER_BORDER_COLOR);
        assert_eq!(style.fill_color, WATER_FILL_COLOR);
        assert_eq!(style.weight, 1.0);
        assert_eq!(style.opacity, 0.8);
        assert_eq!(style.fill_opacity, 0.5);
    }

    #[test]
    fn default_rule_has_no_override() {
        assert_eq!(
            StyleRule::Default.style_for(&Properties::new()),
            PathStyle::default()
        );
    }
}
