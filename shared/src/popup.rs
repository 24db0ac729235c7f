use std::fmt;

use serde::{Deserialize, Serialize};

use crate::properties::{self, Properties};
use crate::style::CAPACITY_PROPERTY;

const NAME_PROPERTY: &str = "name";
const REGION_PROPERTY: &str = "region";
const NAME_PLACEHOLDER: &str = "N/A";

/// A popup line source, listed in display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupField {
    /// Always shown; `N/A` when missing.
    Name,
    /// Shown with a `kV` unit when present.
    Capacity,
    /// Shown when present.
    Region,
}

/// Fields every dataset shows, in order.
pub const STANDARD_FIELDS: &[PopupField] =
    &[PopupField::Name, PopupField::Capacity, PopupField::Region];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupLine {
    pub label: String,
    pub value: String,
}

impl fmt::Display for PopupLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupContent {
    pub lines: Vec<PopupLine>,
}

impl PopupContent {
    pub fn build(fields: &[PopupField], props: &Properties) -> Self {
        let lines = fields
            .iter()
            .filter_map(|field| field.line(props))
            .collect();
        Self { lines }
    }

    /// Single-line text form, lines separated by ` / `.
    pub fn to_plain(&self) -> String {
        self.lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl PopupField {
    fn line(self, props: &Properties) -> Option<PopupLine> {
        match self {
            Self::Name => Some(PopupLine {
                label: "Name".to_owned(),
                value: properties::truthy(props, NAME_PROPERTY)
                    .map(properties::display_value)
                    .unwrap_or_else(|| NAME_PLACEHOLDER.to_owned()),
            }),
            Self::Capacity => {
                properties::truthy(props, CAPACITY_PROPERTY).map(|value| PopupLine {
                    label: CAPACITY_PROPERTY.to_owned(),
                    value: format!("{} kV", properties::display_value(value)),
                })
            }
            Self::Region => properties::truthy(props, REGION_PROPERTY).map(|value| PopupLine {
                label: "Region".to_owned(),
                value: properties::display_value(value),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(props: serde_json::Value) -> PopupContent {
        let serde_json::Value::Object(props) = props else {
            panic!("test properties must be an object");
        };
        PopupContent::build(STANDARD_FIELDS, &props)
    }

    #[test]
    fn transmission_line_popup() {
        let popup = content(json!({ "name": "Taree to Stroud", "capacitykv": 330 }));
        assert_eq!(popup.to_plain(), "Name: Taree to Stroud / capacitykv: 330 kV");
    }

    #[test]
    fn missing_name_shows_placeholder() {
        assert_eq!(content(json!({})).to_plain(), "Name: N/A");
        assert_eq!(content(json!({ "name": null })).to_plain(), "Name: N/A");
        assert_eq!(content(json!({ "name": "" })).to_plain(), "Name: N/A");
    }

    #[test]
    fn optional_lines_follow_priority() {
        let popup = content(json!({
            "region": "NSW",
            "capacitykv": "132",
            "name": "Tomago",
        }));
        let labels: Vec<&str> = popup.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Name", "capacitykv", "Region"]);
        assert_eq!(
            popup.to_plain(),
            "Name: Tomago / capacitykv: 132 kV / Region: NSW"
        );
    }

    #[test]
    fn zero_capacity_is_omitted() {
        assert_eq!(
            content(json!({ "name": "Spur", "capacitykv": 0 })).to_plain(),
            "Name: Spur"
        );
    }
}
