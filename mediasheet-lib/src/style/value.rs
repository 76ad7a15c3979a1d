//! Style values as stored by the editor and their CSS text.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One property value, tagged by `type` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleValue {
    Keyword {
        value: String,
    },
    Unit {
        value: f64,
        unit: String,
    },
    Unparsed {
        value: String,
    },
    Rgb {
        r: u8,
        g: u8,
        b: u8,
        alpha: f64,
    },
    Var {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<Box<StyleValue>>,
    },
    Tuple {
        value: Vec<StyleValue>,
    },
    Layers {
        value: Vec<StyleValue>,
    },
    Invalid {
        value: String,
    },
}

impl StyleValue {
    pub fn keyword(value: &str) -> Self {
        StyleValue::Keyword {
            value: value.to_string(),
        }
    }

    pub fn unit(value: f64, unit: &str) -> Self {
        StyleValue::Unit {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn unparsed(value: &str) -> Self {
        StyleValue::Unparsed {
            value: value.to_string(),
        }
    }
}

/// Properties in insertion order; rules print them in this order.
pub type Style = IndexMap<String, StyleValue>;

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// CSS text of a single value.
pub fn to_value(value: &StyleValue) -> String {
    match value {
        StyleValue::Keyword { value } => value.clone(),
        StyleValue::Unit { value, unit } => {
            if unit == "number" {
                format_number(*value)
            } else {
                format!("{}{}", format_number(*value), unit)
            }
        }
        StyleValue::Unparsed { value } => value.clone(),
        StyleValue::Rgb { r, g, b, alpha } => {
            format!("rgba({}, {}, {}, {})", r, g, b, format_number(*alpha))
        }
        StyleValue::Var { value, fallback } => match fallback {
            Some(fallback) => format!("var(--{}, {})", value, to_value(fallback)),
            None => format!("var(--{})", value),
        },
        StyleValue::Tuple { value } => value.iter().map(to_value).collect::<Vec<_>>().join(" "),
        StyleValue::Layers { value } => {
            value.iter().map(to_value).collect::<Vec<_>>().join(", ")
        }
        // Invalid values are kept so the user can fix them, not printed.
        StyleValue::Invalid { .. } => String::new(),
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_value(self))
    }
}

/// `prop: value` pairs joined by `; `, skipping invalid values.
pub fn serialize_style(style: &Style) -> String {
    style
        .iter()
        .filter(|(_, value)| !matches!(value, StyleValue::Invalid { .. }))
        .map(|(property, value)| format!("{}: {}", property, to_value(value)))
        .collect::<Vec<_>>()
        .join("; ")
}
