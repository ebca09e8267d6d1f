//! Terminal literal values

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A terminal literal: the only thing a resolution chain may end in, and
/// the only thing ever written to the style scope.
///
/// Serialized form is the bare JSON scalar, so a persisted override map
/// reads as `{ "size/md": 24, "color/gray/900": "#10131a" }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    /// Text values holding a hex color parse into a [`Color`].
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Color::parse_hex(s).ok(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // Whole numbers print without the trailing `.0` so emitted
            // declarations read `16`, not `16.0`.
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_display_without_fraction() {
        assert_eq!(Value::Number(16.0).to_string(), "16");
        assert_eq!(Value::Number(12.5).to_string(), "12.5");
        assert_eq!(Value::Text("#1e66f5".into()).to_string(), "#1e66f5");
    }

    #[test]
    fn serde_round_trip_is_untagged() {
        let json = serde_json::to_string(&Value::Number(24.0)).unwrap();
        assert_eq!(json, "24.0");
        assert_eq!(
            serde_json::from_str::<Value>("\"#10131a\"").unwrap(),
            Value::Text("#10131a".into())
        );
    }

    #[test]
    fn hex_text_parses_as_color() {
        let value = Value::Text("#ffffff".into());
        assert_eq!(value.as_color(), Some(Color::WHITE));
        assert_eq!(Value::Number(1.0).as_color(), None);
    }
}
