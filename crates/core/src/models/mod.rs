//! Data models for the fleet backend payloads.
//!
//! These types mirror the JSON bodies served by the simulation backend and
//! are decoded directly from them.

pub mod colors;
pub mod graph;
pub mod robot;
pub mod task;

pub use colors::RgbColor;
pub use graph::{GraphEdge, GraphNode, GraphParams, GraphSnapshot, NodeCategory};
pub use robot::{RobotSnapshot, RobotState};
pub use task::{Task, TaskCount, TaskSnapshot, TaskStatus};

use serde::{Deserialize, Deserializer};

/// Point in scene coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by the given vector.
    #[must_use]
    pub fn offset(self, by: Self) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    /// Whether both coordinates are within `epsilon` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// Identifier as the backend emits it: numbers and strings are both accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Decode an identifier that may be a JSON number or string.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Decode a nullable identifier. `null`, negative numbers and empty strings
/// all mean "none".
pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| match id {
        RawId::Int(n) if n < 0 => None,
        RawId::Float(n) if n < 0.0 => None,
        RawId::Text(s) if s.is_empty() => None,
        other => Some(other.into_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Tagged {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_optional_id")]
        owner: Option<String>,
    }

    #[test]
    fn test_numeric_and_text_ids_decode_alike() -> Result<(), serde_json::Error> {
        let numeric: Tagged = serde_json::from_str(r#"{"id": 4, "owner": 2}"#)?;
        let text: Tagged = serde_json::from_str(r#"{"id": "4", "owner": "2"}"#)?;
        assert_eq!(numeric.id, text.id);
        assert_eq!(numeric.owner, text.owner);
        Ok(())
    }

    #[test]
    fn test_unassigned_sentinels_decode_to_none() -> Result<(), serde_json::Error> {
        for body in [
            r#"{"id": 1, "owner": null}"#,
            r#"{"id": 1, "owner": -1}"#,
            r#"{"id": 1, "owner": ""}"#,
            r#"{"id": 1}"#,
        ] {
            let tagged: Tagged = serde_json::from_str(body)?;
            assert_eq!(tagged.owner, None, "body: {body}");
        }
        Ok(())
    }

    #[test]
    fn test_ids_beyond_i64_stay_exact() -> Result<(), serde_json::Error> {
        let tagged: Tagged =
            serde_json::from_str(r#"{"id": 18446744073709551615, "owner": 9223372036854775808}"#)?;
        assert_eq!(tagged.id, "18446744073709551615");
        assert_eq!(tagged.owner.as_deref(), Some("9223372036854775808"));
        Ok(())
    }

    #[test]
    fn test_point_offset() {
        let p = Point::new(1.0, 2.0).offset(Point::new(3.0, -4.0));
        assert_eq!(p, Point::new(4.0, -2.0));
    }
}
