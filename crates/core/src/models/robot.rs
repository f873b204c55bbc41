//! Robot state as reported on every poll cycle.

use serde::{Deserialize, Serialize};

use super::{Point, deserialize_id};

/// One robot's authoritative state for a single poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Direction of travel in degrees.
    #[serde(default)]
    pub angle: f64,
    /// Charge level, 0 to 100.
    #[serde(default)]
    pub battery: f64,
}

impl RobotState {
    pub fn new(id: impl Into<String>, x: f64, y: f64, angle: f64, battery: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            angle,
            battery,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Body of `GET /robots`. Ordering carries no meaning; consumers key by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotSnapshot {
    #[serde(default)]
    pub robots: Vec<RobotState>,
}

impl RobotSnapshot {
    #[must_use]
    pub const fn new(robots: Vec<RobotState>) -> Self {
        Self { robots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_payload_decodes() -> Result<(), serde_json::Error> {
        let body = r#"{
"robots": [
{"id": 3, "x": 12.5, "y": 40, "angle": 270, "battery": 88.5}
]
}
"#;
        let snapshot: RobotSnapshot = serde_json::from_str(body)?;
        assert_eq!(
            snapshot.robots,
            vec![RobotState::new("3", 12.5, 40.0, 270.0, 88.5)]
        );
        Ok(())
    }

    #[test]
    fn test_empty_robot_list() -> Result<(), serde_json::Error> {
        let snapshot: RobotSnapshot = serde_json::from_str("{\n\"robots\": [\n]\n}\n")?;
        assert!(snapshot.is_empty());
        Ok(())
    }
}
