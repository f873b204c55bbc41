//! Static graph payloads: nodes, edges and generation parameters.

use serde::{Deserialize, Serialize};

use super::{Point, deserialize_id};
use crate::error::Error;
use crate::result::Result;

/// Role of a graph node in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Waiting,
    Charging,
    Pickdrop,
    /// Any value the backend sends that is not one of the above.
    #[default]
    #[serde(other)]
    Other,
}

impl NodeCategory {
    /// Single-character glyph used by text renderers.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Waiting => 'W',
            Self::Charging => 'C',
            Self::Pickdrop => 'P',
            Self::Other => 'o',
        }
    }
}

/// A node of the static graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "p", default)]
    pub category: NodeCategory,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64, category: NodeCategory) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            category,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An undirected edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(rename = "n1", deserialize_with = "deserialize_id")]
    pub a: String,
    #[serde(rename = "n2", deserialize_with = "deserialize_id")]
    pub b: String,
}

impl GraphEdge {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

/// The graph as served by `GET /graph`. Fetched once per drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// Validated parameters for `POST /gen_graph`.
///
/// Can only be constructed with every count at least 1, so a request with
/// invalid counts is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphParams {
    node_count: u32,
    waiting_count: u32,
    charging_count: u32,
    pickdrop_count: u32,
}

impl GraphParams {
    /// Validate raw user counts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` naming the first count below 1.
    pub fn new(nodes: i64, waiting: i64, charging: i64, pickdrop: i64) -> Result<Self> {
        Ok(Self {
            node_count: at_least_one("num_node", nodes)?,
            waiting_count: at_least_one("num_waiting", waiting)?,
            charging_count: at_least_one("num_charging", charging)?,
            pickdrop_count: at_least_one("num_pickdrop", pickdrop)?,
        })
    }

    #[must_use]
    pub const fn node_count(&self) -> u32 {
        self.node_count
    }

    #[must_use]
    pub const fn waiting_count(&self) -> u32 {
        self.waiting_count
    }

    #[must_use]
    pub const fn charging_count(&self) -> u32 {
        self.charging_count
    }

    #[must_use]
    pub const fn pickdrop_count(&self) -> u32 {
        self.pickdrop_count
    }

    /// Form fields in the order the backend documents them.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, u32); 4] {
        [
            ("num_node", self.node_count),
            ("num_waiting", self.waiting_count),
            ("num_charging", self.charging_count),
            ("num_pickdrop", self.pickdrop_count),
        ]
    }
}

/// Shared gate for every user-supplied count.
pub(crate) fn at_least_one(field: &'static str, value: i64) -> Result<u32> {
    if value < 1 {
        return Err(Error::validation(field, 1, value));
    }
    u32::try_from(value).map_err(|_| Error::validation(field, 1, value))
}
