//! Scene Model: the addressable set of visual entities.
//!
//! Every entity is stored under a stable key synthesized from backend ids:
//!
//! | Entity | Key |
//! |---|---|
//! | graph node | `{node_id}` |
//! | graph edge | `{a}-{b}` |
//! | robot body | `robot-{robot_id}` |
//! | direction marker | `robot-marker-{robot_id}` |
//!
//! Graph entities are created once per drawing and never move. Robot
//! entities are upserted on every poll and only disappear through
//! [`SceneModel::remove_all_robot_entities`] or [`SceneModel::clear_all`].

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use tracing::{debug, warn};

use crate::error::{Error, SceneError};
use crate::models::{GraphEdge, GraphNode, GraphSnapshot, NodeCategory, Point};
use crate::result::Result;

/// Default distance between a robot body and its direction marker.
pub const DEFAULT_MARKER_RADIUS: f64 = 15.0;

/// Stable identifier of a scene entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(String);

impl EntityKey {
    #[must_use]
    pub fn node(node_id: &str) -> Self {
        Self(node_id.to_string())
    }

    #[must_use]
    pub fn edge(a: &str, b: &str) -> Self {
        Self(format!("{a}-{b}"))
    }

    #[must_use]
    pub fn robot_body(robot_id: &str) -> Self {
        Self(format!("robot-{robot_id}"))
    }

    #[must_use]
    pub fn robot_marker(robot_id: &str) -> Self {
        Self(format!("robot-marker-{robot_id}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an entity represents, with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    GraphNode {
        node_id: String,
        category: NodeCategory,
        selected: bool,
    },
    GraphEdge {
        source: String,
        target: String,
    },
    RobotBody {
        robot_id: String,
    },
    RobotMarker {
        robot_id: String,
        label: String,
    },
}

impl EntityKind {
    /// Robot bodies and markers; the entities `remove_all_robot_entities` drops.
    #[must_use]
    pub const fn is_robot_class(&self) -> bool {
        matches!(self, Self::RobotBody { .. } | Self::RobotMarker { .. })
    }
}

/// User-interaction flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    /// Position cannot change.
    pub locked: bool,
    /// User may drag the entity.
    pub grabbable: bool,
    /// User may select the entity.
    pub selectable: bool,
}

impl Interaction {
    const STATIC: Self = Self {
        locked: true,
        grabbable: false,
        selectable: false,
    };

    const MOBILE: Self = Self {
        locked: false,
        grabbable: false,
        selectable: false,
    };
}

/// A visual object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    key: EntityKey,
    kind: EntityKind,
    position: Option<Point>,
    interaction: Interaction,
}

impl SceneEntity {
    #[must_use]
    pub const fn key(&self) -> &EntityKey {
        &self.key
    }

    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Position of node-like entities; edges have none.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        self.position
    }

    #[must_use]
    pub const fn interaction(&self) -> Interaction {
        self.interaction
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    /// The key belongs to a locked entity, which was left untouched.
    Locked,
    /// The key belongs to an entity of another kind, which was left untouched.
    KindMismatch,
}

impl Upsert {
    /// Whether the scene refused the upsert.
    #[must_use]
    pub const fn is_refused(self) -> bool {
        matches!(self, Self::Locked | Self::KindMismatch)
    }
}

/// Marker offset from the robot body for a heading in degrees.
///
/// 0° points along +x. With screen coordinates (y down) 90° points down.
#[must_use]
pub fn marker_offset(angle_degrees: f64, radius: f64) -> Point {
    let radians = angle_degrees.to_radians();
    Point::new(radius * radians.cos(), radius * radians.sin())
}

/// The mutable visual scene graph.
#[derive(Debug, Clone)]
pub struct SceneModel {
    entities: BTreeMap<EntityKey, SceneEntity>,
    marker_radius: f64,
    nodes_selectable: bool,
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_RADIUS)
    }
}

impl SceneModel {
    #[must_use]
    pub const fn new(marker_radius: f64) -> Self {
        Self {
            entities: BTreeMap::new(),
            marker_radius,
            nodes_selectable: false,
        }
    }

    #[must_use]
    pub const fn marker_radius(&self) -> f64 {
        self.marker_radius
    }

    /// Add a static, locked graph node.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::DuplicateKey` if the key is taken.
    pub fn add_node(&mut self, node: &GraphNode) -> std::result::Result<(), SceneError> {
        let key = EntityKey::node(&node.id);
        self.insert_new(SceneEntity {
            key,
            kind: EntityKind::GraphNode {
                node_id: node.id.clone(),
                category: node.category,
                selected: false,
            },
            position: Some(node.position()),
            interaction: Interaction {
                selectable: self.nodes_selectable,
                ..Interaction::STATIC
            },
        })
    }

    /// Add a static edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::UnknownEndpoint` if either endpoint is not a graph
    /// node, or `SceneError::DuplicateKey` if the edge already exists.
    pub fn add_edge(&mut self, edge: &GraphEdge) -> std::result::Result<(), SceneError> {
        let key = EntityKey::edge(&edge.a, &edge.b);
        for endpoint in [&edge.a, &edge.b] {
            if !self.is_graph_node(endpoint) {
                return Err(SceneError::UnknownEndpoint {
                    edge: key.to_string(),
                    node: endpoint.clone(),
                });
            }
        }
        self.insert_new(SceneEntity {
            key,
            kind: EntityKind::GraphEdge {
                source: edge.a.clone(),
                target: edge.b.clone(),
            },
            position: None,
            interaction: Interaction::STATIC,
        })
    }

    /// Replace the whole scene with a freshly fetched graph.
    ///
    /// # Errors
    ///
    /// Propagates the first node or edge the scene rejects; entities added
    /// before the failure stay in place.
    pub fn load_graph(&mut self, graph: &GraphSnapshot) -> std::result::Result<(), SceneError> {
        self.clear_all();
        for node in &graph.nodes {
            self.add_node(node)?;
        }
        for edge in &graph.edges {
            self.add_edge(edge)?;
        }
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Graph loaded into scene"
        );
        Ok(())
    }

    /// Move the robot body to (x, y), creating it on first sighting.
    pub fn add_or_update_robot_body(&mut self, robot_id: &str, x: f64, y: f64) -> Upsert {
        let key = EntityKey::robot_body(robot_id);
        let kind = EntityKind::RobotBody {
            robot_id: robot_id.to_string(),
        };
        self.upsert(key, kind, Point::new(x, y))
    }

    /// Place the direction marker `marker_radius` away from (x, y) along
    /// `angle` degrees, creating it on first sighting.
    pub fn add_or_update_marker(&mut self, robot_id: &str, x: f64, y: f64, angle: f64) -> Upsert {
        let key = EntityKey::robot_marker(robot_id);
        let kind = EntityKind::RobotMarker {
            robot_id: robot_id.to_string(),
            label: robot_id.to_string(),
        };
        let position = Point::new(x, y).offset(marker_offset(angle, self.marker_radius));
        self.upsert(key, kind, position)
    }

    /// Drop every robot body and marker, keeping the static graph.
    pub fn remove_all_robot_entities(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, entity| !entity.kind.is_robot_class());
        before.saturating_sub(self.entities.len())
    }

    /// Drop every entity and reset the selection workflow.
    pub fn clear_all(&mut self) {
        self.entities.clear();
        self.nodes_selectable = false;
    }

    /// Toggle selectability on graph nodes. Disabling also clears selection.
    pub fn set_nodes_selectable(&mut self, selectable: bool) {
        self.nodes_selectable = selectable;
        for entity in self.entities.values_mut() {
            if let EntityKind::GraphNode { selected, .. } = &mut entity.kind {
                entity.interaction.selectable = selectable;
                if !selectable {
                    *selected = false;
                }
            }
        }
    }

    #[must_use]
    pub const fn nodes_selectable(&self) -> bool {
        self.nodes_selectable
    }

    /// Select a graph node and return its position.
    ///
    /// # Errors
    ///
    /// Returns `Error::PlacementNotActive` while nodes are not selectable and
    /// `Error::NodeNotFound` if no graph node has this id.
    pub fn select_node(&mut self, node_id: &str) -> Result<Point> {
        if !self.nodes_selectable {
            return Err(Error::PlacementNotActive);
        }
        let entity = self
            .entities
            .get_mut(node_id)
            .filter(|entity| matches!(entity.kind, EntityKind::GraphNode { .. }))
            .ok_or_else(|| Error::node_not_found(node_id))?;
        if let EntityKind::GraphNode { selected, .. } = &mut entity.kind {
            *selected = true;
        }
        entity.position.ok_or_else(|| Error::node_not_found(node_id))
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&SceneEntity> {
        self.entities.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in key order.
    pub fn entities(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.values()
    }

    /// Ids of robots that currently have a body in the scene.
    #[must_use]
    pub fn robot_ids(&self) -> Vec<&str> {
        self.entities
            .values()
            .filter_map(|entity| match &entity.kind {
                EntityKind::RobotBody { robot_id } => Some(robot_id.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.count(|kind| matches!(kind, EntityKind::GraphNode { .. }))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.count(|kind| matches!(kind, EntityKind::GraphEdge { .. }))
    }

    #[must_use]
    pub fn robot_entity_count(&self) -> usize {
        self.count(EntityKind::is_robot_class)
    }

    fn count(&self, predicate: impl Fn(&EntityKind) -> bool) -> usize {
        self.entities
            .values()
            .filter(|entity| predicate(&entity.kind))
            .count()
    }

    fn is_graph_node(&self, node_id: &str) -> bool {
        self.entities
            .get(node_id)
            .is_some_and(|entity| matches!(entity.kind, EntityKind::GraphNode { .. }))
    }

    fn insert_new(&mut self, entity: SceneEntity) -> std::result::Result<(), SceneError> {
        if self.entities.contains_key(&entity.key) {
            return Err(SceneError::DuplicateKey {
                key: entity.key.to_string(),
            });
        }
        self.entities.insert(entity.key.clone(), entity);
        Ok(())
    }

    fn upsert(&mut self, key: EntityKey, kind: EntityKind, position: Point) -> Upsert {
        match self.entities.get_mut(&key) {
            Some(existing) if existing.interaction.locked => {
                warn!(key = %key, "Refusing to move locked entity");
                Upsert::Locked
            }
            Some(existing) if mem::discriminant(&existing.kind) != mem::discriminant(&kind) => {
                warn!(key = %key, "Refusing to overwrite entity of another kind");
                Upsert::KindMismatch
            }
            Some(existing) => {
                existing.position = Some(position);
                if let (
                    EntityKind::RobotMarker { label, .. },
                    EntityKind::RobotMarker {
                        label: fresh_label, ..
                    },
                ) = (&mut existing.kind, kind)
                {
                    *label = fresh_label;
                }
                Upsert::Updated
            }
            None => {
                self.entities.insert(
                    key.clone(),
                    SceneEntity {
                        key,
                        kind,
                        position: Some(position),
                        interaction: Interaction::MOBILE,
                    },
                );
                Upsert::Created
            }
        }
    }
}
