//! fleetview-core: live view of a fleet simulation.
//!
//! Keeps a scene of graph nodes, edges, robots and heading markers in step
//! with a remote simulation backend:
//!
//! - [`scene`]: keyed visual entities with upsert semantics
//! - [`reconciler`]: applies robot snapshots to the scene
//! - [`scheduler`]: periodic polling with a stop guard
//! - [`views`]: task board, robot info panel and graph info
//! - [`dashboard`]: the session workflows built from the above
//!
//! The backend itself is reached through the [`FleetApi`] trait.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod result;
pub mod scene;
pub mod scheduler;
pub mod views;

pub use api::FleetApi;
pub use config::FleetviewConfig;
pub use dashboard::Dashboard;
pub use error::{Error, SceneError};
pub use reconciler::{EntityReconciler, ReconcileReport, SharedScene, reconcile};
pub use result::{Result, ResultExt};
pub use scene::{EntityKey, EntityKind, Interaction, SceneEntity, SceneModel, Upsert, marker_offset};
pub use scheduler::{PollTask, PollingScheduler, SchedulerState, TickGuard};
pub use views::{DashboardView, GraphInfo, RobotInfoPanel, RobotInfoRow, TaskBoard};
