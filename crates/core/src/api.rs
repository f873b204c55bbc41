//! Contract of the fleet simulation backend.

use async_trait::async_trait;

use crate::models::{GraphParams, GraphSnapshot, RobotSnapshot, TaskCount, TaskSnapshot};
use crate::result::Result;

/// Typed access to the backend endpoints.
///
/// Each call issues exactly one request and is never retried. Failures
/// surface as `Error::Transport`, except for [`FleetApi::stop_simulation`].
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// `GET /graph`
    async fn fetch_graph(&self) -> Result<GraphSnapshot>;

    /// `POST /gen_graph`
    async fn generate_graph(&self, params: &GraphParams) -> Result<()>;

    /// `GET /robots`
    async fn fetch_robots(&self) -> Result<RobotSnapshot>;

    /// `POST /add_robot`
    async fn add_robot(&self, x: f64, y: f64) -> Result<()>;

    /// `POST /remove_robots`
    async fn remove_all_robots(&self) -> Result<()>;

    /// `POST /generate_tasks`
    async fn generate_tasks(&self, count: TaskCount) -> Result<()>;

    /// `GET /tasks`
    async fn fetch_tasks(&self) -> Result<TaskSnapshot>;

    /// `POST /start`, returning the server's message.
    async fn start_simulation(&self) -> Result<String>;

    /// `POST /stop`. Best effort: failures are logged and yield `None`.
    async fn stop_simulation(&self) -> Option<String>;
}
