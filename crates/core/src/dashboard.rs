//! Dashboard session: the user workflows that tie the backend, the scene and
//! the pollers together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use crate::api::FleetApi;
use crate::config::FleetviewConfig;
use crate::models::{GraphParams, Point, TaskCount};
use crate::reconciler::{EntityReconciler, SharedScene};
use crate::result::Result;
use crate::scene::SceneModel;
use crate::scheduler::PollingScheduler;
use crate::views::{
    DashboardView, GraphInfo, RobotPanelRefresher, SharedRobotPanel, SharedTaskBoard,
    TaskBoardRefresher,
};

/// One dashboard session against a backend.
///
/// Owns the shared scene and views plus three pollers: robot reconciliation,
/// task board and robot info panel.
pub struct Dashboard<A: FleetApi + 'static> {
    api: Arc<A>,
    scene: SharedScene,
    task_board: SharedTaskBoard,
    robot_panel: SharedRobotPanel,
    graph_info: Option<GraphInfo>,
    robot_poller: PollingScheduler,
    task_poller: PollingScheduler,
    info_poller: PollingScheduler,
    robot_period: Duration,
    task_period: Duration,
    info_period: Duration,
}

impl<A: FleetApi + 'static> Dashboard<A> {
    #[must_use]
    pub fn new(api: Arc<A>, config: &FleetviewConfig) -> Self {
        Self {
            api,
            scene: Arc::new(RwLock::new(SceneModel::new(config.marker_radius))),
            task_board: SharedTaskBoard::default(),
            robot_panel: SharedRobotPanel::default(),
            graph_info: None,
            robot_poller: PollingScheduler::new("robots"),
            task_poller: PollingScheduler::new("tasks"),
            info_poller: PollingScheduler::new("robot-info"),
            robot_period: config.robot_poll_period(),
            task_period: config.task_poll_period(),
            info_period: config.info_poll_period(),
        }
    }

    /// Start the task and info pollers, then draw the graph.
    ///
    /// Pollers that are already running are left alone, so calling `open`
    /// again after a failed draw only retries the draw. The task and info
    /// pollers keep running when the draw fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` for a zero poll period, otherwise
    /// whatever [`Dashboard::draw_graph`] returns.
    pub async fn open(&mut self) -> Result<()> {
        if !self.task_poller.is_running() {
            let board =
                TaskBoardRefresher::new(Arc::clone(&self.api), Arc::clone(&self.task_board));
            self.task_poller.start(self.task_period, Arc::new(board))?;
        }
        if !self.info_poller.is_running() {
            let panel =
                RobotPanelRefresher::new(Arc::clone(&self.api), Arc::clone(&self.robot_panel));
            self.info_poller.start(self.info_period, Arc::new(panel))?;
        }

        info!("Dashboard opened");
        self.draw_graph().await
    }

    /// Whether the current graph has been drawn into the scene.
    #[must_use]
    pub const fn has_graph(&self) -> bool {
        self.graph_info.is_some()
    }

    /// Fetch the graph, rebuild the scene from it and (re)start robot polling.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the fetch fails, or a scene error if the
    /// graph is malformed. Robot polling is not restarted in either case.
    pub async fn draw_graph(&mut self) -> Result<()> {
        let graph = self.api.fetch_graph().await?;

        self.robot_poller.stop();
        self.scene.write().await.load_graph(&graph)?;
        let graph_info = GraphInfo::from_graph(&graph);
        self.graph_info = Some(graph_info);

        let reconciler = EntityReconciler::new(Arc::clone(&self.api), Arc::clone(&self.scene));
        self.robot_poller.start(self.robot_period, Arc::new(reconciler))?;

        info!(
            nodes = graph_info.total,
            edges = graph.edges.len(),
            "Graph drawn"
        );
        Ok(())
    }

    /// Ask the backend for a new graph and redraw.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` without touching anything if a count is
    /// below 1, otherwise the first transport or scene error.
    pub async fn regenerate_graph(
        &mut self,
        nodes: i64,
        waiting: i64,
        charging: i64,
        pickdrop: i64,
    ) -> Result<()> {
        let params = GraphParams::new(nodes, waiting, charging, pickdrop)?;

        self.robot_poller.stop();
        self.scene.write().await.clear_all();
        self.robot_panel.write().await.clear();
        self.graph_info = None;

        self.api.remove_all_robots().await?;
        self.api.generate_graph(&params).await?;
        info!(nodes = params.node_count(), "Graph regenerated");
        self.draw_graph().await
    }

    /// Make graph nodes selectable so one can be picked for a new robot.
    pub async fn begin_robot_placement(&self) {
        self.scene.write().await.set_nodes_selectable(true);
    }

    /// Add a robot on the selected node and end placement.
    ///
    /// Placement ends whether or not the robot was added.
    ///
    /// # Errors
    ///
    /// Returns `Error::PlacementNotActive` if placement was not begun,
    /// `Error::NodeNotFound` for an unknown node, or the transport error.
    pub async fn place_robot(&self, node_id: &str) -> Result<Point> {
        let selected = self.scene.write().await.select_node(node_id);
        let added = match selected {
            Ok(position) => self
                .api
                .add_robot(position.x, position.y)
                .await
                .map(|()| position),
            Err(e) => Err(e),
        };
        self.scene.write().await.set_nodes_selectable(false);

        let position = added?;
        info!(node = node_id, x = position.x, y = position.y, "Robot placed");
        Ok(position)
    }

    /// Drop robots locally, then ask the backend to remove them.
    ///
    /// # Errors
    ///
    /// Returns the transport error; the local clear has already happened.
    pub async fn clear_robots(&self) -> Result<()> {
        let removed = self.scene.write().await.remove_all_robot_entities();
        self.robot_panel.write().await.clear();
        info!(removed, "Robot entities cleared");
        self.api.remove_all_robots().await
    }

    /// # Errors
    ///
    /// Returns `Error::Validation` without issuing a request if `count` is
    /// below 1, otherwise the transport error.
    pub async fn generate_tasks(&self, count: i64) -> Result<()> {
        let count = TaskCount::new(count)?;
        self.api.generate_tasks(count).await?;
        info!(count = count.get(), "Tasks requested");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn start_simulation(&self) -> Result<String> {
        let message = self.api.start_simulation().await?;
        info!(message = %message, "Simulation started");
        Ok(message)
    }

    /// Tear the session down. Never fails.
    ///
    /// Pollers stop and every view is cleared before the backend is asked to
    /// stop, so an unreachable backend cannot keep the session alive.
    pub async fn stop(&mut self) -> Option<String> {
        self.robot_poller.stop();
        self.task_poller.stop();
        self.info_poller.stop();

        self.scene.write().await.clear_all();
        self.task_board.write().await.clear();
        self.robot_panel.write().await.clear();
        self.graph_info = None;

        let message = self.api.stop_simulation().await;
        info!(message = ?message, "Dashboard stopped");
        message
    }

    /// Snapshot of everything a presenter needs.
    pub async fn view(&self) -> DashboardView {
        DashboardView {
            scene: self.scene.read().await.clone(),
            graph_info: self.graph_info,
            task_board: self.task_board.read().await.clone(),
            robot_panel: self.robot_panel.read().await.clone(),
            robot_polling: self.robot_poller.state(),
            task_polling: self.task_poller.state(),
            info_polling: self.info_poller.state(),
        }
    }

    /// Shared handle on the scene.
    #[must_use]
    pub fn scene(&self) -> SharedScene {
        Arc::clone(&self.scene)
    }
}
