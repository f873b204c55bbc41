//! Auxiliary views refreshed alongside the scene: task board, robot info
//! panel and graph info.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use itertools::Itertools;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::FleetApi;
use crate::models::{GraphSnapshot, NodeCategory, RobotSnapshot, Task, TaskSnapshot, TaskStatus};
use crate::result::ResultExt;
use crate::scene::SceneModel;
use crate::scheduler::{PollTask, SchedulerState, TickGuard};

/// The task queue as last reported. Each refresh replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn replace(&mut self, snapshot: TaskSnapshot) {
        self.tasks = snapshot.tasks;
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks per status, in display order.
    #[must_use]
    pub fn status_counts(&self) -> [(TaskStatus, usize); 3] {
        let counts: HashMap<TaskStatus, usize> = self.tasks.iter().map(|t| t.status).counts();
        TaskStatus::ALL.map(|status| (status, counts.get(&status).copied().unwrap_or(0)))
    }
}

/// One row of the robot info panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotInfoRow {
    pub id: String,
    pub battery: f64,
    pub x: f64,
    pub y: f64,
}

/// Battery and position per robot, keyed by id. Rows are upserted, never
/// dropped by a refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotInfoPanel {
    rows: BTreeMap<String, RobotInfoRow>,
}

impl RobotInfoPanel {
    pub fn upsert(&mut self, snapshot: &RobotSnapshot) {
        for robot in &snapshot.robots {
            self.rows.insert(
                robot.id.clone(),
                RobotInfoRow {
                    id: robot.id.clone(),
                    battery: robot.battery,
                    x: robot.x,
                    y: robot.y,
                },
            );
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows in id order.
    pub fn rows(&self) -> impl Iterator<Item = &RobotInfoRow> {
        self.rows.values()
    }

    #[must_use]
    pub fn get(&self, robot_id: &str) -> Option<&RobotInfoRow> {
        self.rows.get(robot_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Node totals computed when a graph is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphInfo {
    pub total: usize,
    pub waiting: usize,
    pub charging: usize,
    pub pickdrop: usize,
}

impl GraphInfo {
    #[must_use]
    pub fn from_graph(graph: &GraphSnapshot) -> Self {
        let counts: HashMap<NodeCategory, usize> =
            graph.nodes.iter().map(|node| node.category).counts();
        let count = |category: NodeCategory| counts.get(&category).copied().unwrap_or(0);
        Self {
            total: graph.nodes.len(),
            waiting: count(NodeCategory::Waiting),
            charging: count(NodeCategory::Charging),
            pickdrop: count(NodeCategory::Pickdrop),
        }
    }
}

pub type SharedTaskBoard = Arc<RwLock<TaskBoard>>;
pub type SharedRobotPanel = Arc<RwLock<RobotInfoPanel>>;

/// Poll task that replaces the task board with every fetch.
pub struct TaskBoardRefresher<A> {
    api: Arc<A>,
    board: SharedTaskBoard,
}

impl<A: FleetApi + 'static> TaskBoardRefresher<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, board: SharedTaskBoard) -> Self {
        Self { api, board }
    }

    /// Returns whether the board was refreshed.
    pub async fn run_once(&self, guard: &TickGuard) -> bool {
        let Some(snapshot) = self
            .api
            .fetch_tasks()
            .await
            .warn_on_err("Task poll failed; keeping last task board")
        else {
            return false;
        };

        let mut board = self.board.write().await;
        if !guard.is_current() {
            debug!("Discarding task snapshot from a stopped poller");
            return false;
        }
        board.replace(snapshot);
        debug!(tasks = board.len(), "Task board refreshed");
        true
    }
}

#[async_trait]
impl<A: FleetApi + 'static> PollTask for TaskBoardRefresher<A> {
    async fn tick(&self, guard: TickGuard) {
        self.run_once(&guard).await;
    }
}

/// Poll task that upserts robot info rows with every fetch.
pub struct RobotPanelRefresher<A> {
    api: Arc<A>,
    panel: SharedRobotPanel,
}

impl<A: FleetApi + 'static> RobotPanelRefresher<A> {
    #[must_use]
    pub const fn new(api: Arc<A>, panel: SharedRobotPanel) -> Self {
        Self { api, panel }
    }

    /// Returns whether the panel was refreshed.
    pub async fn run_once(&self, guard: &TickGuard) -> bool {
        let Some(snapshot) = self
            .api
            .fetch_robots()
            .await
            .warn_on_err("Robot info poll failed; keeping last panel")
        else {
            return false;
        };

        let mut panel = self.panel.write().await;
        if !guard.is_current() {
            debug!("Discarding robot info from a stopped poller");
            return false;
        }
        panel.upsert(&snapshot);
        debug!(robots = panel.len(), "Robot info refreshed");
        true
    }
}

#[async_trait]
impl<A: FleetApi + 'static> PollTask for RobotPanelRefresher<A> {
    async fn tick(&self, guard: TickGuard) {
        self.run_once(&guard).await;
    }
}

/// Point-in-time copy of everything a presenter draws.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub scene: SceneModel,
    pub graph_info: Option<GraphInfo>,
    pub task_board: TaskBoard,
    pub robot_panel: RobotInfoPanel,
    pub robot_polling: SchedulerState,
    pub task_polling: SchedulerState,
    pub info_polling: SchedulerState,
}
