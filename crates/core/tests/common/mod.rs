//! Scripted in-memory backend for behavioural tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};

use fleetview_core::models::{
    GraphEdge, GraphNode, GraphParams, GraphSnapshot, NodeCategory, RobotSnapshot, RobotState,
    TaskCount, TaskSnapshot,
};
use fleetview_core::{
    Error, FleetApi, PollTask, PollingScheduler, Result, SceneModel, TickGuard,
};

/// Every backend call the fake has served, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchGraph,
    GenerateGraph([u32; 4]),
    FetchRobots,
    AddRobot(f64, f64),
    RemoveAllRobots,
    GenerateTasks(u32),
    FetchTasks,
    Start,
    Stop,
}

#[derive(Default)]
struct State {
    graph: GraphSnapshot,
    robots: RobotSnapshot,
    tasks: TaskSnapshot,
    gated_robots: VecDeque<oneshot::Receiver<RobotSnapshot>>,
    failing: Vec<&'static str>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeFleetApi {
    state: Mutex<State>,
}

impl FakeFleetApi {
    pub fn with_graph(graph: GraphSnapshot) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                graph,
                ..State::default()
            }),
        })
    }

    pub async fn set_robots(&self, robots: RobotSnapshot) {
        self.state.lock().await.robots = robots;
    }

    pub async fn set_tasks(&self, tasks: TaskSnapshot) {
        self.state.lock().await.tasks = tasks;
    }

    /// Make the named operation fail with a 503 until further notice.
    pub async fn fail(&self, operation: &'static str) {
        self.state.lock().await.failing.push(operation);
    }

    pub async fn recover(&self) {
        self.state.lock().await.failing.clear();
    }

    /// The next `fetch_robots` waits for the returned sender.
    pub async fn gate_next_robot_fetch(&self) -> oneshot::Sender<RobotSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.state.lock().await.gated_robots.push_back(rx);
        tx
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn count(&self, call: fn(&Call) -> bool) -> usize {
        self.state.lock().await.calls.iter().filter(|c| call(c)).count()
    }

    async fn record(&self, call: Call, operation: &'static str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(Error::transport(Some(503), format!("{operation} unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl FleetApi for FakeFleetApi {
    async fn fetch_graph(&self) -> Result<GraphSnapshot> {
        self.record(Call::FetchGraph, "fetch_graph").await?;
        Ok(self.state.lock().await.graph.clone())
    }

    async fn generate_graph(&self, params: &GraphParams) -> Result<()> {
        let counts = [
            params.node_count(),
            params.waiting_count(),
            params.charging_count(),
            params.pickdrop_count(),
        ];
        self.record(Call::GenerateGraph(counts), "generate_graph").await
    }

    async fn fetch_robots(&self) -> Result<RobotSnapshot> {
        self.record(Call::FetchRobots, "fetch_robots").await?;
        let gate = self.state.lock().await.gated_robots.pop_front();
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| Error::transport(None, "gate dropped")),
            None => Ok(self.state.lock().await.robots.clone()),
        }
    }

    async fn add_robot(&self, x: f64, y: f64) -> Result<()> {
        self.record(Call::AddRobot(x, y), "add_robot").await
    }

    async fn remove_all_robots(&self) -> Result<()> {
        self.record(Call::RemoveAllRobots, "remove_all_robots").await
    }

    async fn generate_tasks(&self, count: TaskCount) -> Result<()> {
        self.record(Call::GenerateTasks(count.get()), "generate_tasks").await
    }

    async fn fetch_tasks(&self) -> Result<TaskSnapshot> {
        self.record(Call::FetchTasks, "fetch_tasks").await?;
        Ok(self.state.lock().await.tasks.clone())
    }

    async fn start_simulation(&self) -> Result<String> {
        self.record(Call::Start, "start").await?;
        Ok("Simulation started".to_string())
    }

    async fn stop_simulation(&self) -> Option<String> {
        self.record(Call::Stop, "stop")
            .await
            .ok()
            .map(|()| "Simulation stopped".to_string())
    }
}

/// Poll task that does nothing; used to obtain live guards.
pub struct IdleTask;

#[async_trait]
impl PollTask for IdleTask {
    async fn tick(&self, _guard: TickGuard) {}
}

/// A running scheduler that never ticks within a test, and a guard from it.
pub fn live_guard() -> Result<(PollingScheduler, TickGuard)> {
    let mut scheduler = PollingScheduler::new("test");
    scheduler.start(Duration::from_secs(3600), Arc::new(IdleTask))?;
    let guard = scheduler
        .current_guard()
        .ok_or_else(|| Error::invalid_config("scheduler not running"))?;
    Ok((scheduler, guard))
}

/// Three nodes in a line, one of each category.
pub fn line_graph() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![
            GraphNode::new("0", 0.0, 0.0, NodeCategory::Waiting),
            GraphNode::new("1", 50.0, 0.0, NodeCategory::Charging),
            GraphNode::new("2", 100.0, 0.0, NodeCategory::Pickdrop),
        ],
        edges: vec![GraphEdge::new("0", "1"), GraphEdge::new("1", "2")],
    }
}

pub fn robots(entries: &[(&str, f64, f64, f64)]) -> RobotSnapshot {
    RobotSnapshot::new(
        entries
            .iter()
            .map(|&(id, x, y, angle)| RobotState::new(id, x, y, angle, 100.0))
            .collect(),
    )
}

/// Keys and positions of every entity, in key order.
pub fn layout(scene: &SceneModel) -> Vec<(String, Option<(f64, f64)>)> {
    scene
        .entities()
        .map(|e| {
            (
                e.key().to_string(),
                e.position().map(|p| (p.x, p.y)),
            )
        })
        .collect()
}
