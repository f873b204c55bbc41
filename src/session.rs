//! In-session commands for `watch`.
//!
//! Each line read from stdin is parsed into a [`SessionCommand`] and run
//! against the live [`Dashboard`], so graph regeneration, robot placement and
//! the other workflows update the scene being drawn.

use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use tracing::warn;

use fleetview_core::{Dashboard, FleetApi};

/// Command summary shown by `help`.
pub const HELP: &str = "commands: regen <nodes> <waiting> <charging> <pickdrop> | place | node <id> | clear | tasks <count> | start | redraw | help | quit";

/// One line typed into a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Remove robots, generate a new graph and redraw it.
    Regenerate {
        nodes: i64,
        waiting: i64,
        charging: i64,
        pickdrop: i64,
    },
    /// Make graph nodes selectable for robot placement.
    Place,
    /// Put a robot on the node, ending placement.
    Node(String),
    /// Remove every robot.
    Clear,
    /// Generate tasks.
    Tasks(i64),
    Start,
    /// Fetch and draw the graph again.
    Redraw,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            bail!("Empty command. {HELP}");
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_lowercase().as_str(), args.as_slice()) {
            ("regen", [nodes, waiting, charging, pickdrop]) => Self::Regenerate {
                nodes: count(nodes)?,
                waiting: count(waiting)?,
                charging: count(charging)?,
                pickdrop: count(pickdrop)?,
            },
            ("place", []) => Self::Place,
            ("node", [node_id]) => Self::Node((*node_id).to_string()),
            ("clear", []) => Self::Clear,
            ("tasks", [n]) => Self::Tasks(count(n)?),
            ("start", []) => Self::Start,
            ("redraw", []) => Self::Redraw,
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            _ => bail!("Unknown command '{}'. {HELP}", s.trim()),
        };
        Ok(command)
    }
}

fn count(word: &str) -> Result<i64> {
    word.parse()
        .map_err(|_| anyhow!("'{word}' is not a whole number"))
}

/// What the session loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Keep running and show this status line.
    Message(String),
    Quit,
}

/// Run one command against the session.
///
/// # Errors
///
/// Returns the dashboard error for the workflow, with context.
pub async fn dispatch<A: FleetApi + 'static>(
    dashboard: &mut Dashboard<A>,
    command: SessionCommand,
) -> Result<Reply> {
    let message = match command {
        SessionCommand::Regenerate {
            nodes,
            waiting,
            charging,
            pickdrop,
        } => {
            dashboard
                .regenerate_graph(nodes, waiting, charging, pickdrop)
                .await
                .context("Failed to regenerate graph")?;
            format!("Graph regenerated with {nodes} nodes")
        }
        SessionCommand::Place => {
            dashboard.begin_robot_placement().await;
            "Placement active: enter 'node <id>'".to_string()
        }
        SessionCommand::Node(node_id) => {
            let position = dashboard
                .place_robot(&node_id)
                .await
                .with_context(|| format!("Failed to place robot on node {node_id}"))?;
            format!("Robot added at ({:.1}, {:.1})", position.x, position.y)
        }
        SessionCommand::Clear => {
            dashboard
                .clear_robots()
                .await
                .context("Failed to remove robots")?;
            "All robots removed".to_string()
        }
        SessionCommand::Tasks(n) => {
            dashboard
                .generate_tasks(n)
                .await
                .context("Failed to generate tasks")?;
            format!("Requested {n} tasks")
        }
        SessionCommand::Start => dashboard
            .start_simulation()
            .await
            .context("Failed to start simulation")?,
        SessionCommand::Redraw => {
            dashboard.draw_graph().await.context("Failed to draw graph")?;
            "Graph redrawn".to_string()
        }
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => return Ok(Reply::Quit),
    };
    Ok(Reply::Message(message))
}

/// Parse and run one input line. Failures become the status line; they never
/// end the session.
pub async fn handle_line<A: FleetApi + 'static>(dashboard: &mut Dashboard<A>, line: &str) -> Reply {
    let outcome = match line.parse::<SessionCommand>() {
        Ok(command) => dispatch(dashboard, command).await,
        Err(e) => Err(e),
    };
    outcome.unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), "Session command failed");
        Reply::Message(format!("error: {e:#}"))
    })
}
