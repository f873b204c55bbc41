//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fleetview - live dashboard for a robot fleet simulation
#[derive(Parser, Debug)]
#[command(name = "fleetview")]
#[command(version)]
#[command(about = "Watch and drive a robot fleet simulation backend")]
#[command(
    long_about = "fleetview draws the simulation graph, keeps robot positions and the task queue live by polling the backend, and exposes every backend action as a subcommand."
)]
pub struct Cli {
    /// Backend URL (overrides the config file)
    #[arg(long, global = true, env = "FLEETVIEW_SERVER")]
    pub server: Option<String>,

    /// TOML config file
    #[arg(long, global = true, env = "FLEETVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the current graph
    Graph,

    /// Remove every robot and generate a new graph
    GenGraph {
        /// Total number of nodes
        #[arg(long, allow_negative_numbers = true)]
        nodes: i64,

        /// Number of waiting nodes
        #[arg(long, allow_negative_numbers = true)]
        waiting: i64,

        /// Number of charging nodes
        #[arg(long, allow_negative_numbers = true)]
        charging: i64,

        /// Number of pick/drop nodes
        #[arg(long, allow_negative_numbers = true)]
        pickdrop: i64,
    },

    /// Print robot positions and battery levels
    Robots,

    /// Add a robot on a graph node or at explicit coordinates
    AddRobot {
        /// Graph node to place the robot on
        #[arg(long, conflicts_with_all = ["x", "y"], required_unless_present = "x")]
        node: Option<String>,

        /// X coordinate
        #[arg(long, requires = "y", allow_negative_numbers = true)]
        x: Option<f64>,

        /// Y coordinate
        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<f64>,
    },

    /// Remove every robot
    RemoveRobots,

    /// Generate tasks
    GenTasks {
        /// Number of tasks to generate
        #[arg(short, long, allow_negative_numbers = true)]
        count: i64,
    },

    /// Print the task queue
    Tasks,

    /// Start the simulation
    Start,

    /// Stop the simulation
    Stop,

    /// Live dashboard until Ctrl+C; type `help` for in-session commands
    Watch {
        /// Disable colors and screen clearing
        #[arg(long, default_value_t = false)]
        plain: bool,
    },
}
