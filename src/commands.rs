//! CLI command handlers.
//!
//! Read-only commands query the backend directly. Commands that change the
//! simulation run the matching [`Dashboard`] workflow on a short-lived
//! session; `watch` runs a full session until Ctrl+C or `quit`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::io::{self, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use fleetview_client::FleetClient;
use fleetview_core::models::Point;
use fleetview_core::views::{GraphInfo, RobotInfoPanel, TaskBoard};
use fleetview_core::{Dashboard, FleetApi, FleetviewConfig};

use crate::cli::{Cli, Commands};
use crate::render::Renderer;
use crate::session::{HELP, Reply, handle_line};

/// Execute a CLI command.
///
/// This is the main command dispatcher that routes to the appropriate handler.
pub async fn execute_command(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.server.as_deref())?;
    let client = Arc::new(
        FleetClient::new(&config).context("Failed to build the backend client")?,
    );

    match cli.command {
        Commands::Graph => cmd_graph(&client).await,
        Commands::GenGraph {
            nodes,
            waiting,
            charging,
            pickdrop,
        } => cmd_gen_graph(&client, &config, nodes, waiting, charging, pickdrop).await,
        Commands::Robots => cmd_robots(&client).await,
        Commands::AddRobot { node, x, y } => cmd_add_robot(&client, &config, node, x, y).await,
        Commands::RemoveRobots => cmd_remove_robots(&client, &config).await,
        Commands::GenTasks { count } => cmd_gen_tasks(&client, &config, count).await,
        Commands::Tasks => cmd_tasks(&client).await,
        Commands::Start => cmd_start(&client, &config).await,
        Commands::Stop => cmd_stop(&client, &config).await,
        Commands::Watch { plain } => cmd_watch(client, &config, plain).await,
    }
}

/// `--server` beats the config file, which beats the defaults.
pub fn resolve_config(path: Option<&Path>, server: Option<&str>) -> Result<FleetviewConfig> {
    let config = match path {
        Some(path) => FleetviewConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FleetviewConfig::default(),
    };
    let config = match server {
        Some(server) => config.with_server_url(server),
        None => config,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn cmd_graph(client: &FleetClient) -> Result<()> {
    let graph = client.fetch_graph().await.context("Failed to fetch graph")?;
    let info = GraphInfo::from_graph(&graph);
    print!("{}", Renderer::plain().render_graph_info(&info));
    println!("Edges:    {}", graph.edges.len());
    println!("\nNodes:");
    for node in &graph.nodes {
        println!(
            "  {:<6} {} ({:.1}, {:.1})",
            node.id,
            node.category.glyph(),
            node.x,
            node.y
        );
    }
    Ok(())
}

/// Session for a one-shot workflow. Its pollers stop when it is dropped.
fn session(client: &Arc<FleetClient>, config: &FleetviewConfig) -> Dashboard<FleetClient> {
    Dashboard::new(Arc::clone(client), config)
}

async fn cmd_gen_graph(
    client: &Arc<FleetClient>,
    config: &FleetviewConfig,
    nodes: i64,
    waiting: i64,
    charging: i64,
    pickdrop: i64,
) -> Result<()> {
    let mut dashboard = session(client, config);
    dashboard
        .regenerate_graph(nodes, waiting, charging, pickdrop)
        .await
        .context("Failed to generate graph")?;
    match dashboard.view().await.graph_info {
        Some(info) => print!("{}", Renderer::plain().render_graph_info(&info)),
        None => println!("Graph generated with {nodes} nodes"),
    }
    Ok(())
}

async fn cmd_robots(client: &FleetClient) -> Result<()> {
    let robots = client.fetch_robots().await.context("Failed to fetch robots")?;
    let mut panel = RobotInfoPanel::default();
    panel.upsert(&robots);
    print!("{}", Renderer::plain().render_robot_panel(&panel));
    Ok(())
}

async fn cmd_add_robot(
    client: &Arc<FleetClient>,
    config: &FleetviewConfig,
    node: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
) -> Result<()> {
    let position = match (node, x, y) {
        (Some(node), _, _) => {
            let mut dashboard = session(client, config);
            dashboard
                .draw_graph()
                .await
                .context("Failed to fetch graph")?;
            dashboard.begin_robot_placement().await;
            dashboard
                .place_robot(&node)
                .await
                .with_context(|| format!("Failed to add robot on node {node}"))?
        }
        (None, Some(x), Some(y)) => {
            client
                .add_robot(x, y)
                .await
                .context("Failed to add robot")?;
            Point::new(x, y)
        }
        _ => bail!("Pass either --node or both --x and --y"),
    };
    println!("Robot added at ({:.1}, {:.1})", position.x, position.y);
    Ok(())
}

async fn cmd_remove_robots(client: &Arc<FleetClient>, config: &FleetviewConfig) -> Result<()> {
    session(client, config)
        .clear_robots()
        .await
        .context("Failed to remove robots")?;
    println!("All robots removed");
    Ok(())
}

async fn cmd_gen_tasks(client: &Arc<FleetClient>, config: &FleetviewConfig, count: i64) -> Result<()> {
    session(client, config)
        .generate_tasks(count)
        .await
        .context("Failed to generate tasks")?;
    println!("Requested {count} tasks");
    Ok(())
}

async fn cmd_tasks(client: &FleetClient) -> Result<()> {
    let tasks = client.fetch_tasks().await.context("Failed to fetch tasks")?;
    let mut board = TaskBoard::default();
    board.replace(tasks);
    print!("{}", Renderer::plain().render_task_board(&board));
    Ok(())
}

async fn cmd_start(client: &Arc<FleetClient>, config: &FleetviewConfig) -> Result<()> {
    let message = session(client, config)
        .start_simulation()
        .await
        .context("Failed to start simulation")?;
    println!("{message}");
    Ok(())
}

async fn cmd_stop(client: &Arc<FleetClient>, config: &FleetviewConfig) -> Result<()> {
    match session(client, config).stop().await {
        Some(message) => println!("{message}"),
        None => println!("Stop request did not succeed; see log for details"),
    }
    Ok(())
}

/// Run a dashboard session until Ctrl+C or `quit`, then stop it.
///
/// Lines on stdin are session commands. A graph that cannot be drawn is
/// retried every `graph_retry_ms` while the other pollers keep running.
async fn cmd_watch(client: Arc<FleetClient>, config: &FleetviewConfig, plain: bool) -> Result<()> {
    let renderer = if plain {
        Renderer::plain()
    } else {
        Renderer::default()
    };
    let mut dashboard = Dashboard::new(client, config);
    if let Err(e) = dashboard.open().await {
        warn!(error = %e, retry = ?config.graph_retry_period(), "Failed to draw graph; will retry");
    }

    let mut redraw = time::interval(config.render_period());
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let retry_period = config.graph_retry_period();
    let first_retry = Instant::now()
        .checked_add(retry_period)
        .unwrap_or_else(Instant::now);
    let mut retry = time::interval_at(first_retry, retry_period);
    retry.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut input = BufReader::new(io::stdin()).lines();
    let mut input_open = true;
    let mut stdout = io::stdout();
    let mut status = HELP.to_string();

    loop {
        tokio::select! {
            signal = signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
                info!("Received Ctrl+C, stopping dashboard");
                break;
            }
            _ = retry.tick(), if !dashboard.has_graph() => {
                if let Err(e) = dashboard.draw_graph().await {
                    warn!(error = %e, "Graph draw failed; will retry");
                }
            }
            line = input.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => match handle_line(&mut dashboard, &line).await {
                        Reply::Quit => break,
                        Reply::Message(message) => status = message,
                    },
                    Ok(None) => {
                        debug!("stdin closed; session commands disabled");
                        input_open = false;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin; session commands disabled");
                        input_open = false;
                    }
                }
            }
            _ = redraw.tick() => {
                let frame = renderer.render_dashboard(&dashboard.view().await);
                write_frame(&mut stdout, &frame, &status).await?;
            }
        }
    }

    if let Some(message) = dashboard.stop().await {
        println!("{message}");
    }
    Ok(())
}

/// Write a frame and its status line. Waiting on a slow terminal yields to the
/// pollers instead of blocking the runtime.
async fn write_frame<W: AsyncWrite + Unpin>(out: &mut W, frame: &str, status: &str) -> Result<()> {
    out.write_all(frame.as_bytes())
        .await
        .context("Failed to write frame")?;
    out.write_all(status.as_bytes())
        .await
        .context("Failed to write status line")?;
    out.write_all(b"\n").await.context("Failed to write status line")?;
    out.flush().await.context("Failed to flush frame")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file_or_flag() -> Result<()> {
        let config = resolve_config(None, None)?;
        assert_eq!(config, FleetviewConfig::default());
        Ok(())
    }

    #[test]
    fn test_server_flag_overrides_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "server_url = \"http://from-file:1\"")?;
        writeln!(file, "render_ms = 500")?;

        let config = resolve_config(Some(file.path()), Some("http://from-flag:2"))?;

        assert_eq!(config.server_url, "http://from-flag:2");
        assert_eq!(config.render_ms, 500);
        Ok(())
    }

    #[test]
    fn test_invalid_server_flag_rejected() {
        assert!(resolve_config(None, Some("::not-a-url")).is_err());
    }

    #[tokio::test]
    async fn test_frame_ends_with_status_line() -> Result<()> {
        let mut out = Vec::new();
        write_frame(&mut out, "map\n", "Graph redrawn").await?;
        assert_eq!(String::from_utf8(out)?, "map\nGraph redrawn\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_terminal_does_not_block_runtime() -> Result<()> {
        use tokio::io::AsyncReadExt;

        let (mut terminal, mut writer) = tokio::io::duplex(4);
        let writing =
            tokio::spawn(async move { write_frame(&mut writer, "frame-content\n", "status").await });

        let other = tokio::spawn(async {
            tokio::task::yield_now().await;
            "polled"
        });
        assert_eq!(other.await?, "polled");
        assert!(!writing.is_finished());

        let mut received = String::new();
        terminal.read_to_string(&mut received).await?;
        writing.await??;
        assert_eq!(received, "frame-content\nstatus\n");
        Ok(())
    }
}
