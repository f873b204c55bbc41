//! Terminal presentation of a [`DashboardView`].
//!
//! Everything here is a pure function from view values to text, so the
//! output can be asserted on without a terminal.

use std::fmt::Write;

use itertools::{Itertools, MinMaxResult};

use fleetview_core::models::colors::{self, RgbColor};
use fleetview_core::models::{Point, Task};
use fleetview_core::{DashboardView, EntityKind, GraphInfo, RobotInfoPanel, SceneModel, TaskBoard};

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Text renderer for the dashboard.
#[derive(Debug, Clone)]
pub struct Renderer {
    use_colors: bool,
    map_width: usize,
    map_height: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            use_colors: true,
            map_width: 72,
            map_height: 20,
        }
    }
}

impl Renderer {
    /// Renderer without escape sequences, for piped output and tests.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_map_size(mut self, width: usize, height: usize) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    /// Full frame: map, graph info, robot panel, task board and poller status.
    #[must_use]
    pub fn render_dashboard(&self, view: &DashboardView) -> String {
        let mut output = String::new();
        if self.use_colors {
            output.push_str(CLEAR_SCREEN);
        }

        output.push_str(&self.section("Map"));
        output.push_str(&self.render_map(&view.scene));
        output.push('\n');

        output.push_str(&self.section("Graph"));
        match view.graph_info {
            Some(info) => output.push_str(&self.render_graph_info(&info)),
            None => output.push_str("No graph drawn.\n"),
        }
        output.push('\n');

        output.push_str(&self.section("Robots"));
        output.push_str(&self.render_robot_panel(&view.robot_panel));
        output.push('\n');

        output.push_str(&self.section("Tasks"));
        output.push_str(&self.render_task_board(&view.task_board));
        output.push('\n');

        writeln!(
            output,
            "robots: {} | tasks: {} | info: {} | Ctrl+C or 'quit' to stop",
            view.robot_polling, view.task_polling, view.info_polling
        )
        .ok();
        output
    }

    #[must_use]
    pub fn render_graph_info(&self, info: &GraphInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Nodes:    {}", info.total).ok();
        writeln!(output, "Waiting:  {}", info.waiting).ok();
        writeln!(output, "Charging: {}", info.charging).ok();
        writeln!(output, "Pickdrop: {}", info.pickdrop).ok();
        output
    }

    #[must_use]
    pub fn render_robot_panel(&self, panel: &RobotInfoPanel) -> String {
        if panel.is_empty() {
            return "No robots.\n".to_string();
        }
        let mut output = String::new();
        writeln!(output, "{:<8} {:>8} {:>9} {:>9}", "ID", "Battery", "X", "Y").ok();
        for row in panel.rows() {
            writeln!(
                output,
                "{:<8} {:>7.1}% {:>9.2} {:>9.2}",
                row.id, row.battery, row.x, row.y
            )
            .ok();
        }
        output
    }

    #[must_use]
    pub fn render_task_board(&self, board: &TaskBoard) -> String {
        if board.is_empty() {
            return "No tasks.\n".to_string();
        }
        let mut output = self.render_tasks(board.tasks());
        let summary = board
            .status_counts()
            .iter()
            .map(|(status, count)| format!("{status}: {count}"))
            .join("  ");
        writeln!(output, "{summary}").ok();
        output
    }

    /// Task table with one row per task, tinted by status.
    #[must_use]
    pub fn render_tasks(&self, tasks: &[Task]) -> String {
        let mut output = String::new();
        writeln!(
            output,
            "{:<6} {:<8} {:<8} {:<11} {:<8}",
            "ID", "Pick", "Drop", "Status", "Robot"
        )
        .ok();
        for task in tasks {
            let line = format!(
                "{:<6} {:<8} {:<8} {:<11} {:<8}",
                task.id,
                task.pick_node,
                task.drop_node,
                task.status.as_str(),
                task.assigned_robot_id.as_deref().unwrap_or("-")
            );
            output.push_str(&self.paint(&line, colors::status_color(task.status)));
            output.push('\n');
        }
        output
    }

    /// Plot the scene onto a character grid.
    ///
    /// Layers, bottom to top: edges, nodes, direction markers, robot bodies.
    #[must_use]
    pub fn render_map(&self, scene: &SceneModel) -> String {
        let Some(projection) = Projection::fit(scene, self.map_width, self.map_height) else {
            return "Empty scene.\n".to_string();
        };
        let mut grid: Vec<Vec<Cell>> = vec![vec![None; self.map_width]; self.map_height];

        for entity in scene.entities() {
            if let EntityKind::GraphEdge { source, target } = entity.kind() {
                let ends = scene
                    .lookup(source)
                    .and_then(|a| a.position())
                    .zip(scene.lookup(target).and_then(|b| b.position()));
                if let Some((a, b)) = ends {
                    for at in projection.segment(a, b) {
                        plot(&mut grid, at, ('·', colors::EDGE));
                    }
                }
            }
        }

        let layers: [fn(&EntityKind) -> Option<(char, RgbColor)>; 3] = [
            |kind: &EntityKind| match kind {
                EntityKind::GraphNode { category, .. } => {
                    Some((category.glyph(), colors::category_color(*category)))
                }
                _ => None,
            },
            |kind: &EntityKind| match kind {
                EntityKind::RobotMarker { .. } => Some(('*', colors::ROBOT_MARKER)),
                _ => None,
            },
            |kind: &EntityKind| match kind {
                EntityKind::RobotBody { .. } => Some(('R', colors::ROBOT_BODY)),
                _ => None,
            },
        ];
        for layer in layers {
            for entity in scene.entities() {
                if let (Some(cell), Some(position)) = (layer(entity.kind()), entity.position()) {
                    plot(&mut grid, projection.cell(position), cell);
                }
            }
        }

        let mut output = String::new();
        for row in grid {
            for cell in row {
                match cell {
                    Some((glyph, color)) => output.push_str(&self.paint(&glyph.to_string(), color)),
                    None => output.push(' '),
                }
            }
            output.push('\n');
        }
        output
    }

    fn section(&self, title: &str) -> String {
        let rule = "─".repeat(
            self.map_width
                .saturating_sub(title.chars().count().saturating_add(4)),
        );
        format!("── {title} {rule}\n")
    }

    fn paint(&self, text: &str, color: RgbColor) -> String {
        if self.use_colors {
            format!("\x1b[38;2;{};{};{}m{text}{RESET}", color.r, color.g, color.b)
        } else {
            text.to_string()
        }
    }
}

type Cell = Option<(char, RgbColor)>;

/// Paint one grid cell; positions outside the grid are ignored.
fn plot(grid: &mut [Vec<Cell>], (col, row): (usize, usize), glyph: (char, RgbColor)) {
    if let Some(slot) = grid.get_mut(row).and_then(|cells| cells.get_mut(col)) {
        *slot = Some(glyph);
    }
}

/// Maps scene coordinates onto grid cells, preserving the y-down convention.
struct Projection {
    min: Point,
    scale_x: f64,
    scale_y: f64,
    max_col: usize,
    max_row: usize,
}

impl Projection {
    fn fit(scene: &SceneModel, width: usize, height: usize) -> Option<Self> {
        let max_col = width.checked_sub(1)?;
        let max_row = height.checked_sub(1)?;
        let points: Vec<Point> = scene.entities().filter_map(|e| e.position()).collect();
        let (min_x, max_x) = bounds(points.iter().map(|p| p.x))?;
        let (min_y, max_y) = bounds(points.iter().map(|p| p.y))?;
        Some(Self {
            min: Point::new(min_x, min_y),
            scale_x: span_scale(max_x - min_x, max_col),
            scale_y: span_scale(max_y - min_y, max_row),
            max_col,
            max_row,
        })
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn cell(&self, point: Point) -> (usize, usize) {
        let col = ((point.x - self.min.x) * self.scale_x).round().max(0.0) as usize;
        let row = ((point.y - self.min.y) * self.scale_y).round().max(0.0) as usize;
        (col.min(self.max_col), row.min(self.max_row))
    }

    #[allow(clippy::cast_precision_loss)]
    fn segment(&self, a: Point, b: Point) -> Vec<(usize, usize)> {
        let (start, end) = (self.cell(a), self.cell(b));
        let steps = start.0.abs_diff(end.0).max(start.1.abs_diff(end.1)).max(1);
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                self.cell(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t))
            })
            .collect()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.filter(|v| v.is_finite()).minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(v) => Some((v, v)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

#[allow(clippy::cast_precision_loss)]
fn span_scale(span: f64, cells: usize) -> f64 {
    if span <= f64::EPSILON {
        0.0
    } else {
        cells as f64 / span
    }
}
