//! Dashboard configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::result::Result;
use crate::scene::DEFAULT_MARKER_RADIUS;

/// Configuration for a fleetview session.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetviewConfig {
    /// Base URL of the simulation backend.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Robot reconciliation period in milliseconds.
    #[serde(default = "default_robot_poll_ms")]
    pub robot_poll_ms: u64,

    /// Task board refresh period in milliseconds.
    #[serde(default = "default_task_poll_ms")]
    pub task_poll_ms: u64,

    /// Robot info panel refresh period in milliseconds.
    #[serde(default = "default_info_poll_ms")]
    pub info_poll_ms: u64,

    /// Terminal redraw period in milliseconds.
    #[serde(default = "default_render_ms")]
    pub render_ms: u64,

    /// Delay before `watch` retries a graph draw that failed.
    #[serde(default = "default_graph_retry_ms")]
    pub graph_retry_ms: u64,

    /// Distance between a robot and its direction marker.
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f64,
}

impl Default for FleetviewConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_ms: default_request_timeout_ms(),
            robot_poll_ms: default_robot_poll_ms(),
            task_poll_ms: default_task_poll_ms(),
            info_poll_ms: default_info_poll_ms(),
            render_ms: default_render_ms(),
            graph_retry_ms: default_graph_retry_ms(),
            marker_radius: default_marker_radius(),
        }
    }
}

impl FleetviewConfig {
    /// Read, parse and validate a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigRead` if the file cannot be read,
    /// `Error::ConfigParse` if it is not valid TOML for this schema, and
    /// `Error::InvalidConfig` if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::config_read(path, e.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| Error::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override the backend URL.
    #[must_use]
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Short periods for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            robot_poll_ms: 10,
            task_poll_ms: 20,
            info_poll_ms: 20,
            render_ms: 20,
            graph_retry_ms: 50,
            request_timeout_ms: 500,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.server_url).map_err(|e| {
            Error::invalid_config(format!("server_url '{}': {e}", self.server_url))
        })?;

        let periods = [
            ("request_timeout_ms", self.request_timeout_ms),
            ("robot_poll_ms", self.robot_poll_ms),
            ("task_poll_ms", self.task_poll_ms),
            ("info_poll_ms", self.info_poll_ms),
            ("render_ms", self.render_ms),
            ("graph_retry_ms", self.graph_retry_ms),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| *value == 0) {
            return Err(Error::invalid_config(format!(
                "{name} must be greater than 0"
            )));
        }

        if !self.marker_radius.is_finite() || self.marker_radius <= 0.0 {
            return Err(Error::invalid_config(format!(
                "marker_radius must be a positive number, got {}",
                self.marker_radius
            )));
        }

        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub const fn robot_poll_period(&self) -> Duration {
        Duration::from_millis(self.robot_poll_ms)
    }

    #[must_use]
    pub const fn task_poll_period(&self) -> Duration {
        Duration::from_millis(self.task_poll_ms)
    }

    #[must_use]
    pub const fn info_poll_period(&self) -> Duration {
        Duration::from_millis(self.info_poll_ms)
    }

    #[must_use]
    pub const fn render_period(&self) -> Duration {
        Duration::from_millis(self.render_ms)
    }

    #[must_use]
    pub const fn graph_retry_period(&self) -> Duration {
        Duration::from_millis(self.graph_retry_ms)
    }
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_robot_poll_ms() -> u64 {
    50
}

const fn default_task_poll_ms() -> u64 {
    1000
}

const fn default_info_poll_ms() -> u64 {
    2000
}

const fn default_render_ms() -> u64 {
    250
}

const fn default_graph_retry_ms() -> u64 {
    5000
}

const fn default_marker_radius() -> f64 {
    DEFAULT_MARKER_RADIUS
}
