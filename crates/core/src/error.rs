//! Error taxonomy for fleetview operations.
//!
//! Two families matter to callers: `Transport` (the backend could not be
//! reached or answered outside the success range) and `Validation` (a
//! user-supplied count was rejected before any request was issued).
//! Everything else describes local misuse of the scene or scheduler.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the Scene Model when an insertion would break an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("entity '{key}' already exists")]
    DuplicateKey { key: String },

    #[error("edge '{edge}' references unknown node '{node}'")]
    UnknownEndpoint { edge: String, node: String },
}

/// Core error type for fleetview operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Backend errors
    #[error("{}", transport_message(*status, message))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    // User input errors
    #[error("invalid {field}: must be at least {min}, got {value}")]
    Validation {
        field: &'static str,
        min: i64,
        value: i64,
    },

    // Local state errors
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("node '{node_id}' is not part of the drawn graph")]
    NodeNotFound { node_id: String },

    #[error("robot placement has not been started")]
    PlacementNotActive,

    #[error("poller '{name}' is already running")]
    AlreadyRunning { name: String },

    // Configuration errors
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to read config file '{path}': {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    #[error("failed to parse config file '{path}': {reason}")]
    ConfigParse { path: PathBuf, reason: String },
}

fn transport_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("transport error (HTTP {code}): {message}"),
        None => format!("transport error: {message}"),
    }
}

impl Error {
    /// Create a transport error carrying the HTTP status, if one was received.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Create a validation error for a count below its minimum.
    #[must_use]
    pub const fn validation(field: &'static str, min: i64, value: i64) -> Self {
        Self::Validation { field, min, value }
    }

    /// Create a node-not-found error.
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_id: node_id.into(),
        }
    }

    /// Create an already-running error for the named poller.
    pub fn already_running(name: impl Into<String>) -> Self {
        Self::AlreadyRunning { name: name.into() }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a config read error.
    pub fn config_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a config parse error.
    pub fn config_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the backend rather than local state.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether this error was raised by the validation gate.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
