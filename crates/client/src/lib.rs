//! # fleetview-client
//!
//! HTTP transport for the fleet simulation backend. Every endpoint is one
//! request with no retries; non-2xx responses, network failures and
//! undecodable bodies all surface as `Error::Transport`.
//!
//! ```ignore
//! use fleetview_client::FleetClient;
//! use fleetview_core::{FleetApi, FleetviewConfig};
//!
//! let client = FleetClient::new(&FleetviewConfig::default())?;
//! let robots = client.fetch_robots().await?;
//! ```

#![forbid(unsafe_code)]

pub mod client;

pub use client::FleetClient;
