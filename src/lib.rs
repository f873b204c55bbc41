//! # fleetview
//!
//! Command-line front end and terminal dashboard for a robot fleet
//! simulation backend, built on `fleetview-core` and `fleetview-client`.

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod render;
pub mod session;
