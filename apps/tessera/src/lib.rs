//! # Tessera
//!
//! Application layer around `tessera-core`: the CLI, the read-only HTTP API
//! and schema configuration loading. Exposed as a library so integration
//! tests can drive the router and the CLI helpers directly.

pub mod api;
pub mod cli;
pub mod config;
