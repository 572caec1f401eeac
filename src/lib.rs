// ABOUTME: Library root for slipway - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod types;
