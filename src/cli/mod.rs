//! CLI command handlers

pub mod commands;

pub use commands::{compare, inspect, matrix, tech};
