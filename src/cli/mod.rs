//! CLI command handlers

pub mod commands;

pub use commands::{charts, columns, export, kpis, load, options, preview, watch};
