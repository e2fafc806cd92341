//! CLI command implementations.

pub mod config;
pub mod map;
pub mod run;
