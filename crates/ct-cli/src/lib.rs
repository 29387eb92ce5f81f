//! Credit tracker CLI library.
//!
//! This crate provides the `ct` command-line shell over the tracker store.

mod cli;
pub mod commands;
mod config;
pub mod context;
pub mod preferences;
pub mod render;
pub mod session;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use context::AppContext;
