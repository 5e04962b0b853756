//! gtd CLI library.
//!
//! This crate provides the command-line interface over the gtd lists.

pub mod backend;
mod cli;
pub mod commands;
mod config;
pub mod terminal;

pub use cli::{Cli, Commands};
pub use config::{CalendarBackend, CalendarConfig, Config, RemoteBackend, RemoteConfig};
