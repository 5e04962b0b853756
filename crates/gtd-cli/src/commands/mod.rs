//! CLI subcommand implementations.

pub mod add;
mod capture;
pub mod overview;
pub mod paste;
pub mod process;
pub mod quick;
pub mod update;
