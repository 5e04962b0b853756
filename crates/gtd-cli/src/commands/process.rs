//! Process command: triage the inbox.

use anyhow::{Context, Result};
use gtd_core::{Collector, TriageEngine, Workspace};

use crate::Config;
use crate::backend::Backends;

/// Loads every list and triages the inbox until it is empty.
///
/// The triage loop saves before each item and after the last one.
pub fn run(collector: &mut dyn Collector, config: &Config, backends: &Backends) -> Result<()> {
    let sync = backends.sync();
    let mut workspace = Workspace::new();
    sync.import(&mut workspace).context("failed to load lists")?;

    let summary = TriageEngine::new(&sync)
        .with_countdown(config.countdown_secs)
        .process(&mut workspace, collector)
        .context("inbox processing aborted")?;
    tracing::debug!(retries = summary.retries, "triage finished");
    Ok(())
}
