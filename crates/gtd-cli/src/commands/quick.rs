//! Quick command: prompt once and capture the answer.

use std::io::Write;

use anyhow::{Context, Result};
use gtd_core::Collector;

use crate::backend::Backends;
use crate::commands::capture::add_to_inbox;

/// Reads one line at the `INBOX> ` prompt.
pub fn run<W: Write>(
    writer: &mut W,
    collector: &mut dyn Collector,
    backends: &Backends,
) -> Result<()> {
    let text = collector.ask("INBOX> ").context("failed to read note")?;
    add_to_inbox(writer, &backends.sync(), &text)
}
