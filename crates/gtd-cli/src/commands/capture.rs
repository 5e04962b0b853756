//! Shared inbox capture for the add, paste and quick commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use gtd_core::{CaptureItem, IdGenerator, SyncCoordinator};

/// Stores `text` as one new inbox record without loading the other lists.
pub fn add_to_inbox<W: Write>(writer: &mut W, sync: &SyncCoordinator<'_>, text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("nothing to add: the note is empty");
    }
    let id = IdGenerator::new().next_id();
    sync.capture(&id, &CaptureItem::new(text))
        .context("failed to add to inbox")?;
    tracing::debug!(%id, "stored capture");
    writeln!(writer, "\"{text}\" added to inbox.")?;
    Ok(())
}
