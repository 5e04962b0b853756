//! Paste command: capture the clipboard contents.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result, bail};

use crate::Config;
use crate::backend::Backends;
use crate::commands::capture::add_to_inbox;

pub fn run<W: Write>(writer: &mut W, config: &Config, backends: &Backends) -> Result<()> {
    let text = read_clipboard(&config.clipboard_command)?;
    add_to_inbox(writer, &backends.sync(), &text)
}

/// Runs the clipboard command and returns its stdout.
fn read_clipboard(command: &[String]) -> Result<String> {
    let Some((program, args)) = command.split_first() else {
        bail!("clipboard_command is empty");
    };
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run clipboard command {program}"))?;
    if !output.status.success() {
        bail!(
            "clipboard command {program} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout).context("clipboard contents are not valid UTF-8")
}
