//! Add command: capture text from the command line.

use std::io::Write;

use anyhow::Result;

use crate::backend::Backends;
use crate::commands::capture::add_to_inbox;

pub fn run<W: Write>(writer: &mut W, words: &[String], backends: &Backends) -> Result<()> {
    add_to_inbox(writer, &backends.sync(), &words.join(" "))
}
