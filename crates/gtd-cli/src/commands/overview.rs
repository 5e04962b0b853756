//! Overview command: print the inbox, upcoming events and open lists.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use gtd_core::{Entry, Workspace};

use crate::backend::Backends;

const WIDTH: usize = 80;
const CALENDAR_PERIOD_DAYS: i64 = 30;

pub fn run<W: Write>(writer: &mut W, backends: &Backends) -> Result<()> {
    let mut workspace = Workspace::new();
    backends
        .sync()
        .import(&mut workspace)
        .context("failed to load lists")?;
    write!(writer, "{}", render(&workspace, Local::now().naive_local()))?;
    Ok(())
}

/// Renders the overview as of the local time `now`.
pub fn render(workspace: &Workspace, now: NaiveDateTime) -> String {
    let mut out = String::new();
    let mut section = |title: &str, lines: Vec<String>| {
        let _ = writeln!(out, "{}", center_title(title));
        for line in lines {
            let _ = writeln!(out, "{line}");
        }
    };

    section(
        "INBOX",
        workspace.inbox.iter().map(|(_, item)| item.text.clone()).collect(),
    );
    section(
        "CALENDAR",
        workspace
            .calendar
            .iter()
            .filter_map(|entry| entry.render_upcoming(now, CALENDAR_PERIOD_DAYS))
            .collect(),
    );
    section(
        "NEXT ACTIONS",
        workspace
            .next_actions
            .iter()
            .map(|(_, entry)| entry.render(now))
            .collect(),
    );
    section(
        "WAITING FOR",
        workspace
            .waiting_for
            .iter()
            .map(|(_, entry)| entry.render(now))
            .collect(),
    );
    section(
        "PROJECTS",
        workspace
            .projects
            .iter()
            .map(|(_, entry)| entry.render(now))
            .collect(),
    );
    out.push('\n');
    out
}

/// `title` centered in a line of `*`, [`WIDTH`] columns wide.
fn center_title(title: &str) -> String {
    let side = "*".repeat(WIDTH.saturating_sub(title.len()) / 2);
    let mut line = format!("{side}{title}{side}");
    if title.len() % 2 != 0 {
        line.push('*');
    }
    line
}
