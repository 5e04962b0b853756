//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gtd_core::ListSelector;

/// Capture notes into an inbox and triage them into lists.
#[derive(Debug, Parser)]
#[command(name = "gtd", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add text to the inbox.
    Add {
        /// Words of the note, joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Print the inbox, upcoming calendar and open lists.
    Overview,

    /// Add the clipboard contents to the inbox.
    Paste,

    /// Prompt for one note and add it to the inbox.
    Quick,

    /// Complete or delete entries of one list.
    Update {
        /// List to open: inbox, next, waiting, projects, maybe or calendar
        /// (first letter is enough).
        list: ListSelector,
    },

    /// Triage inbox items one at a time.
    Process,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_joins_trailing_words() {
        let cli = Cli::parse_from(["gtd", "add", "Buy", "milk"]);
        let Some(Commands::Add { text }) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(text.join(" "), "Buy milk");
    }

    #[test]
    fn update_accepts_list_prefix() {
        let cli = Cli::parse_from(["gtd", "-v", "update", "wait"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Some(Commands::Update {
                list: ListSelector::WaitingFor
            })
        ));
    }

    #[test]
    fn update_rejects_unknown_list() {
        assert!(Cli::try_parse_from(["gtd", "update", "zebra"]).is_err());
    }
}
