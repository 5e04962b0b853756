use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gtd_cli::backend::Backends;
use gtd_cli::commands::{add, overview, paste, process, quick, update};
use gtd_cli::terminal::TerminalCollector;
use gtd_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries the prompts and listings.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let backends = Backends::open(&config)?;

    let mut stdout = io::stdout();
    match command {
        Commands::Add { text } => add::run(&mut stdout, text, &backends)?,
        Commands::Overview => overview::run(&mut stdout, &backends)?,
        Commands::Paste => paste::run(&mut stdout, &config, &backends)?,
        Commands::Quick => {
            let mut terminal = TerminalCollector::new(io::stdin().lock(), io::stdout());
            quick::run(&mut stdout, &mut terminal, &backends)?;
        }
        Commands::Update { list } => {
            let mut terminal = TerminalCollector::new(io::stdin().lock(), io::stdout());
            update::run(&mut terminal, *list, &backends)?;
        }
        Commands::Process => {
            let mut terminal = TerminalCollector::new(io::stdin().lock(), io::stdout());
            process::run(&mut terminal, &config, &backends)?;
        }
    }

    Ok(())
}
