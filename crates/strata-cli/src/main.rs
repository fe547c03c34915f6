//! Strata packet composer CLI
//!
//! Builds layered packets (Ethernet, IP, ICMP, TCP, UDP, text) from an
//! interactive menu tree.

mod app;
mod config;
mod term;

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use strata_core::{ParentContext, Session, grammar};
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use term::TermConsole;

/// Strata - interactive protocol-layer packet composer
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose packets interactively (default)
    Compose,

    /// Print which layers may follow which
    Grammar,

    /// Write the default configuration file
    InitConfig {
        /// Destination, defaults to the standard config path
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        // An explicit path must exist
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&config_path)?,
    };
    config.validate()?;

    // Logs go to stderr so they never interleave with menus on stdout.
    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = %config_path.display(), "configuration loaded");

    match cli.command.unwrap_or(Commands::Compose) {
        Commands::Compose => compose(config),
        Commands::Grammar => {
            print!("{}", grammar_table());
            Ok(())
        }
        Commands::InitConfig { path, force } => init_config(path.unwrap_or(config_path), force),
    }
}

/// Run the interactive session
fn compose(config: Config) -> anyhow::Result<()> {
    let session = Session::new(config.defaults);
    let mut app = App::new(TermConsole::new(), session, config.output);
    app.run();
    Ok(())
}

/// Render the layering grammar, one parent context per line
fn grammar_table() -> String {
    let mut table = String::new();
    for context in ParentContext::ALL {
        let children: Vec<&str> = grammar(context).iter().map(|kind| kind.name()).collect();
        let _ = writeln!(table, "{:<16} {}", context.to_string(), children.join(", "));
    }
    table
}

/// Write the default configuration to `path`
fn init_config(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(&path)?;
    println!("Configuration written to {}", path.display());
    Ok(())
}
