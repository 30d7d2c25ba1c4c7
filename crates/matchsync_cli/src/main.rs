//! Matchsync CLI - League of Legends match history into Clockify.

mod commands;
mod config;
mod progress;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::config::Provider;

#[derive(Parser)]
#[command(name = "matchsync")]
#[command(version)]
#[command(about = "Sync League of Legends match history into Clockify time entries")]
#[command(
    long_about = "Matchsync lists your League of Legends matches from the last N days and \
creates one Clockify time entry per match. Entries carry a [Match:<id>] marker, so running \
it again only adds matches that are not in Clockify yet."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync the last week from the Riot API:
        $ matchsync riot

    Sync the last 30 days from OP.GG without writing anything:
        $ matchsync opgg --days 30 --dry-run

    Sync from the running League client:
        $ matchsync lcu

    Generate shell completions:
        $ matchsync completions bash > ~/.local/share/bash-completion/completions/matchsync

CONFIGURATION
    Matchsync reads configuration from:
      1. ~/.config/matchsync/config.toml (or $XDG_CONFIG_HOME/matchsync/config.toml)
      2. ./matchsync.toml
      3. Environment variables (MATCHSYNC_<SECTION>__<KEY>, e.g., MATCHSYNC_RIOT__API_KEY)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    MATCHSYNC_PLAYER__PUUID           Player PUUID (riot)
    MATCHSYNC_PLAYER__GAME_NAME       Riot ID game name (opgg, lcu)
    MATCHSYNC_PLAYER__TAG_LINE        Riot ID tag line (opgg, lcu)
    MATCHSYNC_RIOT__API_KEY           Riot Games API key
    MATCHSYNC_CLOCKIFY__API_TOKEN     Clockify API key
    MATCHSYNC_CLOCKIFY__PROJECT_NAME  Clockify project for new entries
    MATCHSYNC_SYNC__DAYS              Days to sync (default: 7)
    MATCHSYNC_SYNC__CREATE_DELAY_MS   Pause after each created entry (default: 0)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync matches from the Riot Games API
    #[cfg(feature = "riot")]
    Riot(SyncArgs),
    /// Sync matches from OP.GG (no API key needed)
    #[cfg(feature = "opgg")]
    Opgg(SyncArgs),
    /// Sync matches from the running League client
    #[cfg(feature = "lcu")]
    Lcu(SyncArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Options shared by every sync command.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SyncArgs {
    /// Sync matches that ended within this many days (default from config or 7)
    #[arg(short = 'd', long)]
    days: Option<u32>,

    /// Dry run - show what would be synced without creating entries
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("matchsync=info,matchsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    let (provider, args) = match cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell)?;
            return Ok(());
        }
        #[cfg(feature = "riot")]
        Commands::Riot(args) => (Provider::Riot, args),
        #[cfg(feature = "opgg")]
        Commands::Opgg(args) => (Provider::Opgg, args),
        #[cfg(feature = "lcu")]
        Commands::Lcu(args) => (Provider::Lcu, args),
    };

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load()?;

    commands::sync::handle_sync(provider, args, config).await
}
