//! # Rulebook Harness CLI (`rulebook`)
//!
//! Commands for creating the database, uploading rulebooks into a game
//! session, looking up rules, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! rulebook --config ./config/rulebook.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rulebook init` | Create the SQLite database and schema |
//! | `rulebook upload <session> <paths>...` | Ingest `.txt` / `.pdf` files or directories |
//! | `rulebook lookup <session> "<query>"` | Print the rules a query would be grounded in |
//! | `rulebook rulebooks <session>` | List a session's uploaded rulebooks |
//! | `rulebook serve` | Start the HTTP server |
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rulebook_harness::{config, ingest, migrate, retrieve, server};

/// Rulebook Harness CLI: session rulebooks for AI game masters.
#[derive(Parser)]
#[command(
    name = "rulebook",
    about = "Rulebook Harness: session-scoped rule lookup for AI game masters",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rulebook.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it again leaves existing rulebooks untouched.
    Init,

    /// Upload rulebooks into a game session.
    ///
    /// Each path may be a file or a directory. Directories are searched
    /// recursively for `.txt` and `.pdf` files. Every file is processed on
    /// its own; one failure does not stop the others.
    Upload {
        /// Game session identifier.
        session: String,

        /// Files or directories to upload.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Look up the session's rules for a player action or question.
    Lookup {
        /// Game session identifier.
        session: String,

        /// The player action or rule question.
        query: String,
    },

    /// List the rulebooks uploaded to a session.
    Rulebooks {
        /// Game session identifier.
        session: String,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves the tool, upload, and listing
    /// endpoints.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Upload { session, paths } => {
            ingest::run_upload(&cfg, &session, &paths).await?;
        }
        Commands::Lookup { session, query } => {
            retrieve::run_lookup(&cfg, &session, &query).await?;
        }
        Commands::Rulebooks { session } => {
            retrieve::run_list_rulebooks(&cfg, &session).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
