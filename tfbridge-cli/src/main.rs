use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tfbridge_core::Config;

mod commands;
mod display;

use commands::{
    branches, checkin, checkout, diagnostics, get, history, inclusion, shelve, start, status,
    unshelve,
};

#[derive(Parser)]
#[command(name = "tfbridge")]
#[command(version, about = "Editor bridge for a TFVC-style version control client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bridge daemon (auto-checkout watcher + editor API)
    Start {
        /// Workspace root to bridge (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Port for the editor-facing API server
        #[arg(short, long, default_value = "3030")]
        port: u16,
    },

    /// Refresh and list pending changes
    Status,

    /// Include a pending change in the next checkin (requires a running daemon)
    Include {
        /// Workspace path of the pending change
        path: String,

        /// Bridge daemon URL
        #[arg(short, long, default_value = "http://localhost:3030")]
        server: String,
    },

    /// Exclude a pending change from the next checkin (requires a running daemon)
    Exclude {
        /// Workspace path of the pending change
        path: String,

        /// Bridge daemon URL
        #[arg(short, long, default_value = "http://localhost:3030")]
        server: String,
    },

    /// Check in pending changes
    Checkin {
        /// Checkin comment
        #[arg(short, long)]
        message: String,

        /// Paths to check in (defaults to every included pending change)
        paths: Vec<String>,
    },

    /// Check out a file for editing
    Checkout {
        /// Workspace path of the file
        path: String,
    },

    /// Show the changeset history of a file
    History {
        /// Workspace path of the file
        path: String,

        /// Number of changesets to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List branches
    Branches,

    /// Shelve pending changes on the server
    Shelve {
        /// Shelveset name
        name: String,

        /// Shelveset comment
        #[arg(short, long)]
        message: String,

        /// Paths to shelve (defaults to every included pending change)
        paths: Vec<String>,
    },

    /// Apply a shelveset created by another user
    Unshelve {
        /// Shelveset name
        name: String,

        /// Shelveset owner
        owner: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Update the workspace to the latest server version
    Get,

    /// Print a diagnostics report
    Diagnostics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log verbosity comes from the workspace configuration unless RUST_LOG
    // overrides it; a broken config file falls back to defaults here and is
    // surfaced properly by the command itself.
    let config_root = match &cli.command {
        Commands::Start { path, .. } => path.clone(),
        _ => PathBuf::from("."),
    };
    let log_level = Config::load(&config_root)
        .map(|c| c.log_level)
        .unwrap_or_else(|_| Config::default().log_level);
    let filter = std::env::var("RUST_LOG").unwrap_or(log_level);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Start { path, port } => {
            start::run(path, port).await?;
        }
        Commands::Status => {
            status::run().await?;
        }
        Commands::Include { path, server } => {
            inclusion::run(path, true, server).await?;
        }
        Commands::Exclude { path, server } => {
            inclusion::run(path, false, server).await?;
        }
        Commands::Checkin { message, paths } => {
            checkin::run(message, paths).await?;
        }
        Commands::Checkout { path } => {
            checkout::run(path).await?;
        }
        Commands::History { path, limit } => {
            history::run(path, limit).await?;
        }
        Commands::Branches => {
            branches::run().await?;
        }
        Commands::Shelve {
            name,
            message,
            paths,
        } => {
            shelve::run(name, message, paths).await?;
        }
        Commands::Unshelve { name, owner, yes } => {
            unshelve::run(name, owner, yes).await?;
        }
        Commands::Get => {
            get::run().await?;
        }
        Commands::Diagnostics => {
            diagnostics::run().await?;
        }
    }

    Ok(())
}
