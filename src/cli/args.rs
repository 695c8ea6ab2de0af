//! CLI argument definitions using clap
//!
//! Commands:
//! - ragindex serve [--config <path>] [--port <port>] [--database <path>]
//! - ragindex send --app <name> --action <name> [--user-id <id> | --user-id-file <path>] [metadata]
//! - ragindex list [--limit <n>] [--app <name>] [--action <name>] [--user-id <id>]
//! - ragindex query <sql>
//! - ragindex clear --key <key>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::client::DEFAULT_WORKER_URL;

/// ragindex - a minimal event analytics service
#[derive(Parser, Debug)]
#[command(name = "ragindex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the analytics HTTP server
    Serve {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config and environment)
        #[arg(long)]
        port: Option<u16>,

        /// SQLite database file, or ":memory:"
        #[arg(long)]
        database: Option<String>,
    },

    /// Record one event
    Send {
        /// Application name
        #[arg(long)]
        app: String,

        /// Action name
        #[arg(long)]
        action: String,

        /// User id; overrides the stored one
        #[arg(long)]
        user_id: Option<String>,

        /// File holding this client's user id; created on first use
        #[arg(long)]
        user_id_file: Option<PathBuf>,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[arg(long, default_value = DEFAULT_WORKER_URL)]
        url: String,
    },

    /// List stored events, newest first
    List {
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        app: Option<String>,

        #[arg(long)]
        action: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long, default_value = DEFAULT_WORKER_URL)]
        url: String,
    },

    /// Run a read-only SQL statement
    Query {
        /// The SELECT statement
        sql: String,

        #[arg(long, default_value = DEFAULT_WORKER_URL)]
        url: String,
    },

    /// Delete every stored event
    Clear {
        /// Clear key expected by the server
        #[arg(long)]
        key: String,

        #[arg(long, default_value = DEFAULT_WORKER_URL)]
        url: String,
    },
}

/// Optional context attached to a sent event
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct MetadataArgs {
    /// Defaults to `ragindex-cli/<version>`
    #[arg(long)]
    pub user_agent: Option<String>,

    /// IANA zone name; defaults to `$TZ`
    #[arg(long)]
    pub timezone: Option<String>,

    /// BCP 47 tag; defaults to the language of `$LANG`
    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub referrer: Option<String>,

    /// JSON object, e.g. '{"utm_source":"mail"}'
    #[arg(long)]
    pub url_params: Option<String>,

    /// Seconds since the Unix epoch; defaults to now
    #[arg(long)]
    pub timestamp: Option<i64>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
