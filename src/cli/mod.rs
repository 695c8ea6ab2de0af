//! CLI module for ragindex
//!
//! Provides command-line interface for:
//! - serve: run the analytics HTTP server
//! - send: record one event
//! - list: print stored events
//! - query: run a read-only SQL statement
//! - clear: delete every stored event

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, MetadataArgs};
pub use commands::{
    build_metadata, clear, client_config, default_user_id_file, list, query, resolve_config, run,
    run_command, send, serve, ENV_USER_ID_FILE,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
