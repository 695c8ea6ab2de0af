//! CLI command implementations
//!
//! `serve` resolves configuration in order file, environment, flags, then
//! runs the server until Ctrl-C. The other commands are thin HTTP clients;
//! every rule is enforced server-side.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::client::{AnalyticsClient, ClientConfig, EventFilters, EventMetadata};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event_with_fields, Event};

use super::args::{Cli, Command, MetadataArgs};
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Environment variable naming the user id file for `send`
pub const ENV_USER_ID_FILE: &str = "RAGINDEX_USER_ID_FILE";

/// Run the CLI with parsed arguments
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a specific command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            database,
        } => serve(config.as_deref(), port, database),
        Command::Send {
            app,
            action,
            user_id,
            user_id_file,
            metadata,
            url,
        } => send(&url, &app, &action, user_id, user_id_file, metadata),
        Command::List {
            limit,
            app,
            action,
            user_id,
            url,
        } => list(
            &url,
            EventFilters {
                limit,
                app_name: app,
                action_name: action,
                user_id,
            },
        ),
        Command::Query { sql, url } => query(&url, &sql),
        Command::Clear { key, url } => clear(&url, &key),
    }
}

/// Resolve server configuration: file (or defaults), then environment, then flags
pub fn resolve_config(
    config_path: Option<&Path>,
    port: Option<u16>,
    database: Option<String>,
) -> CliResult<HttpServerConfig> {
    let mut config = match config_path {
        Some(path) => HttpServerConfig::load(path)?,
        None => HttpServerConfig::default(),
    };
    config.apply_env()?;

    if let Some(port) = port {
        config.port = port;
    }
    if let Some(database) = database {
        config.database_path = database;
    }
    config.validate()?;

    Ok(config)
}

/// Run the HTTP server until Ctrl-C
pub fn serve(
    config_path: Option<&Path>,
    port: Option<u16>,
    database: Option<String>,
) -> CliResult<()> {
    let config = resolve_config(config_path, port, database)?;
    let port = config.port.to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("database", config.database_path.as_str()),
            ("host", config.host.as_str()),
            ("port", port.as_str()),
        ],
    );

    let runtime = runtime()?;
    let result = runtime.block_on(async {
        let server = HttpServer::open(config)?;
        server.start().await
    });

    if let Err(e) = &result {
        let message = e.to_string();
        log_event_with_fields(Event::BootFailed, &[("error", message.as_str())]);
    }
    result.map_err(CliError::from)
}

/// Send one event with this client's stable user id
pub fn send(
    url: &str,
    app: &str,
    action: &str,
    user_id: Option<String>,
    user_id_file: Option<PathBuf>,
    metadata: MetadataArgs,
) -> CliResult<()> {
    let lookup = |var: &str| std::env::var(var).ok();
    let config = client_config(url, user_id, user_id_file, lookup)?;
    let metadata = build_metadata(metadata, lookup, chrono::Utc::now().timestamp())?;

    let client = AnalyticsClient::new(config);
    let created = runtime()?.block_on(client.send_event(app, action, metadata))?;
    write_json(&created)
}

/// Client config for `send`
///
/// An explicit `user_id` wins. Otherwise the id stored in `user_id_file`
/// (or the default location) is used, generated on first use.
pub fn client_config<F>(
    url: &str,
    user_id: Option<String>,
    user_id_file: Option<PathBuf>,
    lookup: F,
) -> CliResult<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user_id) = user_id.filter(|id| !id.is_empty()) {
        return Ok(ClientConfig::with_user_id(url, user_id));
    }

    let path = user_id_file.unwrap_or_else(|| default_user_id_file(&lookup));
    ClientConfig::with_user_id_file(url, &path).map_err(|e| CliError::io_error(e.to_string()))
}

/// `$RAGINDEX_USER_ID_FILE`, else `ragindex/user_id` under the user's config dir
pub fn default_user_id_file<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let set = |var: &str| lookup(var).filter(|v| !v.is_empty());

    if let Some(path) = set(ENV_USER_ID_FILE) {
        return PathBuf::from(path);
    }
    let config_dir = match (set("XDG_CONFIG_HOME"), set("HOME")) {
        (Some(dir), _) => PathBuf::from(dir),
        (None, Some(home)) => PathBuf::from(home).join(".config"),
        (None, None) => return PathBuf::from(".ragindex_user_id"),
    };
    config_dir.join("ragindex").join("user_id")
}

/// Event metadata from flags, falling back to the environment like a browser would
pub fn build_metadata<F>(args: MetadataArgs, lookup: F, now: i64) -> CliResult<EventMetadata>
where
    F: Fn(&str) -> Option<String>,
{
    let url_params = match args.url_params {
        Some(raw) => Some(serde_json::from_str::<Value>(&raw).map_err(|e| {
            CliError::config_error(format!("Invalid --url-params JSON: {}", e))
        })?),
        None => None,
    };

    Ok(EventMetadata {
        user_agent: Some(
            args.user_agent
                .unwrap_or_else(|| format!("ragindex-cli/{}", env!("CARGO_PKG_VERSION"))),
        ),
        timezone: args
            .timezone
            .or_else(|| lookup("TZ").map(|tz| tz.trim_start_matches(':').to_string()))
            .filter(|tz| !tz.is_empty()),
        language: args
            .language
            .or_else(|| lookup("LANG").and_then(|lang| language_tag(&lang))),
        referrer: args.referrer,
        url_params,
        timestamp: Some(args.timestamp.unwrap_or(now)),
    })
}

/// `it_IT.UTF-8` → `it-IT`; `C` and `POSIX` carry no language
fn language_tag(locale: &str) -> Option<String> {
    let base = locale.split(|c| c == '.' || c == '@').next().unwrap_or("");
    match base {
        "" | "C" | "POSIX" => None,
        _ => Some(base.replace('_', "-")),
    }
}

/// Print stored events
pub fn list(url: &str, filters: EventFilters) -> CliResult<()> {
    let client = AnalyticsClient::new(ClientConfig::new(url));
    let events = runtime()?.block_on(client.fetch_events(&filters))?;
    write_json(&events)
}

/// Print the result of a raw SELECT
pub fn query(url: &str, sql: &str) -> CliResult<()> {
    let client = AnalyticsClient::new(ClientConfig::new(url));
    let response = runtime()?.block_on(client.execute_query(sql))?;
    write_json(&response)
}

/// Delete every stored event
pub fn clear(url: &str, key: &str) -> CliResult<()> {
    let client = AnalyticsClient::new(ClientConfig::new(url));
    let cleared = runtime()?.block_on(client.clear(key))?;
    write_json(&cleared)
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new().map_err(|e| CliError::io_error(format!("Failed to create runtime: {}", e)))
}
