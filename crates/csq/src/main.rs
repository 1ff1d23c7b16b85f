use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::{load_config, Config};
use commands::records::resolve_records_path;
use commands::{CommandContext, CommandError};
use dispatch::{LocalCommand, LocalDispatch, RecordsCommand, RecordsDispatch};

/// Environment variable holding an `EnvFilter` directive that overrides
/// the `--verbose` / `--quiet` log level.
const LOG_ENV: &str = "CSQ_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", format_error_json(&e));
            } else {
                eprintln!("Error: {e}");
                if let CommandError::Query { query, source } = &e {
                    eprintln!("\n{}", source.render_caret(query));
                }
            }
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber.
fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .without_time();
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    // Query-only commands never touch the records file, and still work
    // when the config file cannot be read.
    if let Some(dispatch) = LocalDispatch::try_from_cli(cli) {
        let config = load_config().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            Config::default()
        });
        let ctx = CommandContext::from_cli(cli, &config);
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, &config);

    if let Some(dispatch) = RecordsDispatch::from_cli(cli) {
        let records_path = resolve_records_path(cli.records.as_deref(), &config)?;
        tracing::debug!(path = %records_path.display(), "using records file");
        return dispatch.execute(&ctx, &config, &records_path);
    }

    Ok(())
}

/// Renders an error as the JSON object printed with `--json`.
fn format_error_json(e: &CommandError) -> String {
    let mut error = serde_json::json!({
        "code": error_code(e),
        "message": e.to_string(),
    });
    if let CommandError::Query { query, source } = e {
        error["query"] = serde_json::json!(query);
        error["position"] = serde_json::json!(source.position());
        error["detail"] = serde_json::json!(source.message());
    }

    let error_json = serde_json::json!({ "error": error });
    serde_json::to_string_pretty(&error_json).unwrap_or_else(|_| error_json.to_string())
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query { .. } => "QUERY_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Records(_) => "RECORDS_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Query { .. } => ExitCode::from(1),
        CommandError::Json(_) => ExitCode::from(1),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Records(_) => ExitCode::from(4),
        CommandError::Config(_) => ExitCode::from(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changespec_query::parse_query;

    fn query_error(query: &str) -> CommandError {
        CommandError::query(query, parse_query(query).unwrap_err())
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&query_error("(")), "QUERY_ERROR");
        assert_eq!(error_code(&CommandError::Config("x".into())), "CONFIG_ERROR");
        assert_eq!(error_code(&CommandError::Records("x".into())), "RECORDS_ERROR");
        assert_eq!(
            error_code(&CommandError::Io(std::io::Error::other("x"))),
            "IO_ERROR"
        );
    }

    #[test]
    fn test_exit_codes() {
        let code = |e: &CommandError| format!("{:?}", error_exit_code(e));
        assert_eq!(code(&query_error("(")), format!("{:?}", ExitCode::from(1)));
        assert_eq!(
            code(&CommandError::Records("x".into())),
            format!("{:?}", ExitCode::from(4))
        );
        assert_eq!(
            code(&CommandError::Config("x".into())),
            format!("{:?}", ExitCode::from(5))
        );
    }

    #[test]
    fn test_format_error_json_for_query_error() {
        let json = format_error_json(&query_error("%d AND"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["error"]["code"], "QUERY_ERROR");
        assert_eq!(value["error"]["query"], "%d AND");
        assert_eq!(value["error"]["position"], 6);
        assert_eq!(value["error"]["detail"], "Unexpected end of query");
    }

    #[test]
    fn test_format_error_json_for_config_error() {
        let json = format_error_json(&CommandError::Config("bad".into()));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["error"]["code"], "CONFIG_ERROR");
        assert_eq!(value["error"]["message"], "configuration error: bad");
        assert!(value["error"].get("position").is_none());
    }
}
