//! Command implementations for the csq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod canonical;
pub mod check;
pub mod completions;
pub mod config;
pub mod list;
pub mod records;
pub mod tokens;

use std::env;

use changespec_query::QueryError;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The query text could not be tokenized or parsed.
    #[error("query error: {source}")]
    Query {
        /// The query text as given, used to render a caret diagnostic.
        query: String,
        #[source]
        source: QueryError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The records file is missing or malformed.
    #[error("records error: {0}")]
    Records(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Wraps a query error together with the text it was raised for.
    pub fn query(query: &str, source: QueryError) -> Self {
        Self::Query {
            query: query.to_string(),
            source,
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Colors are on unless `--no-color` is given, `NO_COLOR` is set, or the
    /// config sets `output.color = false`.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        let no_color_env = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
        }
    }
}
