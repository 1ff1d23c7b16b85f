//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands are split by whether they need the records file: query-only
//! commands run without one, so `csq canonical` works on any machine.

use std::path::Path;

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::config::Config;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that work on query text or config alone.
pub trait LocalCommand {
    /// Execute the command without loading records.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that read the records file.
pub trait RecordsCommand {
    /// Execute the command against the given records file.
    fn execute(&self, ctx: &CommandContext, config: &Config, records_path: &Path) -> Result<()>;
}

/// Commands that don't need records.
pub enum LocalDispatch<'a> {
    Canonical(&'a str),
    Tokens(&'a str),
    Check(&'a str),
    Config(&'a Option<ConfigCommands>),
    Completions(Shell),
    Help,
}

impl<'a> LocalDispatch<'a> {
    /// Try to create a local dispatch from the CLI command.
    /// Returns None if the command needs the records file.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Canonical { query }) => Some(Self::Canonical(query)),
            Some(Commands::Tokens { query }) => Some(Self::Tokens(query)),
            Some(Commands::Check { query }) => Some(Self::Check(query)),
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(*shell)),
            None => Some(Self::Help),
            Some(Commands::List { .. }) => None,
        }
    }
}

impl LocalCommand for LocalDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Canonical(query) => commands::canonical::execute(ctx, query),
            Self::Tokens(query) => commands::tokens::execute(ctx, query),
            Self::Check(query) => commands::check::execute(ctx, query),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(*shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("csq - ChangeSpec query CLI");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Init { force }) => commands::config::execute_init(ctx, *force),
    }
}

/// Commands that read the records file.
pub enum RecordsDispatch {
    List(commands::list::ListOptions),
}

impl RecordsDispatch {
    /// Create a records dispatch from the CLI command.
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::List {
                query,
                saved,
                limit,
            }) => Some(Self::List(commands::list::ListOptions {
                query: query.clone(),
                saved: saved.clone(),
                limit: *limit,
            })),
            _ => None,
        }
    }
}

impl RecordsCommand for RecordsDispatch {
    fn execute(&self, ctx: &CommandContext, config: &Config, records_path: &Path) -> Result<()> {
        match self {
            Self::List(opts) => commands::list::execute(ctx, opts, config, records_path),
        }
    }
}
