//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the csq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// csq - Query ChangeSpec change records
#[derive(Parser, Debug)]
#[command(name = "csq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Records file to query (default: `records` from the config file)
    #[arg(long, global = true, env = "CSQ_RECORDS")]
    pub records: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List records matching a query
    #[command(alias = "l")]
    List {
        /// Query expression (e.g. "%d +myproj !!"); omit to list everything
        #[arg(conflicts_with = "saved")]
        query: Option<String>,

        /// Use a saved query from the config file
        #[arg(short, long)]
        saved: Option<String>,

        /// Limit the number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print the canonical form of a query
    #[command(alias = "c")]
    Canonical {
        /// Query expression
        query: String,
    },

    /// Print the token stream of a query
    Tokens {
        /// Query expression
        query: String,
    },

    /// Check that a query is valid
    Check {
        /// Query expression
        query: String,
    },

    /// View and create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shells supported by `csq completions`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["csq", "--verbose", "list"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["csq", "list", "%d", "--json", "--no-color"]);
        assert!(cli.json);
        assert!(cli.no_color);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["csq", "-v", "-q", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_records_flag() {
        let cli = Cli::parse_from(["csq", "--records", "/tmp/records.json", "list"]);
        assert_eq!(cli.records, Some(PathBuf::from("/tmp/records.json")));
    }

    #[test]
    fn test_list_with_query_and_limit() {
        let cli = Cli::parse_from(["csq", "list", "%d +proj", "-n", "5"]);
        if let Some(Commands::List {
            query,
            saved,
            limit,
        }) = cli.command
        {
            assert_eq!(query.as_deref(), Some("%d +proj"));
            assert!(saved.is_none());
            assert_eq!(limit, Some(5));
        } else {
            panic!("Expected List command");
        }
    }

    #[test]
    fn test_list_saved_conflicts_with_query() {
        let result = Cli::try_parse_from(["csq", "list", "%d", "--saved", "drafts"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_alias() {
        let cli = Cli::parse_from(["csq", "l"]);
        assert!(matches!(cli.command, Some(Commands::List { .. })));
    }

    #[test]
    fn test_canonical_command() {
        let cli = Cli::parse_from(["csq", "canonical", "%d foo"]);
        if let Some(Commands::Canonical { query }) = cli.command {
            assert_eq!(query, "%d foo");
        } else {
            panic!("Expected Canonical command");
        }
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::parse_from(["csq", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: Some(ConfigCommands::Init { force: true })
            })
        ));
    }

    #[test]
    fn test_completions_command() {
        let cli = Cli::parse_from(["csq", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert_eq!(shell, Shell::Zsh);
        } else {
            panic!("Expected Completions command");
        }
    }
}
