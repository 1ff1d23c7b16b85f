//! Config command implementation.
//!
//! View and create configuration settings.
//! Config file is located at ~/.config/csq/config.toml.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Maximum edit distance for "did you mean" suggestions on saved query names.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# csq - ChangeSpec query CLI configuration

# Config schema version (do not modify)
version = 1

# Records file queried when --records / CSQ_RECORDS is not given
# records = "/path/to/records.json"

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)

# Saved queries, used with `csq list --saved <name>`
[queries]
# drafts = "%d"
# broken = "!!! OR @@@"
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default records file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<PathBuf>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Saved queries by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<String, String>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            records: None,
            output: OutputConfig::default(),
            queries: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Looks up a saved query by name.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the closest saved query when `name` is
    /// not defined.
    pub fn saved_query(&self, name: &str) -> Result<&str> {
        if let Some(query) = self.queries.get(name) {
            return Ok(query);
        }

        let suggestion = self
            .queries
            .keys()
            .map(|key| (key, levenshtein(name, key)))
            .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(_, distance)| *distance)
            .map(|(key, _)| key);

        let message = match suggestion {
            Some(key) => format!("Unknown saved query '{name}'. Did you mean '{key}'?"),
            None if self.queries.is_empty() => {
                format!("Unknown saved query '{name}'. No queries are saved in the config file")
            }
            None => format!(
                "Unknown saved query '{name}'. Saved queries: {}",
                self.queries.keys().cloned().collect::<Vec<_>>().join(", ")
            ),
        };
        Err(CommandError::Config(message))
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config file path.
///
/// Resolution order: `CSQ_CONFIG`, then `$XDG_CONFIG_HOME/csq/config.toml`,
/// then `~/.config/csq/config.toml`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("CSQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("csq").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("csq").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk.
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {e}")))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {e}")))?;

    tracing::debug!(
        path = %path.display(),
        version = config.version,
        saved_queries = config.queries.len(),
        "loaded config"
    );

    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        tracing::warn!(
            version = config.version,
            supported = CONFIG_VERSION,
            "config file is newer than this csq; unknown settings are ignored"
        );
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{header}\n");
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("Settings:");
            if let Some(ref records) = config.records {
                println!("  records: {}", records.display());
            }

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {color}");
            }

            println!("\n[queries]");
            for (name, query) in &config.queries {
                println!("  {name}: {query}");
            }
        } else {
            println!("(No config file exists. Run 'csq config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command, writing the default config file.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {e}"))
        })?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {e}")))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "created",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}
