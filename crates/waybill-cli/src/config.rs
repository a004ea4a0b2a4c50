// crates/waybill-cli/src/config.rs
//
// Runtime configuration for the Waybill CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory for the local RocksDB document store.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Actor recorded on change-log entries written by this CLI.
    #[serde(default = "default_actor")]
    pub actor: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "~/.waybill/data".to_string()
}

fn default_actor() -> String {
    "cli".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            actor: default_actor(),
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: CliConfig = toml::from_str("actor = \"ops@example\"").unwrap();
        assert_eq!(config.actor, "ops@example");
        assert_eq!(config.data_dir, "~/.waybill/data");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn non_tilde_paths_pass_through() {
        assert_eq!(expand_tilde("/var/lib/waybill"), "/var/lib/waybill");
    }
}
