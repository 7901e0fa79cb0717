// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crosdisks_client::ClientConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "CROSDISKS_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LoggingLevel,
    /// Also write daily-rolling log files here when set
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// `--config` wins, then `$CROSDISKS_CONFIG`, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosdisks_client::BusKind;

    #[test]
    fn parses_client_keys_and_logging_table() {
        let config: Config = toml::from_str(
            r#"
bus = "session"
service = "org.example.Disks"

[logging]
level = "debug"
directory = "/tmp/crosdisks-logs"
"#,
        )
        .expect("parse config");

        assert_eq!(config.client.bus, BusKind::Session);
        assert_eq!(config.client.service, "org.example.Disks");
        assert_eq!(config.client.unmount_options, vec!["force".to_string()]);
        assert_eq!(config.logging.level, LoggingLevel::Debug);
        assert_eq!(
            config.logging.directory.as_deref(),
            Some(Path::new("/tmp/crosdisks-logs"))
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").expect("parse empty config");
        assert_eq!(config, Config::default());
    }
}
