// SPDX-License-Identifier: GPL-3.0-only

//! Connection settings for the disk service

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_SERVICE: &str = "org.chromium.CrosDisks";
pub const DEFAULT_OBJECT_PATH: &str = "/org/chromium/CrosDisks";
pub const DEFAULT_INTERFACE: &str = "org.chromium.CrosDisks";

/// Which message bus the service lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub bus: BusKind,
    pub service: String,
    pub object_path: String,
    pub interface: String,
    /// Options passed with every `Mount` call
    pub mount_options: Vec<String>,
    /// Options passed with every `Unmount` call
    pub unmount_options: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            service: DEFAULT_SERVICE.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
            interface: DEFAULT_INTERFACE.to_string(),
            mount_options: ["rw", "nodev", "noexec", "nosuid"]
                .into_iter()
                .map(String::from)
                .collect(),
            unmount_options: vec!["force".to_string()],
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ClientError> {
        toml::from_str(contents)
            .map_err(|e| ClientError::Config(format!("Invalid TOML: {e}")))
    }

    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ClientError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.unmount_options, vec!["force".to_string()]);
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let config = ClientConfig::from_toml_str(
            r#"
bus = "session"
mount_options = ["ro"]
"#,
        )
        .expect("parse config");
        assert_eq!(config.bus, BusKind::Session);
        assert_eq!(config.mount_options, vec!["ro".to_string()]);
        assert_eq!(config.service, DEFAULT_SERVICE);
    }

    #[test]
    fn malformed_config_is_rejected() {
        let err = ClientConfig::from_toml_str("bus = 3").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ClientConfig::load_or_default(Some(Path::new("/nonexistent/crosdisks.toml")))
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("/nonexistent/crosdisks.toml"));
        assert!(ClientConfig::load_or_default(None).is_ok());
    }
}
