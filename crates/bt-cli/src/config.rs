//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bt_core::Locale;
use chrono::{DateTime, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::commands::util::parse_instant;

/// Application configuration.
///
/// Loaded once at startup and passed by reference; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// The baby's name, shown in the status header.
    pub name: String,
    /// Birth instant, given as ISO 8601; without an offset it is local time.
    #[serde(
        default,
        deserialize_with = "deserialize_birth",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth: Option<DateTime<Utc>>,
    /// Locale for durations and dates.
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("bt.db"),
            name: "Baby".to_string(),
            birth: None,
            locale: Locale::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BT_*)
        figment = figment.merge(Env::prefixed("BT_"));

        figment.extract()
    }

    /// The configured birth instant.
    pub fn birth_instant(&self) -> Result<DateTime<Utc>> {
        self.birth
            .context("birth is not configured; set `birth` in config.toml or BT_BIRTH")
    }
}

/// Parses `birth` while the configuration is extracted, so a malformed value
/// fails at startup.
fn deserialize_birth<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_instant(&raw).map_err(|err| de::Error::custom(format!("invalid birth: {err}")))
        })
        .transpose()
}

/// Returns the platform-specific config directory for bt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}

/// Returns the platform-specific data directory for bt.
///
/// On Linux: `~/.local/share/bt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bt"))
}
