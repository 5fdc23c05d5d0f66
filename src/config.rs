//! Plugin configuration (`config.yaml` in the data folder).
//!
//! Covers:
//! - display options (`display.tab-list`)
//! - the chat prefix and every user-facing message template
//! - help lines
//! - where player data lives and how long shutdown waits for a pending save
//!
//! Keys use kebab-case to match the message keys referenced by the command
//! handler. Message and help keys missing from a user's file are filled in
//! from the defaults on load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file name inside the data folder.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors that can occur when loading or saving the plugin config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error on config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid YAML.
    #[error("YAML parse error in config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml_ng::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub display: DisplayConfig,
    pub message_format: MessageFormatConfig,
    pub messages: BTreeMap<String, String>,
    pub help: BTreeMap<String, String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DisplayConfig {
    /// Also color the name shown in the player list.
    pub tab_list: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessageFormatConfig {
    /// Prepended to every message. `§` codes are honoured.
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StorageConfig {
    /// Player data file, relative to the data folder.
    pub file: String,
    /// Upper bound on how long shutdown waits for a pending background save.
    pub flush_wait_timeout_ms: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            message_format: MessageFormatConfig::default(),
            messages: default_messages(),
            help: default_help(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { tab_list: true }
    }
}

impl Default for MessageFormatConfig {
    fn default() -> Self {
        Self {
            prefix: "§1[§9NameColor§1]§3".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: namecolor_store::DATA_FILE_NAME.to_string(),
            flush_wait_timeout_ms: 5000,
        }
    }
}

fn default_messages() -> BTreeMap<String, String> {
    [
        ("player-only", "&cOnly players can change their name color."),
        ("invalid-color", "&cUnknown color. Available colors: {colors}"),
        ("invalid-color-admin", "&cUnknown color. Valid colors: {colors}"),
        ("no-permission", "&cYou do not have permission to use {color}&c."),
        ("color-changed", "&7Your name color is now {color}&7: {name}"),
        ("color-reset", "&7Your name color has been reset."),
        ("color-list", "&7Colors you can use: {colors}"),
        ("no-colors-available", "&cYou do not have access to any colors."),
        ("reload-success", "&aConfiguration and player data reloaded."),
        (
            "reload-data-failed",
            "&eConfiguration reloaded, but player data could not be read. Kept the current colors; see the server log.",
        ),
        ("reload-no-permission", "&cOnly operators can reload NameColor."),
        ("admin-no-permission", "&cYou do not have permission to change other players' colors."),
        ("player-not-found", "&cPlayer {player} is not online."),
        ("admin-color-changed", "&7Set {player}'s name color to {color}&7: {name}"),
        ("admin-color-changed-target", "&7An admin set your name color to {color}&7: {name}"),
        ("admin-color-reset", "&7Reset {player}'s name color."),
        ("admin-color-reset-target", "&7An admin reset your name color."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_help() -> BTreeMap<String, String> {
    [
        ("header", "§bName color commands:"),
        ("change-color", "§7/namecolor <color> §8- §fchange your name color"),
        ("reset-color", "§7/namecolor reset §8- §fremove your name color"),
        ("list-colors", "§7/namecolor list §8- §fshow the colors you can use"),
        ("show-help", "§7/namecolor help §8- §fshow this help"),
        ("admin-header", "§bAdmin commands:"),
        ("admin-change-color", "§7/namecolor <player> <color> §8- §fset a player's color"),
        ("admin-reset-color", "§7/namecolor <player> reset §8- §freset a player's color"),
        ("reload-command", "§7/namecolor reload §8- §freload config and player data"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl PluginConfig {
    /// Config file location inside `data_folder`.
    pub fn path_in(data_folder: &Path) -> PathBuf {
        data_folder.join(CONFIG_FILE_NAME)
    }

    /// Load the config from `data_folder`, writing the defaults if the file
    /// does not exist yet.
    pub fn load(data_folder: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(data_folder);
        if !path.exists() {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            config.save(data_folder)?;
            return Ok(config);
        }

        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(&path).map_err(io_error(&path))?;
        let mut config: Self = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?
        };
        config.merge_defaults();
        Ok(config)
    }

    /// Save the config into `data_folder`.
    pub fn save(&self, data_folder: &Path) -> Result<(), ConfigError> {
        let path = Self::path_in(data_folder);
        fs::create_dir_all(data_folder).map_err(io_error(data_folder))?;
        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(io_error(&temp_path))?;
        fs::rename(&temp_path, &path).map_err(io_error(&path))?;
        Ok(())
    }

    /// Fill in message and help keys added since the user's file was written.
    fn merge_defaults(&mut self) {
        for (key, value) in default_messages() {
            self.messages.entry(key).or_insert(value);
        }
        for (key, value) in default_help() {
            self.help.entry(key).or_insert(value);
        }
    }

    /// Absolute location of the player data file.
    pub fn data_file_path(&self, data_folder: &Path) -> PathBuf {
        data_folder.join(&self.storage.file)
    }

    pub fn flush_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.flush_wait_timeout_ms)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + use<> {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}

/// Resolve the data folder: explicit override, then the platform config
/// directory, then `./namecolor`.
pub fn resolve_data_folder(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    dirs::config_dir()
        .map(|dir| dir.join("namecolor"))
        .unwrap_or_else(|| PathBuf::from("namecolor"))
}
