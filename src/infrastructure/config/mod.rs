//! Configuration management
//!
//! Two sources, deliberately separate: non-secret settings come from an
//! optional YAML file with sensible defaults, while secrets and deployment
//! identity come from the environment (populated from `.env` at startup).
//!
//! The environment accessors are free functions. They read fresh on every
//! call, and a missing required value fails with [`ConfigError::Missing`] at
//! the point of use, before any side effect.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use twilight_model::id::marker::GuildMarker;
use twilight_model::id::Id;

use crate::application::errors::ConfigError;

/// Name of the required bot token variable.
pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
/// Name of the required command-scoping guild variable.
pub const TEST_GUILD_ID: &str = "TEST_GUILD_ID";
/// Name of the optional embed icon variable.
pub const BOT_ICON_URL: &str = "BOT_ICON_URL";

/// Bot token. Required; startup must not proceed without it.
pub fn bot_token() -> Result<String, ConfigError> {
    match std::env::var(DISCORD_BOT_TOKEN) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => Err(ConfigError::Missing(DISCORD_BOT_TOKEN)),
    }
}

/// Guild all management commands are scoped to. Required wherever command
/// syncing is requested.
pub fn test_guild() -> Result<Id<GuildMarker>, ConfigError> {
    let raw = std::env::var(TEST_GUILD_ID).map_err(|_| ConfigError::Missing(TEST_GUILD_ID))?;
    let id: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
        name: TEST_GUILD_ID,
        detail: format!("'{raw}' is not a numeric guild id"),
    })?;
    if id == 0 {
        return Err(ConfigError::Invalid {
            name: TEST_GUILD_ID,
            detail: "guild id must be non-zero".to_string(),
        });
    }
    Ok(Id::new(id))
}

/// Icon shown on the extension-list embed. Optional; absence means no icon.
pub fn bot_icon() -> Option<String> {
    std::env::var(BOT_ICON_URL).ok().filter(|url| !url.is_empty())
}

/// File-backed settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionsConfig {
    /// Directory scanned (non-recursively) for extension libraries.
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "extbot".to_string(),
            },
            extensions: ExtensionsConfig {
                directory: PathBuf::from("./extensions"),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {e}")))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {e}")))
    }
}
