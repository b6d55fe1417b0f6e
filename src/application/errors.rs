//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(String),
}

/// Extension registry failures.
///
/// A closed enumeration: the lifecycle manager's outcome mapping is a total
/// function over these kinds, with no open-ended exception hierarchy behind
/// them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension is already loaded")]
    AlreadyLoaded,

    #[error("extension is not loaded")]
    NotLoaded,

    #[error("extension does not exist")]
    NotFound,

    #[error("extension does not export an entry point")]
    NoEntryPoint,

    #[error("extension setup failed: {0}")]
    Setup(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration errors. A missing required value is terminal: startup must
/// not proceed without it, and handlers report it verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set in the environment")]
    Missing(&'static str),

    #[error("invalid value for {name}: {detail}")]
    Invalid { name: &'static str, detail: String },

    #[error("parse error: {0}")]
    Parse(String),
}
