//! Discord platform integration
//!
//! The gateway runtime owns the shard event loop; `commands` defines the
//! guild-scoped slash commands and their synchronization; `interactions`
//! drives the select-menu prompt flow for each management command.

pub mod commands;
pub mod interactions;
pub mod runtime;

pub use runtime::{BotContext, DiscordPlatform};
