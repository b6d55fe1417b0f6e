//! extbot - a Discord bot that manages its own extension set at runtime.
//!
//! Extensions are shared libraries loaded, unloaded, and reloaded by name
//! while the bot is connected, driven by guild-scoped slash commands.

pub mod application;
pub mod domain;
pub mod infrastructure;
