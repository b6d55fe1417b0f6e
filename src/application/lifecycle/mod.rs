//! Extension lifecycle management
//!
//! The manager orchestrates one operator request end to end: compute a
//! candidate list, hand it to a one-shot selection prompt, apply the chosen
//! operation through the injected registry, and map the result to a fixed
//! user-facing message.

pub mod manager;
pub mod prompt;

pub use manager::{outcome_message, LifecycleManager};
pub use prompt::{PromptError, PromptState, SelectPrompt, PROMPT_TIMEOUT};
