//! One-shot selection prompt state machine.
//!
//! A prompt is armed with a fixed candidate list, accepts exactly one
//! submission, and expires if nothing is chosen within [`PROMPT_TIMEOUT`].
//! The widget rendering lives in the platform layer; this type only tracks
//! the states and enforces the single-use contract.

use std::time::Duration;

use thiserror::Error;

/// How long an armed prompt waits for a submission.
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// Accepting exactly one submission.
    Armed,
    /// A candidate was chosen; further input has no effect.
    Submitted,
    /// Timed out with no submission; terminal.
    Expired,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("prompt already resolved")]
    AlreadyResolved,

    #[error("'{0}' is not a candidate of this prompt")]
    UnknownChoice(String),
}

/// A single-use prompt over a candidate list fixed at construction.
#[derive(Debug)]
pub struct SelectPrompt {
    candidates: Vec<String>,
    state: PromptState,
    choice: Option<String>,
}

impl SelectPrompt {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            state: PromptState::Armed,
            choice: None,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    /// The chosen identifier, once submitted.
    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    /// Accept the one allowed submission. Only valid while armed, and only
    /// for a candidate supplied at construction.
    pub fn submit(&mut self, choice: &str) -> Result<(), PromptError> {
        if self.state != PromptState::Armed {
            return Err(PromptError::AlreadyResolved);
        }
        if !self.candidates.iter().any(|c| c == choice) {
            return Err(PromptError::UnknownChoice(choice.to_string()));
        }
        self.state = PromptState::Submitted;
        self.choice = Some(choice.to_string());
        Ok(())
    }

    /// Fire the timeout. Returns true only on the Armed -> Expired
    /// transition, i.e. when the hosting message should be rewritten to its
    /// timed-out state. After a submission this is a no-op.
    pub fn expire(&mut self) -> bool {
        if self.state == PromptState::Armed {
            self.state = PromptState::Expired;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> SelectPrompt {
        SelectPrompt::new(vec!["events".into(), "extension_manage".into()])
    }

    #[test]
    fn accepts_exactly_one_submission() {
        let mut p = prompt();
        assert_eq!(p.submit("events"), Ok(()));
        assert_eq!(p.state(), PromptState::Submitted);
        assert_eq!(p.choice(), Some("events"));

        assert_eq!(
            p.submit("extension_manage"),
            Err(PromptError::AlreadyResolved)
        );
        assert_eq!(p.choice(), Some("events"));
    }

    #[test]
    fn rejects_choices_outside_the_candidate_list() {
        let mut p = prompt();
        assert_eq!(
            p.submit("admin"),
            Err(PromptError::UnknownChoice("admin".into()))
        );
        // A bad choice does not consume the prompt.
        assert_eq!(p.state(), PromptState::Armed);
        assert_eq!(p.submit("events"), Ok(()));
    }

    #[test]
    fn expiry_is_guarded_after_submission() {
        let mut p = prompt();
        p.submit("events").unwrap();
        assert!(!p.expire());
        assert_eq!(p.state(), PromptState::Submitted);
    }

    #[test]
    fn expiry_without_submission_is_terminal() {
        let mut p = prompt();
        assert!(p.expire());
        assert_eq!(p.state(), PromptState::Expired);
        // Second expiry does not ask for another edit.
        assert!(!p.expire());
        assert_eq!(p.submit("events"), Err(PromptError::AlreadyResolved));
    }
}
