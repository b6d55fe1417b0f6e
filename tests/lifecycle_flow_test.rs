//! Extension Lifecycle Integration Tests
//! Run with: cargo test --test lifecycle_flow_test

use std::collections::BTreeSet;
use std::sync::Once;

use async_trait::async_trait;

use extbot::application::errors::ExtensionError;
use extbot::application::lifecycle::{
    outcome_message, LifecycleManager, PromptError, PromptState, SelectPrompt,
};
use extbot::domain::entities::{OpKind, Outcome};
use extbot::domain::traits::ExtensionRegistry;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

/// In-memory registry standing in for the dylib-backed one.
struct FakeRegistry {
    discoverable: BTreeSet<String>,
    active: BTreeSet<String>,
}

impl FakeRegistry {
    fn new(discoverable: &[&str]) -> Self {
        Self {
            discoverable: discoverable.iter().map(|s| s.to_string()).collect(),
            active: BTreeSet::new(),
        }
    }
}

#[async_trait]
impl ExtensionRegistry for FakeRegistry {
    async fn load(&mut self, id: &str) -> Result<(), ExtensionError> {
        if self.active.contains(id) {
            return Err(ExtensionError::AlreadyLoaded);
        }
        if !self.discoverable.contains(id) {
            return Err(ExtensionError::NotFound);
        }
        self.active.insert(id.to_string());
        Ok(())
    }

    async fn unload(&mut self, id: &str) -> Result<(), ExtensionError> {
        if self.active.remove(id) {
            Ok(())
        } else {
            Err(ExtensionError::NotLoaded)
        }
    }

    async fn reload(&mut self, id: &str) -> Result<(), ExtensionError> {
        if !self.active.contains(id) {
            return Err(ExtensionError::NotLoaded);
        }
        Ok(())
    }

    fn list_active(&self) -> Vec<String> {
        self.active.iter().cloned().collect()
    }

    fn list_discoverable(&self) -> Result<Vec<String>, ExtensionError> {
        Ok(self.discoverable.iter().cloned().collect())
    }
}

/// The full operator scenario: load, duplicate load, unload of an inactive
/// extension - each step reporting its fixed message.
#[tokio::test]
async fn management_scenario() {
    ensure_init();

    let manager = LifecycleManager::new(FakeRegistry::new(&["events", "extension_manage"]));

    // load("events") succeeds and activates exactly that extension.
    let outcome = manager.apply(OpKind::Load, "events").await;
    assert_eq!(outcome, Outcome::Succeeded);
    assert_eq!(manager.active().await, vec!["events".to_string()]);
    assert_eq!(
        outcome_message(OpKind::Load, "events", &outcome),
        "Extension events loaded successfully"
    );

    // A second load reports AlreadyActive and changes nothing.
    let outcome = manager.apply(OpKind::Load, "events").await;
    assert_eq!(outcome, Outcome::AlreadyActive);
    assert_eq!(manager.active().await, vec!["events".to_string()]);

    // Unloading something that never loaded reports NotActive.
    let outcome = manager.apply(OpKind::Unload, "extension_manage").await;
    assert_eq!(outcome, Outcome::NotActive);
    assert_eq!(manager.active().await, vec!["events".to_string()]);
}

/// Candidate lists mirror the operation: everything on disk for load,
/// only the active set for unload and reload - and they are never stale.
#[tokio::test]
async fn candidate_lists_track_registry_state() {
    ensure_init();

    let manager = LifecycleManager::new(FakeRegistry::new(&["events", "extension_manage"]));

    assert_eq!(
        manager.candidates(OpKind::Load).await.unwrap(),
        vec!["events".to_string(), "extension_manage".to_string()]
    );
    assert!(manager.candidates(OpKind::Unload).await.unwrap().is_empty());

    manager.apply(OpKind::Load, "events").await;
    assert_eq!(
        manager.candidates(OpKind::Reload).await.unwrap(),
        vec!["events".to_string()]
    );

    manager.apply(OpKind::Unload, "events").await;
    assert!(manager.candidates(OpKind::Reload).await.unwrap().is_empty());
}

/// A prompt built over the candidate list drives exactly one operation;
/// afterwards it accepts nothing, and an expired prompt drives none.
#[tokio::test]
async fn prompt_gates_the_operation() {
    ensure_init();

    let manager = LifecycleManager::new(FakeRegistry::new(&["events", "extension_manage"]));
    let candidates = manager.candidates(OpKind::Load).await.unwrap();

    let mut prompt = SelectPrompt::new(candidates);
    prompt.submit("events").unwrap();
    let choice = prompt.choice().unwrap().to_string();

    let outcome = manager.apply(OpKind::Load, &choice).await;
    assert_eq!(outcome, Outcome::Succeeded);

    // The prompt is spent: a second submission is rejected before it can
    // reach the registry.
    assert_eq!(
        prompt.submit("extension_manage"),
        Err(PromptError::AlreadyResolved)
    );
    assert_eq!(manager.active().await, vec!["events".to_string()]);

    // An expired prompt never produces a choice to act on.
    let mut expired = SelectPrompt::new(vec!["events".to_string()]);
    assert!(expired.expire());
    assert_eq!(expired.state(), PromptState::Expired);
    assert_eq!(expired.choice(), None);
}

/// Reload keeps the extension active; membership is unchanged.
#[tokio::test]
async fn reload_preserves_membership() {
    ensure_init();

    let manager = LifecycleManager::new(FakeRegistry::new(&["events"]));
    manager.apply(OpKind::Load, "events").await;

    assert_eq!(manager.apply(OpKind::Reload, "events").await, Outcome::Succeeded);
    assert_eq!(manager.active().await, vec!["events".to_string()]);

    manager.apply(OpKind::Unload, "events").await;
    assert_eq!(manager.apply(OpKind::Reload, "events").await, Outcome::NotActive);
}
