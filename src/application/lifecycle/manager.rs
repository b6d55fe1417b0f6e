//! Lifecycle manager - applies operator-requested operations to the registry
//! and maps every failure to a fixed user-facing message.

use tokio::sync::Mutex;

use crate::application::errors::ExtensionError;
use crate::domain::entities::{OpKind, Outcome};
use crate::domain::traits::ExtensionRegistry;

/// Orchestrates lifecycle operations against an injected registry.
///
/// Candidate lists and active snapshots are computed fresh on every call;
/// nothing is cached across requests, since extension availability can change
/// between commands. Concurrent operations on the same identifier are
/// serialized only by the registry lock itself (last writer wins), which is
/// acceptable for single-operator usage.
pub struct LifecycleManager<R: ExtensionRegistry> {
    registry: Mutex<R>,
}

impl<R: ExtensionRegistry> LifecycleManager<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry: Mutex::new(registry),
        }
    }

    /// Candidate identifiers for one operation: everything on disk for a
    /// load, everything currently active for an unload or reload.
    pub async fn candidates(&self, op: OpKind) -> Result<Vec<String>, ExtensionError> {
        let registry = self.registry.lock().await;
        match op {
            OpKind::Load => registry.list_discoverable(),
            OpKind::Unload | OpKind::Reload => Ok(registry.list_active()),
        }
    }

    /// Snapshot of currently active identifiers.
    pub async fn active(&self) -> Vec<String> {
        self.registry.lock().await.list_active()
    }

    /// Apply one operation. Never fails: every registry error collapses into
    /// an [`Outcome`], so the caller always has something to report.
    pub async fn apply(&self, op: OpKind, id: &str) -> Outcome {
        let mut registry = self.registry.lock().await;
        let result = match op {
            OpKind::Load => registry.load(id).await,
            OpKind::Unload => registry.unload(id).await,
            OpKind::Reload => registry.reload(id).await,
        };
        match result {
            Ok(()) => Outcome::Succeeded,
            Err(err) => Outcome::from(err),
        }
    }
}

/// The fixed message for one (operation, identifier, outcome) triple.
pub fn outcome_message(op: OpKind, id: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Succeeded => format!("Extension {id} {}ed successfully", op.as_str()),
        Outcome::AlreadyActive => format!("Extension {id} is already loaded"),
        Outcome::NotFound => format!("Extension {id} does not exist"),
        Outcome::NotActive => {
            format!("Extension {id} is not loaded, cannot {}", op.as_str())
        }
        Outcome::NoEntryPoint => {
            format!("Extension {id} does not define an entry point")
        }
        Outcome::SetupFailed(detail) => {
            format!("Extension {id} failed during setup:\n{detail}")
        }
        Outcome::Unexpected(detail) => {
            format!("An unexpected error occurred:\n{detail}")
        }
    }
}
