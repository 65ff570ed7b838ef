//! Dependencies shared by every family operation (traits for testability)

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::traits::{BaseCodeSource, BaseFamilyStore, BaseNotifier};
use crate::config::EngineConfig;
use crate::domains::memberships::events::MembershipEvent;

// =============================================================================
// Default collaborators
// =============================================================================

/// Notifier that only writes events to the log.
pub struct TracingNotifier;

#[async_trait]
impl BaseNotifier for TracingNotifier {
    async fn notify(&self, event: &MembershipEvent) -> Result<()> {
        info!(event = event.name(), payload = ?event, "membership event");
        Ok(())
    }
}

/// Draws invite codes from random v4 UUIDs (uppercase hex).
pub struct UuidCodeSource;

impl BaseCodeSource for UuidCodeSource {
    fn next_code(&self, length: usize) -> String {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        hex.chars().take(length).collect()
    }
}

// =============================================================================
// FamilyDeps
// =============================================================================

#[derive(Clone)]
pub struct FamilyDeps {
    pub store: Arc<dyn BaseFamilyStore>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub codes: Arc<dyn BaseCodeSource>,
    pub config: EngineConfig,
}

impl FamilyDeps {
    pub fn new(
        store: Arc<dyn BaseFamilyStore>,
        notifier: Arc<dyn BaseNotifier>,
        codes: Arc<dyn BaseCodeSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            codes,
            config,
        }
    }

    /// Production wiring around a store: log-only notifier, random codes.
    pub fn with_store(store: Arc<dyn BaseFamilyStore>, config: EngineConfig) -> Self {
        Self::new(store, Arc::new(TracingNotifier), Arc::new(UuidCodeSource), config)
    }

    /// Hand committed events to the notifier without waiting for delivery.
    ///
    /// Must only be called after the producing transaction committed.
    pub fn dispatch(&self, events: Vec<MembershipEvent>) {
        if events.is_empty() {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(count = events.len(), "No async runtime; dropping membership events");
            return;
        };

        let notifier = self.notifier.clone();
        handle.spawn(async move {
            for event in events {
                match notifier.notify(&event).await {
                    Ok(()) => debug!(event = event.name(), "Notification delivered"),
                    Err(e) => warn!(event = event.name(), error = %e, "Notification failed"),
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_codes_have_requested_length() {
        let code = UuidCodeSource.next_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
