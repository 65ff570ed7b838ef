// TestDependencies - mock implementations for testing
//
// Builds FamilyDeps over an in-memory store with a spy notifier.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::deps::FamilyDeps;
use super::memory_store::MemoryStore;
use super::traits::{BaseCodeSource, BaseNotifier};
use crate::config::EngineConfig;
use crate::domains::memberships::events::MembershipEvent;

// =============================================================================
// Mock Notifiers
// =============================================================================

/// Records every delivered event.
#[derive(Default)]
pub struct SpyNotifier {
    events: Mutex<Vec<MembershipEvent>>,
}

impl SpyNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MembershipEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Wait (up to one second) until at least `count` events arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<MembershipEvent> {
        for _ in 0..100 {
            if self.events.lock().unwrap_or_else(PoisonError::into_inner).len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl BaseNotifier for SpyNotifier {
    async fn notify(&self, event: &MembershipEvent) -> Result<()> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
        Ok(())
    }
}

/// Fails every delivery, counting attempts.
#[derive(Default)]
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseNotifier for FailingNotifier {
    async fn notify(&self, _event: &MembershipEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("notification backend unavailable"))
    }
}

// =============================================================================
// Mock Code Source
// =============================================================================

/// Hands out a fixed list of codes, repeating the last one forever.
pub struct ScriptedCodeSource {
    codes: Vec<String>,
    next: AtomicUsize,
}

impl ScriptedCodeSource {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl BaseCodeSource for ScriptedCodeSource {
    fn next_code(&self, _length: usize) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.codes
            .get(index)
            .or_else(|| self.codes.last())
            .cloned()
            .unwrap_or_default()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub store: MemoryStore,
    pub spy: Arc<SpyNotifier>,
    notifier: Arc<dyn BaseNotifier>,
    codes: Arc<dyn BaseCodeSource>,
    config: EngineConfig,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        let spy = Arc::new(SpyNotifier::new());
        Self {
            store: MemoryStore::new(),
            notifier: spy.clone(),
            spy,
            codes: Arc::new(super::deps::UuidCodeSource),
            config: EngineConfig::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn BaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_codes(mut self, codes: impl BaseCodeSource + 'static) -> Self {
        self.codes = Arc::new(codes);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn deps(&self) -> FamilyDeps {
        FamilyDeps::new(
            Arc::new(self.store.clone()),
            self.notifier.clone(),
            self.codes.clone(),
            self.config.clone(),
        )
    }
}
