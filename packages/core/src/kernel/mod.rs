//! Kernel module - storage, notification and dependency plumbing.

pub mod deps;
pub mod memory_store;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{FamilyDeps, TracingNotifier, UuidCodeSource};
pub use memory_store::{Deactivation, FaultPoint, MemoryStore};
pub use postgres_store::PgStore;
pub use test_dependencies::{FailingNotifier, ScriptedCodeSource, SpyNotifier, TestDependencies};
pub use traits::*;
