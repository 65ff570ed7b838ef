//! Family membership lifecycle and cascading deactivation.
//!
//! Every public operation takes an already authenticated actor, runs in a
//! single transaction opened through [`kernel::BaseFamilyStore`], and either
//! commits all of its writes or none of them.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use common::{FamilyError, FamilyResult};
pub use config::{Config, EngineConfig};
pub use kernel::FamilyDeps;
