// Common types shared across the family domains

pub mod entity_ids;
pub mod errors;
pub mod id;

pub use entity_ids::*;
pub use errors::{FamilyError, FamilyResult};
pub use id::Id;
