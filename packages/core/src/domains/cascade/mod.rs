//! Cascading deactivation - ordered, all-or-nothing soft deletion of a user's
//! or a family's dependent records.

mod engine;

pub use engine::{cascade_family, cascade_user, CascadeReport};
pub(crate) use engine::cascade_family_in;
