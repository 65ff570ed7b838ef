//! Family domain - creation, metadata, ownership and deletion of families

pub mod actions;
pub mod invite_code;
pub mod models;

pub use models::{Family, FamilyStatus};
