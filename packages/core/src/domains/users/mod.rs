//! User domain - the slice of identity the family core reads and writes

pub mod actions;
pub mod models;

pub use models::{User, UserStatus};
