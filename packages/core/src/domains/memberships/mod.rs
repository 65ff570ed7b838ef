//! Membership domain - the invite/accept/withdraw/expel state machine
//!
//! Records are never deleted. A finished membership is INACTIVE (or
//! DEACCEPTED for an invitation that was turned down or expired) and a later
//! invitation creates a fresh record.

pub mod actions;
pub mod events;
pub mod models;

pub use events::MembershipEvent;
pub use models::{MembershipRecord, MembershipStatus};
