pub mod membership;

pub use membership::{MembershipRecord, MembershipStatus};
