//! Membership domain actions - business logic functions
//!
//! Each action runs in one transaction and dispatches its events only once
//! that transaction committed.

mod expire;
mod invite;
mod leave;
mod queries;
mod respond;

pub use expire::expire_invitations;
pub use invite::invite;
pub use leave::{expel, withdraw};
pub use queries::{list_invitations, Invitation};
pub use respond::{accept, reject};

use crate::common::UserId;

/// Drop repeated ids, keeping first occurrence order.
pub(crate) fn dedupe(ids: &[UserId]) -> Vec<UserId> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(dedupe(&[b, a, b, a]), vec![b, a]);
        assert!(dedupe(&[]).is_empty());
    }
}
