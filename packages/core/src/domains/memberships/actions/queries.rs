//! Membership query actions

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{FamilyId, FamilyResult, MembershipId, UserId};
use crate::domains::guards::require_actor;
use crate::kernel::FamilyDeps;

/// A pending invitation as the invitee sees it.
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub membership_id: MembershipId,
    pub family_id: FamilyId,
    pub family_name: String,
    pub inviter_id: Option<UserId>,
    pub inviter_nickname: Option<String>,
    pub invited_at: DateTime<Utc>,
}

/// Pending invitations addressed to `user`, newest first.
///
/// Invitations into families that are no longer ACTIVE are left out.
pub async fn list_invitations(user: UserId, deps: &FamilyDeps) -> FamilyResult<Vec<Invitation>> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), user).await?;

    let pending: Vec<_> = tx
        .find_memberships_by_user(user)
        .await?
        .into_iter()
        .filter(|m| m.is_pending())
        .collect();

    let mut invitations = Vec::with_capacity(pending.len());
    for record in pending {
        let Some(family) = tx.find_family(record.family_id).await? else {
            continue;
        };
        if !family.is_active() {
            continue;
        }

        let inviter_nickname = match record.inviter_id {
            Some(inviter) => tx.find_user(inviter).await?.map(|u| u.nickname),
            None => None,
        };

        invitations.push(Invitation {
            membership_id: record.id,
            family_id: family.id,
            family_name: family.name,
            inviter_id: record.inviter_id,
            inviter_nickname,
            invited_at: record.created_at,
        });
    }

    invitations.sort_by(|a, b| b.invited_at.cmp(&a.invited_at));
    Ok(invitations)
}
