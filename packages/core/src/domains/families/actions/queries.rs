//! Family query actions
//!
//! Queries return data directly. They still run inside a transaction so
//! that a member list never mixes two committed states.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::common::{FamilyId, FamilyResult, UserId};
use crate::domains::families::models::Family;
use crate::domains::guards::require_active_family;
use crate::kernel::FamilyDeps;

#[derive(Debug, Clone, Serialize)]
pub struct FamilyMember {
    pub user_id: UserId,
    pub nickname: String,
    pub is_owner: bool,
    pub joined_at: DateTime<Utc>,
}

/// Look up an ACTIVE family.
pub async fn get_family(family_id: FamilyId, deps: &FamilyDeps) -> FamilyResult<Family> {
    let mut tx = deps.store.begin().await?;
    require_active_family(tx.as_mut(), family_id).await
}

/// ACTIVE members of an ACTIVE family, owner first, then by join time.
pub async fn list_active_members(
    family_id: FamilyId,
    deps: &FamilyDeps,
) -> FamilyResult<Vec<FamilyMember>> {
    let mut tx = deps.store.begin().await?;
    let family = require_active_family(tx.as_mut(), family_id).await?;

    let records = tx.find_memberships_by_family(family_id).await?;
    let mut members = Vec::with_capacity(records.len());
    for record in records.into_iter().filter(|r| r.is_active()) {
        let Some(user) = tx.find_user(record.user_id).await? else {
            continue;
        };
        members.push(FamilyMember {
            user_id: user.id,
            nickname: user.nickname,
            is_owner: family.is_owner(record.user_id),
            joined_at: record.created_at,
        });
    }

    members.sort_by(|a, b| {
        b.is_owner
            .cmp(&a.is_owner)
            .then(a.joined_at.cmp(&b.joined_at))
    });

    debug!(%family_id, count = members.len(), "Listed active members");
    Ok(members)
}

/// The ACTIVE family a user currently belongs to, if any.
pub async fn current_family(user: UserId, deps: &FamilyDeps) -> FamilyResult<Option<Family>> {
    let mut tx = deps.store.begin().await?;

    let mut active: Vec<_> = tx
        .find_memberships_by_user(user)
        .await?
        .into_iter()
        .filter(|m| m.is_active())
        .collect();
    active.sort_by_key(|m| m.created_at);

    for record in active {
        if let Some(family) = tx.find_family(record.family_id).await? {
            if family.is_active() {
                return Ok(Some(family));
            }
        }
    }
    Ok(None)
}
