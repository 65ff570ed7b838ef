//! Leave actions - a member withdraws, or the owner expels members
//!
//! Leaving only ends the membership. Posts, comments and reactions the
//! member wrote stay ACTIVE; only account deletion takes content down.

use tracing::{info, instrument};

use super::dedupe;
use crate::common::{FamilyError, FamilyId, FamilyResult, MembershipId, UserId};
use crate::domains::guards::{require_active_family, require_actor, require_owner};
use crate::domains::memberships::events::MembershipEvent;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::kernel::FamilyDeps;

/// ACTIVE → INACTIVE for the caller's own membership.
///
/// The owner must transfer ownership first.
#[instrument(skip_all, fields(user = %user, family_id = %family_id))]
pub async fn withdraw(
    user: UserId,
    family_id: FamilyId,
    deps: &FamilyDeps,
) -> FamilyResult<MembershipRecord> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), user).await?;
    let family = require_active_family(tx.as_mut(), family_id).await?;

    let mut record = match tx.find_live_membership(user, family_id).await? {
        Some(record) if record.is_active() => record,
        _ => return Err(FamilyError::not_found("membership", format!("{}/{}", user, family_id))),
    };
    if family.is_owner(user) {
        return Err(FamilyError::OwnerCannotWithdraw);
    }

    record.transition(MembershipStatus::Inactive)?;
    tx.update_membership_status(&[record.id], MembershipStatus::Inactive)
        .await?;
    tx.commit().await?;

    info!("Member withdrew");
    deps.dispatch(vec![MembershipEvent::Withdrew {
        family_id,
        user_id: user,
    }]);
    Ok(record)
}

/// ACTIVE → INACTIVE for each target, by the owner.
///
/// Every target must hold an ACTIVE membership in the family, otherwise
/// nobody is expelled.
#[instrument(skip_all, fields(actor = %actor, family_id = %family_id))]
pub async fn expel(
    actor: UserId,
    family_id: FamilyId,
    targets: &[UserId],
    deps: &FamilyDeps,
) -> FamilyResult<Vec<MembershipRecord>> {
    let targets = dedupe(targets);
    if targets.is_empty() {
        return Err(FamilyError::validation("at least one member must be named"));
    }

    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), actor).await?;
    let family = require_active_family(tx.as_mut(), family_id).await?;
    require_owner(&family, actor)?;

    if targets.contains(&actor) {
        return Err(FamilyError::validation("the owner cannot expel themselves"));
    }

    let mut expelled = Vec::with_capacity(targets.len());
    for &target in &targets {
        let mut record = match tx.find_live_membership(target, family_id).await? {
            Some(record) if record.is_active() => record,
            _ => return Err(FamilyError::TargetNotActiveMember(target)),
        };
        record.transition(MembershipStatus::Inactive)?;
        expelled.push(record);
    }

    let ids: Vec<MembershipId> = expelled.iter().map(|r| r.id).collect();
    tx.update_membership_status(&ids, MembershipStatus::Inactive)
        .await?;
    tx.commit().await?;

    info!(count = expelled.len(), "Members expelled");
    deps.dispatch(
        targets
            .into_iter()
            .map(|user_id| MembershipEvent::Expelled {
                family_id,
                owner_id: actor,
                user_id,
            })
            .collect(),
    );
    Ok(expelled)
}
