//! Invite action - an ACTIVE member invites users into their family

use tracing::{debug, info, instrument};

use super::dedupe;
use crate::common::{FamilyError, FamilyId, FamilyResult, UserId};
use crate::domains::guards::{
    ensure_unaffiliated, require_active_family, require_active_member, require_actor,
    require_target_user,
};
use crate::domains::memberships::events::MembershipEvent;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::kernel::FamilyDeps;

/// Create one PENDING_INVITE record per target.
///
/// This action:
/// 1. Requires the inviter to be an ACTIVE member of an ACTIVE family
/// 2. Locks the target users for the rest of the transaction
/// 3. Checks every target before writing anything: each must be an ACTIVE
///    user with no ACTIVE or PENDING_INVITE membership anywhere
/// 4. Retires a DEACCEPTED record for the same family, then inserts the
///    new invitation
///
/// Either every target is invited or none is. The insert re-checks the
/// one-affiliation rule, so a racing invite from another family surfaces
/// as `AlreadyAffiliated` here rather than as a second affiliation.
#[instrument(skip_all, fields(inviter = %inviter, family_id = %family_id))]
pub async fn invite(
    inviter: UserId,
    family_id: FamilyId,
    targets: &[UserId],
    deps: &FamilyDeps,
) -> FamilyResult<Vec<MembershipRecord>> {
    let targets = dedupe(targets);
    if targets.is_empty() {
        return Err(FamilyError::validation("at least one user must be invited"));
    }

    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), inviter).await?;
    require_active_family(tx.as_mut(), family_id).await?;
    require_active_member(tx.as_mut(), inviter, family_id).await?;

    let mut locked = targets.clone();
    locked.sort();
    tx.lock_users(&locked).await?;

    let mut stale = Vec::new();
    for &target in &targets {
        require_target_user(tx.as_mut(), target).await?;
        ensure_unaffiliated(tx.as_mut(), target).await?;
        if let Some(previous) = tx.find_live_membership(target, family_id).await? {
            stale.push(previous.id);
        }
    }

    if !stale.is_empty() {
        let retired = tx
            .update_membership_status(&stale, MembershipStatus::Inactive)
            .await?;
        debug!(retired, "Retired declined invitations");
    }

    let mut created = Vec::with_capacity(targets.len());
    for &target in &targets {
        let record = MembershipRecord::pending(target, family_id, inviter);
        tx.insert_membership(&record).await?;
        created.push(record);
    }
    tx.commit().await?;

    info!(count = created.len(), "Invitations created");
    deps.dispatch(
        targets
            .into_iter()
            .map(|invitee_id| MembershipEvent::Invited {
                family_id,
                inviter_id: inviter,
                invitee_id,
            })
            .collect(),
    );
    Ok(created)
}
