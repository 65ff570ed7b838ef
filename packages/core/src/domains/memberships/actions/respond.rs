//! Respond actions - accept or reject a pending invitation

use tracing::{info, instrument};

use crate::common::{FamilyError, FamilyId, FamilyResult, UserId};
use crate::domains::guards::require_actor;
use crate::domains::memberships::events::MembershipEvent;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::kernel::{FamilyDeps, FamilyTx};

/// PENDING_INVITE → ACTIVE.
#[instrument(skip_all, fields(user = %user, family_id = %family_id))]
pub async fn accept(
    user: UserId,
    family_id: FamilyId,
    deps: &FamilyDeps,
) -> FamilyResult<MembershipRecord> {
    let record = respond(user, family_id, MembershipStatus::Active, deps).await?;

    info!("Invitation accepted");
    deps.dispatch(vec![MembershipEvent::InvitationAccepted {
        family_id,
        user_id: user,
    }]);
    Ok(record)
}

/// PENDING_INVITE → DEACCEPTED.
#[instrument(skip_all, fields(user = %user, family_id = %family_id))]
pub async fn reject(
    user: UserId,
    family_id: FamilyId,
    deps: &FamilyDeps,
) -> FamilyResult<MembershipRecord> {
    let record = respond(user, family_id, MembershipStatus::Deaccepted, deps).await?;

    info!("Invitation rejected");
    deps.dispatch(vec![MembershipEvent::InvitationRejected {
        family_id,
        user_id: user,
    }]);
    Ok(record)
}

async fn respond(
    user: UserId,
    family_id: FamilyId,
    next: MembershipStatus,
    deps: &FamilyDeps,
) -> FamilyResult<MembershipRecord> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), user).await?;

    let mut record = pending_invitation(tx.as_mut(), user, family_id).await?;
    record.transition(next)?;
    tx.update_membership_status(&[record.id], next).await?;
    tx.commit().await?;

    Ok(record)
}

async fn pending_invitation(
    tx: &mut dyn FamilyTx,
    user: UserId,
    family: FamilyId,
) -> FamilyResult<MembershipRecord> {
    match tx.find_live_membership(user, family).await? {
        Some(record) if record.is_pending() => Ok(record),
        _ => Err(FamilyError::NoSuchInvitation { user, family }),
    }
}
