//! Precondition checks shared by the family operations.
//!
//! Every check reads through the caller's transaction so that what is checked
//! is exactly what the later writes build on.

use crate::common::{FamilyError, FamilyId, FamilyResult, UserId};
use crate::domains::families::models::Family;
use crate::domains::memberships::models::MembershipRecord;
use crate::domains::users::models::User;
use crate::kernel::FamilyTx;

/// The acting user must exist and be ACTIVE.
pub async fn require_actor(tx: &mut dyn FamilyTx, actor: UserId) -> FamilyResult<User> {
    match tx.find_user(actor).await? {
        Some(user) if user.is_active() => Ok(user),
        Some(_) => Err(FamilyError::unauthorized(format!("user {} is not active", actor))),
        None => Err(FamilyError::not_found("user", actor)),
    }
}

/// A user being acted upon must exist and be ACTIVE.
pub async fn require_target_user(tx: &mut dyn FamilyTx, user: UserId) -> FamilyResult<User> {
    match tx.find_user(user).await? {
        Some(found) if found.is_active() => Ok(found),
        _ => Err(FamilyError::not_found("user", user)),
    }
}

/// Unknown and INACTIVE families both read as missing.
pub async fn require_active_family(
    tx: &mut dyn FamilyTx,
    family: FamilyId,
) -> FamilyResult<Family> {
    match tx.find_family(family).await? {
        Some(found) if found.is_active() => Ok(found),
        _ => Err(FamilyError::not_found("family", family)),
    }
}

pub async fn require_active_member(
    tx: &mut dyn FamilyTx,
    user: UserId,
    family: FamilyId,
) -> FamilyResult<MembershipRecord> {
    match tx.find_live_membership(user, family).await? {
        Some(record) if record.is_active() => Ok(record),
        _ => Err(FamilyError::unauthorized(format!(
            "user {} is not an active member of family {}",
            user, family
        ))),
    }
}

pub fn require_owner(family: &Family, actor: UserId) -> FamilyResult<()> {
    if family.is_owner(actor) {
        Ok(())
    } else {
        Err(FamilyError::unauthorized(format!(
            "only the owner of family {} may do this",
            family.id
        )))
    }
}

/// Fails with `AlreadyAffiliated` if the user is ACTIVE or PENDING anywhere.
pub async fn ensure_unaffiliated(tx: &mut dyn FamilyTx, user: UserId) -> FamilyResult<()> {
    let memberships = tx.find_memberships_by_user(user).await?;
    if memberships.iter().any(|m| m.status.is_affiliated()) {
        return Err(FamilyError::AlreadyAffiliated(user));
    }
    Ok(())
}
