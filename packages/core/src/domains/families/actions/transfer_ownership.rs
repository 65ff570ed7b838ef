//! Transfer ownership action - hands the family to another ACTIVE member

use chrono::Utc;
use tracing::{info, instrument};

use crate::common::{FamilyError, FamilyId, FamilyResult, UserId};
use crate::domains::families::models::Family;
use crate::domains::guards::{require_active_family, require_actor, require_owner};
use crate::domains::memberships::events::MembershipEvent;
use crate::kernel::FamilyDeps;

/// Make `new_owner` the owner of `family_id`.
///
/// The previous owner stays an ACTIVE member and may withdraw afterwards.
/// Transferring to the current owner is a no-op.
#[instrument(skip_all, fields(actor = %actor, family_id = %family_id, new_owner = %new_owner))]
pub async fn transfer_ownership(
    actor: UserId,
    family_id: FamilyId,
    new_owner: UserId,
    deps: &FamilyDeps,
) -> FamilyResult<Family> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), actor).await?;
    let mut family = require_active_family(tx.as_mut(), family_id).await?;
    require_owner(&family, actor)?;

    if new_owner == actor {
        return Ok(family);
    }

    let target_is_member = tx
        .find_live_membership(new_owner, family_id)
        .await?
        .is_some_and(|m| m.is_active());
    let target_is_active = tx
        .find_user(new_owner)
        .await?
        .is_some_and(|u| u.is_active());
    if !target_is_member || !target_is_active {
        return Err(FamilyError::TargetNotActiveMember(new_owner));
    }

    family.owner_id = new_owner;
    family.updated_at = Utc::now();
    tx.update_family(&family).await?;
    tx.commit().await?;

    info!("Ownership transferred");
    deps.dispatch(vec![MembershipEvent::OwnershipTransferred {
        family_id,
        from: actor,
        to: new_owner,
    }]);
    Ok(family)
}
