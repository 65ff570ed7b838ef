//! Join with code action - enter a family directly through its invite code

use tracing::{info, instrument};

use crate::common::{FamilyResult, UserId};
use crate::domains::families::invite_code::resolve_in;
use crate::domains::guards::{ensure_unaffiliated, require_actor};
use crate::domains::memberships::events::MembershipEvent;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::kernel::FamilyDeps;

/// Add `user` as an ACTIVE member of the family holding `code`.
///
/// Fails with `AlreadyAffiliated` if the user is ACTIVE or has a pending
/// invitation anywhere, including in this family.
#[instrument(skip_all, fields(user = %user))]
pub async fn join_with_code(
    user: UserId,
    code: &str,
    deps: &FamilyDeps,
) -> FamilyResult<MembershipRecord> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), user).await?;
    let family = resolve_in(tx.as_mut(), code).await?;

    tx.lock_users(&[user]).await?;
    ensure_unaffiliated(tx.as_mut(), user).await?;

    // A stale rejected invitation would otherwise block the insert.
    if let Some(old) = tx.find_live_membership(user, family.id).await? {
        tx.update_membership_status(&[old.id], MembershipStatus::Inactive)
            .await?;
    }

    let record = MembershipRecord::active(user, family.id);
    tx.insert_membership(&record).await?;
    tx.commit().await?;

    info!(family_id = %family.id, "Joined family with invite code");
    deps.dispatch(vec![MembershipEvent::Joined {
        family_id: family.id,
        user_id: user,
    }]);
    Ok(record)
}
