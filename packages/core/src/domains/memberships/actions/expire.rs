//! Expire action - turns stale invitations into DEACCEPTED

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, instrument};

use crate::common::{FamilyError, FamilyResult, MembershipId};
use crate::domains::memberships::models::MembershipStatus;
use crate::kernel::FamilyDeps;

/// Move every PENDING_INVITE created more than `invitation_ttl_days`
/// before `now` to DEACCEPTED. Returns how many changed.
///
/// Expiry is silent: no events are dispatched.
#[instrument(skip_all, fields(now = %now))]
pub async fn expire_invitations(now: DateTime<Utc>, deps: &FamilyDeps) -> FamilyResult<u64> {
    let ttl_days = deps.config.invitation_ttl_days;
    if ttl_days <= 0 {
        return Err(FamilyError::validation("invitation TTL must be positive"));
    }
    let cutoff = TimeDelta::try_days(ttl_days)
        .and_then(|ttl| now.checked_sub_signed(ttl))
        .ok_or_else(|| {
            FamilyError::validation(format!("invitation TTL of {} days is out of range", ttl_days))
        })?;

    let mut tx = deps.store.begin().await?;
    let ids: Vec<MembershipId> = tx
        .find_pending_invitations_before(cutoff)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();

    let mut expired = 0;
    for chunk in ids.chunks(deps.config.cascade_batch_size.max(1)) {
        expired += tx
            .update_membership_status(chunk, MembershipStatus::Deaccepted)
            .await?;
    }
    tx.commit().await?;

    info!(expired, %cutoff, "Expired pending invitations");
    Ok(expired)
}
