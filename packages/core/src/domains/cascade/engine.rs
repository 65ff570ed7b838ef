use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::common::{FamilyError, FamilyId, FamilyResult, MembershipId, UserId};
use crate::domains::content::models::ContentKind;
use crate::domains::families::models::{Family, FamilyStatus};
use crate::domains::memberships::models::MembershipStatus;
use crate::domains::users::models::UserStatus;
use crate::kernel::{FamilyDeps, FamilyTx};

/// What one cascade changed. All zeros/false means the target was already
/// fully deactivated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub reactions: u64,
    pub comments: u64,
    pub posts: u64,
    pub memberships: u64,
    pub user_deactivated: bool,
    pub family_deactivated: bool,
}

impl CascadeReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    fn record(&mut self, kind: ContentKind, changed: u64) {
        match kind {
            ContentKind::CommentLike | ContentKind::PostLike => self.reactions += changed,
            ContentKind::Comment => self.comments += changed,
            ContentKind::Post => self.posts += changed,
        }
    }
}

/// Deactivate everything a user authored, then their memberships, then the
/// user, in one transaction.
///
/// Order is part of the contract:
/// 1. refuse with `FailedToLeave` while the user owns an ACTIVE family
/// 2. reactions (comment likes, then post likes)
/// 3. comments
/// 4. posts
/// 5. every non-INACTIVE membership record, whatever its status
/// 6. the user
///
/// The ownership check runs before any write, so it sees pre-cascade state.
/// Re-running on an already deactivated user writes nothing.
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn cascade_user(user_id: UserId, deps: &FamilyDeps) -> FamilyResult<CascadeReport> {
    let mut tx = deps.store.begin().await?;
    let report = cascade_user_in(tx.as_mut(), user_id, deps.config.cascade_batch_size).await?;
    tx.commit().await?;

    info!(?report, "User cascade committed");
    Ok(report)
}

async fn cascade_user_in(
    tx: &mut dyn FamilyTx,
    user_id: UserId,
    batch_size: usize,
) -> FamilyResult<CascadeReport> {
    let mut user = tx
        .find_user(user_id)
        .await?
        .ok_or_else(|| FamilyError::not_found("user", user_id))?;

    let owned = tx.find_active_families_owned_by(user_id).await?;
    if !owned.is_empty() {
        warn!(families = owned.len(), "User still owns active families; refusing to cascade");
        return Err(FamilyError::FailedToLeave(user_id));
    }

    let mut report = CascadeReport::default();

    for kind in ContentKind::CASCADE_ORDER {
        let ids = tx.find_active_content_by_author(kind, user_id).await?;
        let changed = deactivate_content(tx, kind, &ids, batch_size).await?;
        report.record(kind, changed);
    }

    let memberships: Vec<MembershipId> = tx
        .find_memberships_by_user(user_id)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    report.memberships = deactivate_memberships(tx, &memberships, batch_size).await?;

    if user.status != UserStatus::Inactive {
        user.status = UserStatus::Inactive;
        user.updated_at = Utc::now();
        tx.save_user(&user).await?;
        report.user_deactivated = true;
    }

    Ok(report)
}

/// Deactivate a family and everything hanging off it, in one transaction.
///
/// Order: the family itself, reactions on its posts and comments, its
/// comments, its posts, then its membership records. Member users and other
/// families are not touched. Re-running on a deactivated family writes
/// nothing.
#[instrument(skip_all, fields(family_id = %family_id))]
pub async fn cascade_family(family_id: FamilyId, deps: &FamilyDeps) -> FamilyResult<CascadeReport> {
    let mut tx = deps.store.begin().await?;
    let mut family = tx
        .find_family(family_id)
        .await?
        .ok_or_else(|| FamilyError::not_found("family", family_id))?;

    let report = cascade_family_in(tx.as_mut(), &mut family, deps.config.cascade_batch_size).await?;
    tx.commit().await?;

    info!(?report, "Family cascade committed");
    Ok(report)
}

pub(crate) async fn cascade_family_in(
    tx: &mut dyn FamilyTx,
    family: &mut Family,
    batch_size: usize,
) -> FamilyResult<CascadeReport> {
    let mut report = CascadeReport::default();

    if family.is_active() {
        family.status = FamilyStatus::Inactive;
        family.updated_at = Utc::now();
        tx.update_family(family).await?;
        report.family_deactivated = true;
    }

    for kind in ContentKind::CASCADE_ORDER {
        let ids = tx.find_active_content_by_family(kind, family.id).await?;
        let changed = deactivate_content(tx, kind, &ids, batch_size).await?;
        report.record(kind, changed);
    }

    let memberships: Vec<MembershipId> = tx
        .find_memberships_by_family(family.id)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    report.memberships = deactivate_memberships(tx, &memberships, batch_size).await?;

    Ok(report)
}

async fn deactivate_content(
    tx: &mut dyn FamilyTx,
    kind: ContentKind,
    ids: &[Uuid],
    batch_size: usize,
) -> FamilyResult<u64> {
    let mut changed = 0;
    for chunk in ids.chunks(batch_size.max(1)) {
        changed += tx.deactivate_content(kind, chunk).await?;
    }
    if changed > 0 {
        debug!(?kind, changed, "Deactivated content");
    }
    Ok(changed)
}

async fn deactivate_memberships(
    tx: &mut dyn FamilyTx,
    ids: &[MembershipId],
    batch_size: usize,
) -> FamilyResult<u64> {
    let mut changed = 0;
    for chunk in ids.chunks(batch_size.max(1)) {
        changed += tx
            .update_membership_status(chunk, MembershipStatus::Inactive)
            .await?;
    }
    if changed > 0 {
        debug!(changed, "Deactivated memberships");
    }
    Ok(changed)
}
