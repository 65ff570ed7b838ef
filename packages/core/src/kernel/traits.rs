// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Membership rules and cascades are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseFamilyStore, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::{
    CommentId, FamilyId, FamilyResult, MembershipId, PostId, UserId,
};
use crate::domains::content::models::{Comment, ContentKind, ContentStatus, Post, Reaction};
use crate::domains::families::models::Family;
use crate::domains::memberships::events::MembershipEvent;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::domains::users::models::User;

// =============================================================================
// Store Trait (Infrastructure - transactional persistence)
// =============================================================================

/// Entry point to the single consistent data store.
#[async_trait]
pub trait BaseFamilyStore: Send + Sync {
    /// Open a unit of work. Nothing written through it is visible to other
    /// transactions until `commit`; dropping it rolls everything back.
    async fn begin(&self) -> FamilyResult<Box<dyn FamilyTx>>;
}

/// One open transaction.
///
/// Reads that return memberships only ever return non-INACTIVE records.
#[async_trait]
pub trait FamilyTx: Send {
    // -------------------------------------------------------------------------
    // Identity store
    // -------------------------------------------------------------------------

    async fn find_user(&mut self, id: UserId) -> FamilyResult<Option<User>>;

    /// Insert or overwrite a user row.
    async fn save_user(&mut self, user: &User) -> FamilyResult<()>;

    /// Hold write locks on these users until the transaction ends.
    async fn lock_users(&mut self, ids: &[UserId]) -> FamilyResult<()> {
        let _ = ids;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Families
    // -------------------------------------------------------------------------

    async fn find_family(&mut self, id: FamilyId) -> FamilyResult<Option<Family>>;

    async fn find_active_family_by_code(&mut self, code: &str) -> FamilyResult<Option<Family>>;

    async fn find_active_families_owned_by(&mut self, owner: UserId) -> FamilyResult<Vec<Family>>;

    async fn insert_family(&mut self, family: &Family) -> FamilyResult<()>;

    async fn update_family(&mut self, family: &Family) -> FamilyResult<()>;

    // -------------------------------------------------------------------------
    // Membership ledger
    // -------------------------------------------------------------------------

    async fn find_live_membership(
        &mut self,
        user: UserId,
        family: FamilyId,
    ) -> FamilyResult<Option<MembershipRecord>>;

    async fn find_memberships_by_user(&mut self, user: UserId) -> FamilyResult<Vec<MembershipRecord>>;

    async fn find_memberships_by_family(
        &mut self,
        family: FamilyId,
    ) -> FamilyResult<Vec<MembershipRecord>>;

    async fn find_pending_invitations_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> FamilyResult<Vec<MembershipRecord>>;

    /// Fails with `AlreadyAffiliated` if the record would give its user a
    /// second ACTIVE/PENDING_INVITE membership.
    async fn insert_membership(&mut self, record: &MembershipRecord) -> FamilyResult<()>;

    /// Set status on non-INACTIVE records; returns how many changed.
    async fn update_membership_status(
        &mut self,
        ids: &[MembershipId],
        status: MembershipStatus,
    ) -> FamilyResult<u64>;

    // -------------------------------------------------------------------------
    // Content stores
    // -------------------------------------------------------------------------

    async fn find_post(&mut self, id: PostId) -> FamilyResult<Option<Post>>;

    async fn find_comment(&mut self, id: CommentId) -> FamilyResult<Option<Comment>>;

    async fn insert_post(&mut self, post: &Post) -> FamilyResult<()>;

    async fn insert_comment(&mut self, comment: &Comment) -> FamilyResult<()>;

    async fn insert_reaction(&mut self, reaction: &Reaction) -> FamilyResult<()>;

    async fn content_status(
        &mut self,
        kind: ContentKind,
        id: Uuid,
    ) -> FamilyResult<Option<ContentStatus>>;

    async fn find_active_content_by_author(
        &mut self,
        kind: ContentKind,
        author: UserId,
    ) -> FamilyResult<Vec<Uuid>>;

    async fn find_active_content_by_family(
        &mut self,
        kind: ContentKind,
        family: FamilyId,
    ) -> FamilyResult<Vec<Uuid>>;

    /// Flip ACTIVE rows among `ids` to INACTIVE; returns how many changed.
    async fn deactivate_content(&mut self, kind: ContentKind, ids: &[Uuid]) -> FamilyResult<u64>;

    async fn commit(self: Box<Self>) -> FamilyResult<()>;
}

// =============================================================================
// Notification Trait (Infrastructure - fire and forget)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Deliver one event. Errors are logged by the dispatcher and never
    /// reach the operation that produced the event.
    async fn notify(&self, event: &MembershipEvent) -> Result<()>;
}

// =============================================================================
// Invite Code Source Trait (Infrastructure - randomness)
// =============================================================================

pub trait BaseCodeSource: Send + Sync {
    /// Produce one candidate code of `length` characters.
    fn next_code(&self, length: usize) -> String;
}
