//! Postgres store.
//!
//! Consistency rules that concurrent writers could race on are enforced by
//! partial unique indexes (see the migrations), so a violating insert fails
//! inside the transaction instead of relying on an earlier read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::traits::{BaseFamilyStore, FamilyTx};
use crate::common::{CommentId, FamilyError, FamilyId, FamilyResult, MembershipId, PostId, UserId};
use crate::domains::content::models::{Comment, ContentKind, ContentStatus, Post, Reaction};
use crate::domains::families::models::Family;
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::domains::users::models::User;

/// Index guaranteeing one ACTIVE/PENDING_INVITE membership per user.
const AFFILIATION_INDEX: &str = "memberships_one_affiliation";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseFamilyStore for PgStore {
    async fn begin(&self) -> FamilyResult<Box<dyn FamilyTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgFamilyTx { tx }))
    }
}

struct PgFamilyTx {
    tx: Transaction<'static, Postgres>,
}

fn storage(err: anyhow::Error) -> FamilyError {
    FamilyError::Storage(err)
}

#[async_trait]
impl FamilyTx for PgFamilyTx {
    async fn find_user(&mut self, id: UserId) -> FamilyResult<Option<User>> {
        User::find_by_id(id, &mut self.tx).await.map_err(storage)
    }

    async fn save_user(&mut self, user: &User) -> FamilyResult<()> {
        user.upsert(&mut self.tx).await.map_err(storage)
    }

    async fn lock_users(&mut self, ids: &[UserId]) -> FamilyResult<()> {
        User::lock_for_update(ids, &mut self.tx).await.map_err(storage)
    }

    async fn find_family(&mut self, id: FamilyId) -> FamilyResult<Option<Family>> {
        Family::find_by_id(id, &mut self.tx).await.map_err(storage)
    }

    async fn find_active_family_by_code(&mut self, code: &str) -> FamilyResult<Option<Family>> {
        Family::find_active_by_code(code, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_active_families_owned_by(&mut self, owner: UserId) -> FamilyResult<Vec<Family>> {
        Family::find_active_by_owner(owner, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn insert_family(&mut self, family: &Family) -> FamilyResult<()> {
        family.insert(&mut self.tx).await.map_err(storage)
    }

    async fn update_family(&mut self, family: &Family) -> FamilyResult<()> {
        family.update(&mut self.tx).await.map_err(storage)
    }

    async fn find_live_membership(
        &mut self,
        user: UserId,
        family: FamilyId,
    ) -> FamilyResult<Option<MembershipRecord>> {
        MembershipRecord::find_live(user, family, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_memberships_by_user(&mut self, user: UserId) -> FamilyResult<Vec<MembershipRecord>> {
        MembershipRecord::find_live_by_user(user, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_memberships_by_family(
        &mut self,
        family: FamilyId,
    ) -> FamilyResult<Vec<MembershipRecord>> {
        MembershipRecord::find_live_by_family(family, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_pending_invitations_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> FamilyResult<Vec<MembershipRecord>> {
        MembershipRecord::find_pending_before(cutoff, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn insert_membership(&mut self, record: &MembershipRecord) -> FamilyResult<()> {
        match record.insert(&mut self.tx).await {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(db))
                if db.is_unique_violation() && db.constraint() == Some(AFFILIATION_INDEX) =>
            {
                Err(FamilyError::AlreadyAffiliated(record.user_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_membership_status(
        &mut self,
        ids: &[MembershipId],
        status: MembershipStatus,
    ) -> FamilyResult<u64> {
        MembershipRecord::update_status(ids, status, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_post(&mut self, id: PostId) -> FamilyResult<Option<Post>> {
        Post::find_by_id(id, &mut self.tx).await.map_err(storage)
    }

    async fn find_comment(&mut self, id: CommentId) -> FamilyResult<Option<Comment>> {
        Comment::find_by_id(id, &mut self.tx).await.map_err(storage)
    }

    async fn insert_post(&mut self, post: &Post) -> FamilyResult<()> {
        post.insert(&mut self.tx).await.map_err(storage)
    }

    async fn insert_comment(&mut self, comment: &Comment) -> FamilyResult<()> {
        comment.insert(&mut self.tx).await.map_err(storage)
    }

    async fn insert_reaction(&mut self, reaction: &Reaction) -> FamilyResult<()> {
        reaction.insert(&mut self.tx).await.map_err(storage)
    }

    async fn content_status(
        &mut self,
        kind: ContentKind,
        id: Uuid,
    ) -> FamilyResult<Option<ContentStatus>> {
        kind.status_of(id, &mut self.tx).await.map_err(storage)
    }

    async fn find_active_content_by_author(
        &mut self,
        kind: ContentKind,
        author: UserId,
    ) -> FamilyResult<Vec<Uuid>> {
        kind.find_active_by_author(author, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn find_active_content_by_family(
        &mut self,
        kind: ContentKind,
        family: FamilyId,
    ) -> FamilyResult<Vec<Uuid>> {
        kind.find_active_by_family(family, &mut self.tx)
            .await
            .map_err(storage)
    }

    async fn deactivate_content(&mut self, kind: ContentKind, ids: &[Uuid]) -> FamilyResult<u64> {
        kind.deactivate(ids, &mut self.tx).await.map_err(storage)
    }

    async fn commit(self: Box<Self>) -> FamilyResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
