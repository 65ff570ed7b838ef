//! In-process store.
//!
//! Every transaction takes the single store lock for its whole lifetime, works
//! on a private copy of the state and swaps it in on commit. Transactions are
//! therefore serializable and a dropped transaction leaves no trace.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::traits::{BaseFamilyStore, FamilyTx};
use crate::common::{
    CommentId, FamilyError, FamilyId, FamilyResult, MembershipId, PostId, ReactionId, UserId,
};
use crate::domains::content::models::{
    Comment, ContentKind, ContentStatus, Post, Reaction, ReactionTarget,
};
use crate::domains::families::models::{Family, FamilyStatus};
use crate::domains::memberships::models::{MembershipRecord, MembershipStatus};
use crate::domains::users::models::{User, UserStatus};

/// A committed transition to INACTIVE, in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    Content(ContentKind, Uuid),
    Membership(MembershipId),
    Family(FamilyId),
    User(UserId),
}

/// Write paths that can be made to fail once, for rollback tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    UserWrite,
    FamilyWrite,
    MembershipWrite,
    ContentWrite,
}

#[derive(Debug, Default, Clone)]
struct MemoryState {
    users: HashMap<UserId, User>,
    families: HashMap<FamilyId, Family>,
    memberships: HashMap<MembershipId, MembershipRecord>,
    posts: HashMap<PostId, Post>,
    comments: HashMap<CommentId, Comment>,
    reactions: HashMap<ReactionId, Reaction>,
    journal: Vec<Deactivation>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fault: Arc<StdMutex<Option<FaultPoint>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write through `point` fail with a storage error.
    pub fn fail_next(&self, point: FaultPoint) {
        *self.fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    /// Every committed deactivation so far, oldest first.
    pub async fn journal(&self) -> Vec<Deactivation> {
        self.state.lock().await.journal.clone()
    }

    /// All membership records of a user, INACTIVE ones included.
    pub async fn membership_history(&self, user: UserId) -> Vec<MembershipRecord> {
        let state = self.state.lock().await;
        let mut records: Vec<_> = state
            .memberships
            .values()
            .filter(|m| m.user_id == user)
            .cloned()
            .collect();
        sort_memberships(&mut records);
        records
    }
}

#[async_trait]
impl BaseFamilyStore for MemoryStore {
    async fn begin(&self) -> FamilyResult<Box<dyn FamilyTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            fault: self.fault.clone(),
        }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fault: Arc<StdMutex<Option<FaultPoint>>>,
}

impl MemoryTx {
    fn trip(&self, point: FaultPoint) -> FamilyResult<()> {
        let mut armed = self.fault.lock().unwrap_or_else(PoisonError::into_inner);
        if *armed == Some(point) {
            *armed = None;
            return Err(FamilyError::Storage(anyhow!("injected {:?} failure", point)));
        }
        Ok(())
    }

    fn post_family(&self, post: PostId) -> Option<FamilyId> {
        self.working.posts.get(&post).map(|p| p.family_id)
    }

    fn comment_family(&self, comment: CommentId) -> Option<FamilyId> {
        self.working
            .comments
            .get(&comment)
            .and_then(|c| self.post_family(c.post_id))
    }

    fn reaction_family(&self, reaction: &Reaction) -> Option<FamilyId> {
        match reaction.target {
            ReactionTarget::Post(post) => self.post_family(post),
            ReactionTarget::Comment(comment) => self.comment_family(comment),
        }
    }

    fn live_memberships<F>(&self, filter: F) -> Vec<MembershipRecord>
    where
        F: Fn(&MembershipRecord) -> bool,
    {
        let mut records: Vec<_> = self
            .working
            .memberships
            .values()
            .filter(|m| m.status != MembershipStatus::Inactive && filter(m))
            .cloned()
            .collect();
        sort_memberships(&mut records);
        records
    }
}

fn sort_memberships(records: &mut [MembershipRecord]) {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

fn sorted(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids
}

#[async_trait]
impl FamilyTx for MemoryTx {
    async fn find_user(&mut self, id: UserId) -> FamilyResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn save_user(&mut self, user: &User) -> FamilyResult<()> {
        self.trip(FaultPoint::UserWrite)?;
        let was_inactive = self
            .working
            .users
            .get(&user.id)
            .map(|u| u.status == UserStatus::Inactive)
            .unwrap_or(false);
        if user.status == UserStatus::Inactive && !was_inactive {
            self.working.journal.push(Deactivation::User(user.id));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_family(&mut self, id: FamilyId) -> FamilyResult<Option<Family>> {
        Ok(self.working.families.get(&id).cloned())
    }

    async fn find_active_family_by_code(&mut self, code: &str) -> FamilyResult<Option<Family>> {
        Ok(self
            .working
            .families
            .values()
            .find(|f| f.is_active() && f.invite_code == code)
            .cloned())
    }

    async fn find_active_families_owned_by(&mut self, owner: UserId) -> FamilyResult<Vec<Family>> {
        let mut families: Vec<_> = self
            .working
            .families
            .values()
            .filter(|f| f.is_active() && f.owner_id == owner)
            .cloned()
            .collect();
        families.sort_by_key(|f| f.created_at);
        Ok(families)
    }

    async fn insert_family(&mut self, family: &Family) -> FamilyResult<()> {
        self.trip(FaultPoint::FamilyWrite)?;
        let code_taken = self
            .working
            .families
            .values()
            .any(|f| f.is_active() && f.invite_code == family.invite_code);
        if code_taken {
            return Err(FamilyError::Storage(anyhow!(
                "invite code {} is already used by an active family",
                family.invite_code
            )));
        }
        self.working.families.insert(family.id, family.clone());
        Ok(())
    }

    async fn update_family(&mut self, family: &Family) -> FamilyResult<()> {
        self.trip(FaultPoint::FamilyWrite)?;
        let Some(existing) = self.working.families.get(&family.id) else {
            return Err(FamilyError::not_found("family", family.id));
        };
        if existing.is_active() && family.status == FamilyStatus::Inactive {
            self.working.journal.push(Deactivation::Family(family.id));
        }
        let mut updated = family.clone();
        updated.invite_code = existing.invite_code.clone();
        updated.updated_at = Utc::now();
        self.working.families.insert(family.id, updated);
        Ok(())
    }

    async fn find_live_membership(
        &mut self,
        user: UserId,
        family: FamilyId,
    ) -> FamilyResult<Option<MembershipRecord>> {
        Ok(self
            .live_memberships(|m| m.user_id == user && m.family_id == family)
            .into_iter()
            .next())
    }

    async fn find_memberships_by_user(&mut self, user: UserId) -> FamilyResult<Vec<MembershipRecord>> {
        Ok(self.live_memberships(|m| m.user_id == user))
    }

    async fn find_memberships_by_family(
        &mut self,
        family: FamilyId,
    ) -> FamilyResult<Vec<MembershipRecord>> {
        Ok(self.live_memberships(|m| m.family_id == family))
    }

    async fn find_pending_invitations_before(
        &mut self,
        cutoff: DateTime<Utc>,
    ) -> FamilyResult<Vec<MembershipRecord>> {
        Ok(self.live_memberships(|m| m.is_pending() && m.created_at < cutoff))
    }

    async fn insert_membership(&mut self, record: &MembershipRecord) -> FamilyResult<()> {
        self.trip(FaultPoint::MembershipWrite)?;
        let existing = self.live_memberships(|m| m.user_id == record.user_id);

        if record.status.is_affiliated() && existing.iter().any(|m| m.status.is_affiliated()) {
            return Err(FamilyError::AlreadyAffiliated(record.user_id));
        }
        if record.status != MembershipStatus::Inactive
            && existing.iter().any(|m| m.family_id == record.family_id)
        {
            return Err(FamilyError::Storage(anyhow!(
                "user {} already has a live membership in family {}",
                record.user_id,
                record.family_id
            )));
        }

        self.working.memberships.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_membership_status(
        &mut self,
        ids: &[MembershipId],
        status: MembershipStatus,
    ) -> FamilyResult<u64> {
        self.trip(FaultPoint::MembershipWrite)?;
        let now = Utc::now();
        let mut changed = 0;

        for id in ids {
            let Some(record) = self.working.memberships.get_mut(id) else {
                continue;
            };
            if record.status == MembershipStatus::Inactive {
                continue;
            }
            record.status = status;
            record.updated_at = now;
            changed += 1;
            if status == MembershipStatus::Inactive {
                self.working.journal.push(Deactivation::Membership(*id));
            }
        }

        Ok(changed)
    }

    async fn find_post(&mut self, id: PostId) -> FamilyResult<Option<Post>> {
        Ok(self.working.posts.get(&id).cloned())
    }

    async fn find_comment(&mut self, id: CommentId) -> FamilyResult<Option<Comment>> {
        Ok(self.working.comments.get(&id).cloned())
    }

    async fn insert_post(&mut self, post: &Post) -> FamilyResult<()> {
        self.trip(FaultPoint::ContentWrite)?;
        self.working.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn insert_comment(&mut self, comment: &Comment) -> FamilyResult<()> {
        self.trip(FaultPoint::ContentWrite)?;
        self.working.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn insert_reaction(&mut self, reaction: &Reaction) -> FamilyResult<()> {
        self.trip(FaultPoint::ContentWrite)?;
        self.working.reactions.insert(reaction.id, reaction.clone());
        Ok(())
    }

    async fn content_status(
        &mut self,
        kind: ContentKind,
        id: Uuid,
    ) -> FamilyResult<Option<ContentStatus>> {
        let status = match kind {
            ContentKind::Post => self.working.posts.get(&PostId::from_uuid(id)).map(|p| p.status),
            ContentKind::Comment => self
                .working
                .comments
                .get(&CommentId::from_uuid(id))
                .map(|c| c.status),
            ContentKind::PostLike | ContentKind::CommentLike => self
                .working
                .reactions
                .get(&ReactionId::from_uuid(id))
                .filter(|r| r.kind() == kind)
                .map(|r| r.status),
        };
        Ok(status)
    }

    async fn find_active_content_by_author(
        &mut self,
        kind: ContentKind,
        author: UserId,
    ) -> FamilyResult<Vec<Uuid>> {
        let state = &self.working;
        let ids = match kind {
            ContentKind::Post => state
                .posts
                .values()
                .filter(|p| p.is_active() && p.writer_id == Some(author))
                .map(|p| p.id.into_uuid())
                .collect(),
            ContentKind::Comment => state
                .comments
                .values()
                .filter(|c| c.is_active() && c.writer_id == Some(author))
                .map(|c| c.id.into_uuid())
                .collect(),
            ContentKind::PostLike | ContentKind::CommentLike => state
                .reactions
                .values()
                .filter(|r| {
                    r.kind() == kind && r.status == ContentStatus::Active && r.user_id == author
                })
                .map(|r| r.id.into_uuid())
                .collect(),
        };
        Ok(sorted(ids))
    }

    async fn find_active_content_by_family(
        &mut self,
        kind: ContentKind,
        family: FamilyId,
    ) -> FamilyResult<Vec<Uuid>> {
        let ids = match kind {
            ContentKind::Post => self
                .working
                .posts
                .values()
                .filter(|p| p.is_active() && p.family_id == family)
                .map(|p| p.id.into_uuid())
                .collect(),
            ContentKind::Comment => self
                .working
                .comments
                .values()
                .filter(|c| c.is_active() && self.post_family(c.post_id) == Some(family))
                .map(|c| c.id.into_uuid())
                .collect(),
            ContentKind::PostLike | ContentKind::CommentLike => self
                .working
                .reactions
                .values()
                .filter(|r| {
                    r.kind() == kind
                        && r.status == ContentStatus::Active
                        && self.reaction_family(r) == Some(family)
                })
                .map(|r| r.id.into_uuid())
                .collect(),
        };
        Ok(sorted(ids))
    }

    async fn deactivate_content(&mut self, kind: ContentKind, ids: &[Uuid]) -> FamilyResult<u64> {
        self.trip(FaultPoint::ContentWrite)?;
        let now = Utc::now();
        let mut changed = 0;

        for id in ids {
            let flipped = match kind {
                ContentKind::Post => self
                    .working
                    .posts
                    .get_mut(&PostId::from_uuid(*id))
                    .filter(|p| p.is_active())
                    .map(|p| {
                        p.status = ContentStatus::Inactive;
                        p.updated_at = now;
                    })
                    .is_some(),
                ContentKind::Comment => self
                    .working
                    .comments
                    .get_mut(&CommentId::from_uuid(*id))
                    .filter(|c| c.is_active())
                    .map(|c| {
                        c.status = ContentStatus::Inactive;
                        c.updated_at = now;
                    })
                    .is_some(),
                ContentKind::PostLike | ContentKind::CommentLike => self
                    .working
                    .reactions
                    .get_mut(&ReactionId::from_uuid(*id))
                    .filter(|r| r.kind() == kind && r.status == ContentStatus::Active)
                    .map(|r| r.status = ContentStatus::Inactive)
                    .is_some(),
            };

            if flipped {
                changed += 1;
                self.working.journal.push(Deactivation::Content(kind, *id));
            }
        }

        Ok(changed)
    }

    async fn commit(self: Box<Self>) -> FamilyResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}
