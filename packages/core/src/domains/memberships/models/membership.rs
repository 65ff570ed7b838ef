use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use crate::common::{FamilyError, FamilyId, FamilyResult, MembershipId, UserId};

/// Lifecycle of one user's link to one family.
///
/// ```text
/// PENDING_INVITE --accept--> ACTIVE
/// PENDING_INVITE --reject/expire--> DEACCEPTED
/// ACTIVE --withdraw/expel/account deleted--> INACTIVE
/// any non-INACTIVE --cascade--> INACTIVE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    PendingInvite,
    Active,
    Deaccepted,
    Inactive,
}

impl MembershipStatus {
    /// ACTIVE and PENDING_INVITE both tie a user to a family; a user holds at
    /// most one such record across all families.
    pub fn is_affiliated(self) -> bool {
        matches!(self, Self::PendingInvite | Self::Active)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use MembershipStatus::*;
        matches!(
            (self, next),
            (PendingInvite, Active)
                | (PendingInvite, Deaccepted)
                | (PendingInvite, Inactive)
                | (Active, Inactive)
                | (Deaccepted, Inactive)
        )
    }
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: MembershipId,
    pub user_id: UserId,
    pub family_id: FamilyId,
    /// None for the owner's own enrollment and code joins.
    pub inviter_id: Option<UserId>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MembershipRecord {
    pub fn pending(user_id: UserId, family_id: FamilyId, inviter_id: UserId) -> Self {
        Self::with_status(user_id, family_id, Some(inviter_id), MembershipStatus::PendingInvite)
    }

    pub fn active(user_id: UserId, family_id: FamilyId) -> Self {
        Self::with_status(user_id, family_id, None, MembershipStatus::Active)
    }

    fn with_status(
        user_id: UserId,
        family_id: FamilyId,
        inviter_id: Option<UserId>,
        status: MembershipStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: MembershipId::new(),
            user_id,
            family_id,
            inviter_id,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    pub fn is_pending(&self) -> bool {
        self.status == MembershipStatus::PendingInvite
    }

    /// Move to `next`, rejecting anything outside the lifecycle diagram.
    pub fn transition(&mut self, next: MembershipStatus) -> FamilyResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(FamilyError::validation(format!(
                "membership {} cannot move from {:?} to {:?}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// The non-INACTIVE record for a (user, family) pair, if any
    pub async fn find_live(
        user_id: UserId,
        family_id: FamilyId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM memberships
            WHERE user_id = $1 AND family_id = $2 AND status <> 'inactive'
            "#,
        )
        .bind(user_id)
        .bind(family_id)
        .fetch_optional(conn)
        .await
        .map_err(Into::into)
    }

    /// All non-INACTIVE records of a user, oldest first
    pub async fn find_live_by_user(user_id: UserId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM memberships
            WHERE user_id = $1 AND status <> 'inactive'
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(Into::into)
    }

    /// All non-INACTIVE records of a family, oldest first
    pub async fn find_live_by_family(
        family_id: FamilyId,
        conn: &mut PgConnection,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM memberships
            WHERE family_id = $1 AND status <> 'inactive'
            ORDER BY created_at, id
            "#,
        )
        .bind(family_id)
        .fetch_all(conn)
        .await
        .map_err(Into::into)
    }

    /// Pending invitations created before `cutoff`
    pub async fn find_pending_before(
        cutoff: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM memberships
            WHERE status = 'pending_invite' AND created_at < $1
            ORDER BY created_at, id
            "#,
        )
        .bind(cutoff)
        .fetch_all(conn)
        .await
        .map_err(Into::into)
    }

    /// Insert new record
    ///
    /// Fails with a unique violation on `memberships_one_affiliation` when the
    /// user is already ACTIVE or PENDING somewhere.
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO memberships (id, user_id, family_id, inviter_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.family_id)
        .bind(self.inviter_id)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Set status on the given records, skipping ones already INACTIVE
    pub async fn update_status(
        ids: &[MembershipId],
        status: MembershipStatus,
        conn: &mut PgConnection,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET status = $2, updated_at = NOW()
            WHERE id = ANY($1) AND status <> 'inactive'
            "#,
        )
        .bind(ids)
        .bind(status)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
