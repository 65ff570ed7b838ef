use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use crate::common::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "user_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Blacklisted,
}

/// User record as seen by the family core.
///
/// Credentials and profile data live with the identity store; the core only
/// reads identity and reads/writes `status`.
#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub nickname: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(nickname: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            nickname: nickname.into(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Find user by ID
    pub async fn find_by_id(id: UserId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Insert or update the user row
    pub async fn upsert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, nickname, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE
            SET nickname = EXCLUDED.nickname,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(self.id)
        .bind(&self.nickname)
        .bind(self.status)
        .bind(self.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Row-lock the given users for the rest of the transaction.
    ///
    /// Locks are taken in id order so two transactions inviting overlapping
    /// users cannot deadlock.
    pub async fn lock_for_update(ids: &[UserId], conn: &mut PgConnection) -> Result<()> {
        sqlx::query("SELECT id FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(ids)
            .fetch_all(conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_start_active() {
        let user = User::new("mom");
        assert!(user.is_active());
        assert_eq!(user.nickname, "mom");
    }

    #[test]
    fn blacklisted_users_are_not_active() {
        let mut user = User::new("uncle");
        user.status = UserStatus::Blacklisted;
        assert!(!user.is_active());
    }
}
