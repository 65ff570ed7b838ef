use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

use super::ContentStatus;
use crate::common::{CommentId, PostId, UserId};

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub writer_id: Option<UserId>,
    pub body: String,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: PostId, writer_id: UserId, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CommentId::new(),
            post_id,
            writer_id: Some(writer_id),
            body: body.into(),
            status: ContentStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ContentStatus::Active
    }

    /// Find comment by ID
    pub async fn find_by_id(id: CommentId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Insert new comment
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, writer_id, body, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.post_id)
        .bind(self.writer_id)
        .bind(&self.body)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}
