use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use super::{ContentKind, ContentStatus};
use crate::common::{CommentId, PostId, ReactionId, UserId};

/// What a like is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ReactionTarget {
    Post(PostId),
    Comment(CommentId),
}

/// A like on a post or a comment.
///
/// Stored in `post_likes` or `comment_likes` depending on the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    pub user_id: UserId,
    pub target: ReactionTarget,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(user_id: UserId, target: ReactionTarget) -> Self {
        Self {
            id: ReactionId::new(),
            user_id,
            target,
            status: ContentStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self.target {
            ReactionTarget::Post(_) => ContentKind::PostLike,
            ReactionTarget::Comment(_) => ContentKind::CommentLike,
        }
    }

    /// Insert into the like table matching the target
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        let query = match self.target {
            ReactionTarget::Post(post_id) => sqlx::query(
                r#"
                INSERT INTO post_likes (id, post_id, user_id, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                "#,
            )
            .bind(self.id)
            .bind(post_id),
            ReactionTarget::Comment(comment_id) => sqlx::query(
                r#"
                INSERT INTO comment_likes (id, comment_id, user_id, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $5)
                "#,
            )
            .bind(self.id)
            .bind(comment_id),
        };

        query
            .bind(self.user_id)
            .bind(self.status)
            .bind(self.created_at)
            .execute(conn)
            .await?;

        Ok(())
    }
}
