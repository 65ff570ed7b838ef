pub mod comment;
pub mod post;
pub mod reaction;

pub use comment::Comment;
pub use post::Post;
pub use reaction::{Reaction, ReactionTarget};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::common::{FamilyId, UserId};

/// Status shared by posts, comments and likes. The core only ever flips it
/// from ACTIVE to INACTIVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Active,
    Inactive,
}

/// The four content tables a cascade walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    CommentLike,
    PostLike,
    Comment,
    Post,
}

impl ContentKind {
    /// Leaves before parents: likes, then comments, then posts.
    pub const CASCADE_ORDER: [ContentKind; 4] = [
        ContentKind::CommentLike,
        ContentKind::PostLike,
        ContentKind::Comment,
        ContentKind::Post,
    ];

    pub fn is_reaction(self) -> bool {
        matches!(self, Self::CommentLike | Self::PostLike)
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::CommentLike => "comment_likes",
            Self::PostLike => "post_likes",
            Self::Comment => "comments",
            Self::Post => "posts",
        }
    }

    fn author_column(self) -> &'static str {
        match self {
            Self::CommentLike | Self::PostLike => "user_id",
            Self::Comment | Self::Post => "writer_id",
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Ids of ACTIVE rows authored by `author`
    pub async fn find_active_by_author(
        self,
        author: UserId,
        conn: &mut PgConnection,
    ) -> Result<Vec<Uuid>> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = $1 AND status = 'active' ORDER BY id",
            self.table(),
            self.author_column()
        );

        sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(author)
            .fetch_all(conn)
            .await
            .map_err(Into::into)
    }

    /// Ids of ACTIVE rows that hang off a post of `family`
    pub async fn find_active_by_family(
        self,
        family: FamilyId,
        conn: &mut PgConnection,
    ) -> Result<Vec<Uuid>> {
        let sql = match self {
            Self::Post => {
                "SELECT id FROM posts WHERE family_id = $1 AND status = 'active' ORDER BY id"
            }
            Self::Comment => {
                r#"
                SELECT c.id FROM comments c
                JOIN posts p ON p.id = c.post_id
                WHERE p.family_id = $1 AND c.status = 'active'
                ORDER BY c.id
                "#
            }
            Self::PostLike => {
                r#"
                SELECT l.id FROM post_likes l
                JOIN posts p ON p.id = l.post_id
                WHERE p.family_id = $1 AND l.status = 'active'
                ORDER BY l.id
                "#
            }
            Self::CommentLike => {
                r#"
                SELECT l.id FROM comment_likes l
                JOIN comments c ON c.id = l.comment_id
                JOIN posts p ON p.id = c.post_id
                WHERE p.family_id = $1 AND l.status = 'active'
                ORDER BY l.id
                "#
            }
        };

        sqlx::query_scalar::<_, Uuid>(sql)
            .bind(family)
            .fetch_all(conn)
            .await
            .map_err(Into::into)
    }

    /// Flip ACTIVE rows among `ids` to INACTIVE; returns how many changed
    pub async fn deactivate(self, ids: &[Uuid], conn: &mut PgConnection) -> Result<u64> {
        let sql = format!(
            "UPDATE {} SET status = 'inactive', updated_at = NOW() WHERE id = ANY($1) AND status = 'active'",
            self.table()
        );

        let result = sqlx::query(&sql).bind(ids).execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// Current status of one row
    pub async fn status_of(self, id: Uuid, conn: &mut PgConnection) -> Result<Option<ContentStatus>> {
        let sql = format!("SELECT status FROM {} WHERE id = $1", self.table());

        sqlx::query_scalar::<_, ContentStatus>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }
}
