//! Publish actions - ACTIVE members write posts, comments and likes

use tracing::{debug, instrument};

use crate::common::{CommentId, FamilyError, FamilyId, FamilyResult, PostId, UserId};
use crate::domains::content::models::{Comment, Post, Reaction, ReactionTarget};
use crate::domains::guards::{require_active_family, require_active_member, require_actor};
use crate::kernel::{FamilyDeps, FamilyTx};

fn require_body(body: &str) -> FamilyResult<&str> {
    let body = body.trim();
    if body.is_empty() {
        return Err(FamilyError::validation("content must not be empty"));
    }
    Ok(body)
}

/// The author must be an ACTIVE user and ACTIVE member of an ACTIVE family.
async fn require_author(
    tx: &mut dyn FamilyTx,
    author: UserId,
    family_id: FamilyId,
) -> FamilyResult<()> {
    require_actor(tx, author).await?;
    require_active_family(tx, family_id).await?;
    require_active_member(tx, author, family_id).await?;
    Ok(())
}

async fn require_post(tx: &mut dyn FamilyTx, post_id: PostId) -> FamilyResult<Post> {
    match tx.find_post(post_id).await? {
        Some(post) if post.is_active() => Ok(post),
        _ => Err(FamilyError::not_found("post", post_id)),
    }
}

async fn require_comment(tx: &mut dyn FamilyTx, comment_id: CommentId) -> FamilyResult<Comment> {
    match tx.find_comment(comment_id).await? {
        Some(comment) if comment.is_active() => Ok(comment),
        _ => Err(FamilyError::not_found("comment", comment_id)),
    }
}

#[instrument(skip_all, fields(writer = %writer, family_id = %family_id))]
pub async fn publish_post(
    writer: UserId,
    family_id: FamilyId,
    body: &str,
    deps: &FamilyDeps,
) -> FamilyResult<Post> {
    let body = require_body(body)?;

    let mut tx = deps.store.begin().await?;
    require_author(tx.as_mut(), writer, family_id).await?;

    let post = Post::new(family_id, writer, body);
    tx.insert_post(&post).await?;
    tx.commit().await?;

    debug!(post_id = %post.id, "Post published");
    Ok(post)
}

#[instrument(skip_all, fields(writer = %writer, post_id = %post_id))]
pub async fn add_comment(
    writer: UserId,
    post_id: PostId,
    body: &str,
    deps: &FamilyDeps,
) -> FamilyResult<Comment> {
    let body = require_body(body)?;

    let mut tx = deps.store.begin().await?;
    let post = require_post(tx.as_mut(), post_id).await?;
    require_author(tx.as_mut(), writer, post.family_id).await?;

    let comment = Comment::new(post_id, writer, body);
    tx.insert_comment(&comment).await?;
    tx.commit().await?;

    debug!(comment_id = %comment.id, "Comment added");
    Ok(comment)
}

#[instrument(skip_all, fields(user = %user, post_id = %post_id))]
pub async fn react_to_post(
    user: UserId,
    post_id: PostId,
    deps: &FamilyDeps,
) -> FamilyResult<Reaction> {
    let mut tx = deps.store.begin().await?;
    let post = require_post(tx.as_mut(), post_id).await?;
    require_author(tx.as_mut(), user, post.family_id).await?;

    let reaction = Reaction::new(user, ReactionTarget::Post(post_id));
    tx.insert_reaction(&reaction).await?;
    tx.commit().await?;

    debug!(reaction_id = %reaction.id, "Post liked");
    Ok(reaction)
}

#[instrument(skip_all, fields(user = %user, comment_id = %comment_id))]
pub async fn react_to_comment(
    user: UserId,
    comment_id: CommentId,
    deps: &FamilyDeps,
) -> FamilyResult<Reaction> {
    let mut tx = deps.store.begin().await?;
    let comment = require_comment(tx.as_mut(), comment_id).await?;
    let post = require_post(tx.as_mut(), comment.post_id).await?;
    require_author(tx.as_mut(), user, post.family_id).await?;

    let reaction = Reaction::new(user, ReactionTarget::Comment(comment_id));
    tx.insert_reaction(&reaction).await?;
    tx.commit().await?;

    debug!(reaction_id = %reaction.id, "Comment liked");
    Ok(reaction)
}
