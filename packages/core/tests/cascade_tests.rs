//! Integration tests for the cascading deactivation engine.

mod common;

use family_core::common::{FamilyError, UserId};
use family_core::config::EngineConfig;
use family_core::domains::cascade::{cascade_family, cascade_user};
use family_core::domains::content::actions::{
    add_comment, publish_post, react_to_comment, react_to_post,
};
use family_core::domains::content::models::{ContentKind, ContentStatus};
use family_core::domains::families::actions::delete_family;
use family_core::domains::families::models::FamilyStatus;
use family_core::domains::memberships::actions::invite;
use family_core::domains::memberships::{MembershipEvent, MembershipStatus};
use family_core::domains::users::actions::delete_account;
use family_core::domains::users::models::UserStatus;
use family_core::kernel::{Deactivation, FaultPoint, TestDependencies};
use test_context::test_context;

use crate::common::*;

#[test_context(TestHarness)]
#[tokio::test]
async fn account_deletion_deactivates_leaves_before_parents(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let u = add_member(ctx, family.id, owner, "U").await;

    let post = publish_post(u, family.id, "my post", ctx.deps()).await.unwrap();
    let comment = add_comment(u, post.id, "my comment", ctx.deps()).await.unwrap();
    let reaction = react_to_comment(u, comment.id, ctx.deps()).await.unwrap();
    let membership = ctx.live_membership(u, family.id).await.unwrap();

    let report = delete_account(u, ctx.deps()).await.unwrap();

    assert_eq!(report.reactions, 1);
    assert_eq!(report.comments, 1);
    assert_eq!(report.posts, 1);
    assert_eq!(report.memberships, 1);
    assert!(report.user_deactivated);

    assert_eq!(
        ctx.store().journal().await,
        vec![
            Deactivation::Content(ContentKind::CommentLike, reaction.id.into_uuid()),
            Deactivation::Content(ContentKind::Comment, comment.id.into_uuid()),
            Deactivation::Content(ContentKind::Post, post.id.into_uuid()),
            Deactivation::Membership(membership.id),
            Deactivation::User(u),
        ]
    );
    assert_eq!(ctx.user(u).await.status, UserStatus::Inactive);
    assert_eq!(
        ctx.last_membership(u, family.id).await.status,
        MembershipStatus::Inactive
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn repeating_account_deletion_is_a_no_op(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let u = add_member(ctx, family.id, owner, "U").await;
    publish_post(u, family.id, "my post", ctx.deps()).await.unwrap();

    delete_account(u, ctx.deps()).await.unwrap();
    let journal = ctx.store().journal().await;

    let again = delete_account(u, ctx.deps()).await.unwrap();

    assert!(again.is_noop());
    assert_eq!(ctx.store().journal().await, journal);

    let events = ctx.spy().wait_for(3).await;
    let deletions = events
        .iter()
        .filter(|e| matches!(e, MembershipEvent::AccountDeleted { .. }))
        .count();
    assert_eq!(deletions, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn owners_cannot_delete_their_account(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let post = publish_post(owner, family.id, "owner post", ctx.deps())
        .await
        .unwrap();

    let result = delete_account(owner, ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::FailedToLeave(id)) if id == owner));
    assert!(ctx.user(owner).await.is_active());
    assert_eq!(ctx.family(family.id).await.status, FamilyStatus::Active);
    assert!(ctx.live_membership(owner, family.id).await.unwrap().is_active());
    assert_eq!(ctx.content_status(ContentKind::Post, post.id).await, ContentStatus::Active);
    assert!(ctx.store().journal().await.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn pending_invitations_are_retired_with_the_account(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let invited = create_user(ctx, "invited").await;
    invite(owner, family.id, &[invited], ctx.deps()).await.unwrap();

    let report = cascade_user(invited, ctx.deps()).await.unwrap();

    assert_eq!(report.memberships, 1);
    assert_eq!(
        ctx.last_membership(invited, family.id).await.status,
        MembershipStatus::Inactive
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_users_are_not_found(ctx: &TestHarness) {
    let result = cascade_user(UserId::new(), ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::NotFound { entity: "user", .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn storage_failure_rolls_the_whole_cascade_back(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let u = add_member(ctx, family.id, owner, "U").await;
    let post = publish_post(u, family.id, "my post", ctx.deps()).await.unwrap();

    // Content is written first, so the failure hits after posts were flipped
    ctx.store().fail_next(FaultPoint::MembershipWrite);
    let result = delete_account(u, ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::Storage(_))));
    assert_eq!(ctx.content_status(ContentKind::Post, post.id).await, ContentStatus::Active);
    assert!(ctx.live_membership(u, family.id).await.unwrap().is_active());
    assert!(ctx.user(u).await.is_active());
    assert!(ctx.store().journal().await.is_empty());

    let retried = delete_account(u, ctx.deps()).await.unwrap();
    assert_eq!(retried.posts, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn family_deletion_deactivates_the_family_then_leaves_then_members(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let a = add_member(ctx, family.id, owner, "a").await;
    let b = add_member(ctx, family.id, owner, "b").await;

    let post = publish_post(a, family.id, "picnic", ctx.deps()).await.unwrap();
    let comment = add_comment(b, post.id, "so fun", ctx.deps()).await.unwrap();
    let post_like = react_to_post(owner, post.id, ctx.deps()).await.unwrap();
    let comment_like = react_to_comment(a, comment.id, ctx.deps()).await.unwrap();

    let mut memberships = Vec::new();
    for user in [owner, a, b] {
        let record = ctx.live_membership(user, family.id).await.unwrap();
        memberships.push(Deactivation::Membership(record.id));
    }

    delete_family(owner, family.id, ctx.deps()).await.unwrap();

    let journal = ctx.store().journal().await;
    assert_eq!(journal.len(), 8);
    assert_eq!(
        journal[..5],
        [
            Deactivation::Family(family.id),
            Deactivation::Content(ContentKind::CommentLike, comment_like.id.into_uuid()),
            Deactivation::Content(ContentKind::PostLike, post_like.id.into_uuid()),
            Deactivation::Content(ContentKind::Comment, comment.id.into_uuid()),
            Deactivation::Content(ContentKind::Post, post.id.into_uuid()),
        ]
    );
    for membership in &memberships {
        assert!(journal[5..].contains(membership));
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn storage_failure_rolls_the_family_deletion_back(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let u = add_member(ctx, family.id, owner, "U").await;
    let post = publish_post(u, family.id, "my post", ctx.deps()).await.unwrap();
    let comment = add_comment(owner, post.id, "nice", ctx.deps()).await.unwrap();

    // Family and content are written before memberships
    ctx.store().fail_next(FaultPoint::MembershipWrite);
    let result = delete_family(owner, family.id, ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::Storage(_))));
    let stored = ctx.family(family.id).await;
    assert_eq!(stored.status, FamilyStatus::Active);
    assert_eq!(stored.owner_id, owner);
    assert_eq!(ctx.content_status(ContentKind::Post, post.id).await, ContentStatus::Active);
    assert_eq!(
        ctx.content_status(ContentKind::Comment, comment.id).await,
        ContentStatus::Active
    );
    for user in [owner, u] {
        assert!(ctx.live_membership(user, family.id).await.unwrap().is_active());
    }
    assert!(ctx.store().journal().await.is_empty());

    let retried = delete_family(owner, family.id, ctx.deps()).await.unwrap();
    assert!(retried.family_deactivated);
    assert_eq!(retried.memberships, 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn family_cascade_is_idempotent(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    publish_post(owner, family.id, "hello", ctx.deps()).await.unwrap();

    let first = delete_family(owner, family.id, ctx.deps()).await.unwrap();
    assert!(!first.is_noop());

    let second = cascade_family(family.id, ctx.deps()).await.unwrap();
    assert!(second.is_noop());
}

#[tokio::test]
async fn cascades_work_in_batches() {
    let config = EngineConfig {
        cascade_batch_size: 2,
        ..EngineConfig::default()
    };
    let ctx = TestHarness::with(TestDependencies::new().with_config(config));

    let (owner, family) = create_family_with_owner(&ctx, "Kims").await;
    let u = add_member(&ctx, family.id, owner, "U").await;
    let mut posts = Vec::new();
    for i in 0..5 {
        let post = publish_post(u, family.id, &format!("post {}", i), ctx.deps())
            .await
            .unwrap();
        posts.push(post.id);
    }

    let report = delete_account(u, ctx.deps()).await.unwrap();

    assert_eq!(report.posts, 5);
    for post in posts {
        assert_eq!(ctx.content_status(ContentKind::Post, post).await, ContentStatus::Inactive);
    }
}
