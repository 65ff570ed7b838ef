//! Integration tests for family creation, updates, ownership and deletion.

mod common;

use family_core::common::{FamilyError, FamilyId};
use family_core::domains::content::actions::{add_comment, publish_post, react_to_comment, react_to_post};
use family_core::domains::content::models::{ContentKind, ContentStatus};
use family_core::domains::families::actions::{
    create_family, current_family, delete_family, get_family, join_with_code,
    list_active_members, transfer_ownership, update_family, update_upload_cycle, FamilyUpdate,
    NewFamily,
};
use family_core::domains::families::models::FamilyStatus;
use family_core::domains::memberships::actions::invite;
use family_core::domains::memberships::{MembershipEvent, MembershipStatus};
use test_context::test_context;

use crate::common::*;

/// Exactly one ACTIVE member is the owner.
async fn assert_single_active_owner(ctx: &TestHarness, family: FamilyId) {
    let members = list_active_members(family, ctx.deps()).await.unwrap();
    let owners: Vec<_> = members.iter().filter(|m| m.is_owner).collect();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].user_id, ctx.family(family).await.owner_id);
}

// =============================================================================
// Create
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn creating_a_family_enrolls_the_owner(ctx: &TestHarness) {
    let owner = create_user(ctx, "mom").await;

    let family = create_family(
        owner,
        NewFamily {
            name: "  Choi family ".to_string(),
            upload_cycle: 3,
            represent_image: Some("s3://images/choi.png".to_string()),
        },
        ctx.deps(),
    )
    .await
    .unwrap();

    assert_eq!(family.name, "Choi family");
    assert_eq!(family.status, FamilyStatus::Active);
    assert_eq!(family.invite_code.len(), 8);
    assert_eq!(family.represent_image.as_deref(), Some("s3://images/choi.png"));

    let record = ctx.live_membership(owner, family.id).await.unwrap();
    assert_eq!(record.status, MembershipStatus::Active);
    assert_single_active_owner(ctx, family.id).await;
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_validates_name_and_cycle(ctx: &TestHarness) {
    let owner = create_user(ctx, "mom").await;

    let long = create_family(owner, new_family(&"x".repeat(21)), ctx.deps()).await;
    assert!(matches!(long, Err(FamilyError::Validation(_))));

    let mut zero = new_family("Kims");
    zero.upload_cycle = 0;
    let zero = create_family(owner, zero, ctx.deps()).await;
    assert!(matches!(zero, Err(FamilyError::Validation(_))));

    assert!(current_family(owner, ctx.deps()).await.unwrap().is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn affiliated_users_cannot_found_another_family(ctx: &TestHarness) {
    let (owner, _family) = create_family_with_owner(ctx, "Kims").await;

    let result = create_family(owner, new_family("Second"), ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::AlreadyAffiliated(id)) if id == owner));
}

// =============================================================================
// Update
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn any_active_member_may_update_name_and_image(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let member = add_member(ctx, family.id, owner, "kid").await;

    let updated = update_family(
        member,
        family.id,
        FamilyUpdate {
            name: Some("Kim clan".to_string()),
            represent_image: Some("beach.jpg".to_string()),
        },
        ctx.deps(),
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Kim clan");
    assert_eq!(updated.invite_code, family.invite_code);
    let stored = get_family(family.id, ctx.deps()).await.unwrap();
    assert_eq!(stored.represent_image.as_deref(), Some("beach.jpg"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_rejects_outsiders_and_unknown_families(ctx: &TestHarness) {
    let (_owner, family) = create_family_with_owner(ctx, "Kims").await;
    let outsider = create_user(ctx, "outsider").await;

    let by_outsider = update_family(outsider, family.id, FamilyUpdate::default(), ctx.deps()).await;
    assert!(matches!(by_outsider, Err(FamilyError::Unauthorized(_))));

    let unknown = update_family(outsider, FamilyId::new(), FamilyUpdate::default(), ctx.deps()).await;
    assert!(matches!(unknown, Err(FamilyError::NotFound { entity: "family", .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_owner_sets_the_upload_cycle(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let member = add_member(ctx, family.id, owner, "kid").await;

    let by_member = update_upload_cycle(member, family.id, 14, ctx.deps()).await;
    assert!(matches!(by_member, Err(FamilyError::Unauthorized(_))));

    let negative = update_upload_cycle(owner, family.id, -1, ctx.deps()).await;
    assert!(matches!(negative, Err(FamilyError::Validation(_))));

    let updated = update_upload_cycle(owner, family.id, 14, ctx.deps()).await.unwrap();
    assert_eq!(updated.upload_cycle, 14);
}

// =============================================================================
// Ownership
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn ownership_moves_to_an_active_member(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let heir = add_member(ctx, family.id, owner, "heir").await;

    let updated = transfer_ownership(owner, family.id, heir, ctx.deps()).await.unwrap();

    assert_eq!(updated.owner_id, heir);
    assert_single_active_owner(ctx, family.id).await;

    let members = list_active_members(family.id, ctx.deps()).await.unwrap();
    assert_eq!(members[0].user_id, heir);
    assert_eq!(members[1].user_id, owner);

    let events = ctx.spy().wait_for(3).await;
    assert!(events.contains(&MembershipEvent::OwnershipTransferred {
        family_id: family.id,
        from: owner,
        to: heir,
    }));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn ownership_cannot_go_to_non_members(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let member = add_member(ctx, family.id, owner, "member").await;
    let invited = create_user(ctx, "invited").await;
    invite(owner, family.id, &[invited], ctx.deps()).await.unwrap();

    let to_invited = transfer_ownership(owner, family.id, invited, ctx.deps()).await;
    assert!(matches!(to_invited, Err(FamilyError::TargetNotActiveMember(id)) if id == invited));

    let by_member = transfer_ownership(member, family.id, member, ctx.deps()).await;
    assert!(matches!(by_member, Err(FamilyError::Unauthorized(_))));

    assert_eq!(ctx.family(family.id).await.owner_id, owner);
}

// =============================================================================
// Delete
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn deleting_a_family_cascades_over_its_content_and_members(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let a = add_member(ctx, family.id, owner, "a").await;
    let b = add_member(ctx, family.id, owner, "b").await;

    let post = publish_post(a, family.id, "picnic", ctx.deps()).await.unwrap();
    let comment = add_comment(b, post.id, "so fun", ctx.deps()).await.unwrap();
    let post_like = react_to_post(owner, post.id, ctx.deps()).await.unwrap();
    let comment_like = react_to_comment(a, comment.id, ctx.deps()).await.unwrap();

    let (other_owner, other) = create_family_with_owner(ctx, "Parks").await;
    let other_post = publish_post(other_owner, other.id, "hello", ctx.deps())
        .await
        .unwrap();

    let report = delete_family(owner, family.id, ctx.deps()).await.unwrap();

    assert!(report.family_deactivated);
    assert_eq!(report.posts, 1);
    assert_eq!(report.comments, 1);
    assert_eq!(report.reactions, 2);
    assert_eq!(report.memberships, 3);

    assert_eq!(ctx.family(family.id).await.status, FamilyStatus::Inactive);
    assert_eq!(ctx.content_status(ContentKind::Post, post.id).await, ContentStatus::Inactive);
    assert_eq!(ctx.content_status(ContentKind::Comment, comment.id).await, ContentStatus::Inactive);
    assert_eq!(
        ctx.content_status(ContentKind::PostLike, post_like.id).await,
        ContentStatus::Inactive
    );
    assert_eq!(
        ctx.content_status(ContentKind::CommentLike, comment_like.id).await,
        ContentStatus::Inactive
    );
    for user in [owner, a, b] {
        assert!(ctx.live_membership(user, family.id).await.is_none());
        assert!(ctx.user(user).await.is_active());
    }

    assert_eq!(ctx.family(other.id).await.status, FamilyStatus::Active);
    assert_eq!(
        ctx.content_status(ContentKind::Post, other_post.id).await,
        ContentStatus::Active
    );

    let missing = get_family(family.id, ctx.deps()).await;
    assert!(matches!(missing, Err(FamilyError::NotFound { .. })));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_owner_deletes_a_family(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let member = add_member(ctx, family.id, owner, "member").await;

    let result = delete_family(member, family.id, ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::Unauthorized(_))));
    assert_eq!(ctx.family(family.id).await.status, FamilyStatus::Active);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn former_members_are_free_to_join_elsewhere(ctx: &TestHarness) {
    let (owner, family) = create_family_with_owner(ctx, "Kims").await;
    let member = add_member(ctx, family.id, owner, "member").await;
    delete_family(owner, family.id, ctx.deps()).await.unwrap();

    let (_other_owner, other) = create_family_with_owner(ctx, "Parks").await;
    join_with_code(member, &other.invite_code, ctx.deps()).await.unwrap();

    let current = current_family(member, ctx.deps()).await.unwrap().unwrap();
    assert_eq!(current.id, other.id);
}

// =============================================================================
// Join with code
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn joining_with_a_code_activates_membership(ctx: &TestHarness) {
    let (_owner, family) = create_family_with_owner(ctx, "Kims").await;
    let user = create_user(ctx, "cousin").await;

    let record = join_with_code(user, &family.invite_code, ctx.deps()).await.unwrap();

    assert_eq!(record.status, MembershipStatus::Active);
    assert_eq!(record.family_id, family.id);
    assert_eq!(
        current_family(user, ctx.deps()).await.unwrap().map(|f| f.id),
        Some(family.id)
    );

    let twice = join_with_code(user, &family.invite_code, ctx.deps()).await;
    assert!(matches!(twice, Err(FamilyError::AlreadyAffiliated(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn joining_with_unknown_code_fails(ctx: &TestHarness) {
    let user = create_user(ctx, "cousin").await;

    let result = join_with_code(user, "NOPE0000", ctx.deps()).await;

    assert!(matches!(result, Err(FamilyError::NotFound { entity: "invite code", .. })));
}
