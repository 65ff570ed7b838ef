//! Test fixtures for creating test data.
//!
//! These fixtures go through the public operations, so everything they
//! build satisfies the same rules as production data.

use family_core::common::{FamilyId, UserId};
use family_core::domains::families::actions::{create_family, NewFamily};
use family_core::domains::families::models::Family;
use family_core::domains::memberships::actions::{accept, invite};
use family_core::domains::users::actions::register_user;

use super::TestHarness;

pub async fn create_user(ctx: &TestHarness, nickname: &str) -> UserId {
    register_user(nickname, ctx.deps())
        .await
        .expect("Failed to register user")
        .id
}

pub fn new_family(name: &str) -> NewFamily {
    NewFamily {
        name: name.to_string(),
        upload_cycle: 7,
        represent_image: None,
    }
}

/// Register an owner and found a family for them.
pub async fn create_family_with_owner(ctx: &TestHarness, name: &str) -> (UserId, Family) {
    let owner = create_user(ctx, &format!("{} owner", name)).await;
    let family = create_family(owner, new_family(name), ctx.deps())
        .await
        .expect("Failed to create family");
    (owner, family)
}

/// Register a user and bring them in through invite + accept.
pub async fn add_member(
    ctx: &TestHarness,
    family: FamilyId,
    inviter: UserId,
    nickname: &str,
) -> UserId {
    let user = create_user(ctx, nickname).await;
    invite(inviter, family, &[user], ctx.deps())
        .await
        .expect("Failed to invite member");
    accept(user, family, ctx.deps())
        .await
        .expect("Failed to accept invitation");
    user
}
