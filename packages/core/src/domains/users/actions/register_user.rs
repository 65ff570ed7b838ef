//! Register user action - seeds the identity slice the core works with

use tracing::info;

use crate::common::{FamilyError, FamilyResult, UserId};
use crate::domains::users::models::User;
use crate::kernel::FamilyDeps;

/// Store a new ACTIVE user.
pub async fn register_user(nickname: &str, deps: &FamilyDeps) -> FamilyResult<User> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
        return Err(FamilyError::validation("nickname must not be empty"));
    }

    let user = User::new(nickname);
    let mut tx = deps.store.begin().await?;
    tx.save_user(&user).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Look up a user in any status.
pub async fn get_user(id: UserId, deps: &FamilyDeps) -> FamilyResult<User> {
    let mut tx = deps.store.begin().await?;
    tx.find_user(id)
        .await?
        .ok_or_else(|| FamilyError::not_found("user", id))
}
