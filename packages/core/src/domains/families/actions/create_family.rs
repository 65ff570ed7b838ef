//! Create family action - founds a family with its owner as first member

use serde::Deserialize;
use tracing::{info, instrument};

use crate::common::{FamilyId, FamilyResult, UserId};
use crate::domains::families::invite_code::generate_code;
use crate::domains::families::models::Family;
use crate::domains::guards::{ensure_unaffiliated, require_actor};
use crate::domains::memberships::models::MembershipRecord;
use crate::kernel::FamilyDeps;

#[derive(Debug, Clone, Deserialize)]
pub struct NewFamily {
    pub name: String,
    /// Days between expected uploads.
    pub upload_cycle: i32,
    #[serde(default)]
    pub represent_image: Option<String>,
}

/// Create a family owned by `owner`.
///
/// This action:
/// 1. Validates the name and upload cycle
/// 2. Refuses owners already ACTIVE or PENDING_INVITE anywhere
/// 3. Issues an invite code unique among ACTIVE families
/// 4. Stores the family and an ACTIVE membership for the owner
#[instrument(skip_all, fields(owner = %owner))]
pub async fn create_family(
    owner: UserId,
    input: NewFamily,
    deps: &FamilyDeps,
) -> FamilyResult<Family> {
    Family::validate_name(&input.name)?;
    Family::validate_upload_cycle(input.upload_cycle)?;

    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), owner).await?;
    tx.lock_users(&[owner]).await?;
    ensure_unaffiliated(tx.as_mut(), owner).await?;

    let family_id = FamilyId::new();
    let code = generate_code(family_id, tx.as_mut(), deps).await?;

    let family = Family::builder()
        .id(family_id)
        .owner_id(owner)
        .name(input.name.trim())
        .upload_cycle(input.upload_cycle)
        .invite_code(code)
        .represent_image(input.represent_image)
        .build();

    tx.insert_family(&family).await?;
    tx.insert_membership(&MembershipRecord::active(owner, family.id))
        .await?;
    tx.commit().await?;

    info!(family_id = %family.id, "Family created");
    Ok(family)
}
