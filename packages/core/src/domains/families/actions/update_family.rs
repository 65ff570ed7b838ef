//! Update family actions - name, representative image and upload cycle

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::common::{FamilyId, FamilyResult, UserId};
use crate::domains::families::models::Family;
use crate::domains::guards::{
    require_active_family, require_active_member, require_actor, require_owner,
};
use crate::kernel::FamilyDeps;

/// Fields a member may change. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FamilyUpdate {
    pub name: Option<String>,
    pub represent_image: Option<String>,
}

/// Any ACTIVE member may rename the family or change its picture.
#[instrument(skip_all, fields(actor = %actor, family_id = %family_id))]
pub async fn update_family(
    actor: UserId,
    family_id: FamilyId,
    update: FamilyUpdate,
    deps: &FamilyDeps,
) -> FamilyResult<Family> {
    if let Some(name) = &update.name {
        Family::validate_name(name)?;
    }

    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), actor).await?;
    let mut family = require_active_family(tx.as_mut(), family_id).await?;
    require_active_member(tx.as_mut(), actor, family_id).await?;

    if let Some(name) = update.name {
        family.name = name.trim().to_string();
    }
    if let Some(image) = update.represent_image {
        family.represent_image = Some(image);
    }
    family.updated_at = Utc::now();

    tx.update_family(&family).await?;
    tx.commit().await?;

    info!("Family updated");
    Ok(family)
}

/// Only the owner sets how often the family is expected to upload.
#[instrument(skip_all, fields(actor = %actor, family_id = %family_id))]
pub async fn update_upload_cycle(
    actor: UserId,
    family_id: FamilyId,
    days: i32,
    deps: &FamilyDeps,
) -> FamilyResult<Family> {
    Family::validate_upload_cycle(days)?;

    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), actor).await?;
    let mut family = require_active_family(tx.as_mut(), family_id).await?;
    require_owner(&family, actor)?;

    family.upload_cycle = days;
    family.updated_at = Utc::now();
    tx.update_family(&family).await?;
    tx.commit().await?;

    info!(days, "Upload cycle changed");
    Ok(family)
}
