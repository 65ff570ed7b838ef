//! Delete family action - the owner dissolves the family

use tracing::{info, instrument};

use crate::common::{FamilyId, FamilyResult, UserId};
use crate::domains::cascade::{cascade_family_in, CascadeReport};
use crate::domains::guards::{require_active_family, require_actor, require_owner};
use crate::domains::memberships::events::MembershipEvent;
use crate::kernel::FamilyDeps;

/// Deactivate the family and cascade over its content and memberships.
///
/// The ownership check and the cascade share one transaction, so a failure
/// anywhere leaves the family untouched.
#[instrument(skip_all, fields(actor = %actor, family_id = %family_id))]
pub async fn delete_family(
    actor: UserId,
    family_id: FamilyId,
    deps: &FamilyDeps,
) -> FamilyResult<CascadeReport> {
    let mut tx = deps.store.begin().await?;
    require_actor(tx.as_mut(), actor).await?;
    let mut family = require_active_family(tx.as_mut(), family_id).await?;
    require_owner(&family, actor)?;

    let report =
        cascade_family_in(tx.as_mut(), &mut family, deps.config.cascade_batch_size).await?;
    tx.commit().await?;

    info!(?report, "Family deleted");
    deps.dispatch(vec![MembershipEvent::FamilyDeleted {
        family_id,
        owner_id: actor,
    }]);
    Ok(report)
}
