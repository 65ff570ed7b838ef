//! Delete account action - a user removes themselves

use tracing::info;

use crate::common::{FamilyResult, UserId};
use crate::domains::cascade::{cascade_user, CascadeReport};
use crate::domains::memberships::events::MembershipEvent;
use crate::kernel::FamilyDeps;

/// Run the user cascade and announce the deletion.
///
/// Fails with `FailedToLeave` while the user owns an ACTIVE family. Deleting
/// an already deleted account succeeds without writing or notifying.
pub async fn delete_account(user: UserId, deps: &FamilyDeps) -> FamilyResult<CascadeReport> {
    let report = cascade_user(user, deps).await?;

    if report.user_deactivated {
        info!(user_id = %user, "Account deleted");
        deps.dispatch(vec![MembershipEvent::AccountDeleted { user_id: user }]);
    }
    Ok(report)
}
