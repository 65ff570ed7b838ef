//! Invite code issuing and lookup.

use tracing::{debug, warn};

use crate::common::{FamilyError, FamilyId, FamilyResult};
use crate::domains::families::models::Family;
use crate::kernel::{FamilyDeps, FamilyTx};

/// Draw a code not held by any ACTIVE family.
///
/// Tries at most `invite_code_attempts` candidates. Codes of INACTIVE
/// families may be reissued.
pub async fn generate_code(
    family_id: FamilyId,
    tx: &mut dyn FamilyTx,
    deps: &FamilyDeps,
) -> FamilyResult<String> {
    let attempts = deps.config.invite_code_attempts;

    for attempt in 1..=attempts {
        let candidate = deps.codes.next_code(deps.config.invite_code_length);
        if candidate.trim().is_empty() {
            continue;
        }

        if tx.find_active_family_by_code(&candidate).await?.is_none() {
            debug!(%family_id, attempt, "Issued invite code");
            return Ok(candidate);
        }

        debug!(%family_id, attempt, "Invite code collision, retrying");
    }

    warn!(%family_id, attempts, "Invite code generation exhausted");
    Err(FamilyError::CodeGenerationExhausted { attempts })
}

pub(crate) async fn resolve_in(tx: &mut dyn FamilyTx, code: &str) -> FamilyResult<Family> {
    let code = code.trim();
    tx.find_active_family_by_code(code)
        .await?
        .ok_or_else(|| FamilyError::not_found("invite code", code))
}

/// Map an invite code to its ACTIVE family.
pub async fn resolve_code(code: &str, deps: &FamilyDeps) -> FamilyResult<FamilyId> {
    let mut tx = deps.store.begin().await?;
    let family = resolve_in(tx.as_mut(), code).await?;
    Ok(family.id)
}
