use thiserror::Error;

use super::entity_ids::{FamilyId, UserId};

/// Failures surfaced by every membership, family and cascade operation.
///
/// All kinds except `Storage` are detected before the operation writes
/// anything. `Storage` always means the surrounding transaction was rolled back.
#[derive(Error, Debug)]
pub enum FamilyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("User {0} is already active or invited in a family")]
    AlreadyAffiliated(UserId),

    #[error("No pending invitation for user {user} in family {family}")]
    NoSuchInvitation { user: UserId, family: FamilyId },

    #[error("The family owner cannot withdraw; transfer ownership first")]
    OwnerCannotWithdraw,

    #[error("User {0} still owns an active family; transfer ownership or delete the family first")]
    FailedToLeave(UserId),

    #[error("User {0} is not an active member of the family")]
    TargetNotActiveMember(UserId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Could not generate a unique invite code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl FamilyError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}

impl From<sqlx::Error> for FamilyError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.into())
    }
}

pub type FamilyResult<T> = Result<T, FamilyError>;
