//! Membership events handed to the notification collaborator after commit.

use serde::{Deserialize, Serialize};

use crate::common::{FamilyId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MembershipEvent {
    Invited {
        family_id: FamilyId,
        inviter_id: UserId,
        invitee_id: UserId,
    },
    InvitationAccepted {
        family_id: FamilyId,
        user_id: UserId,
    },
    InvitationRejected {
        family_id: FamilyId,
        user_id: UserId,
    },
    Joined {
        family_id: FamilyId,
        user_id: UserId,
    },
    Withdrew {
        family_id: FamilyId,
        user_id: UserId,
    },
    Expelled {
        family_id: FamilyId,
        owner_id: UserId,
        user_id: UserId,
    },
    OwnershipTransferred {
        family_id: FamilyId,
        from: UserId,
        to: UserId,
    },
    FamilyDeleted {
        family_id: FamilyId,
        owner_id: UserId,
    },
    AccountDeleted {
        user_id: UserId,
    },
}

impl MembershipEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invited { .. } => "invited",
            Self::InvitationAccepted { .. } => "invitation_accepted",
            Self::InvitationRejected { .. } => "invitation_rejected",
            Self::Joined { .. } => "joined",
            Self::Withdrew { .. } => "withdrew",
            Self::Expelled { .. } => "expelled",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::FamilyDeleted { .. } => "family_deleted",
            Self::AccountDeleted { .. } => "account_deleted",
        }
    }
}
