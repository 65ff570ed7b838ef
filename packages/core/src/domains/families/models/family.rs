use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use typed_builder::TypedBuilder;

use crate::common::{FamilyError, FamilyId, FamilyResult, UserId};

/// Longest family name accepted, in characters.
pub const MAX_FAMILY_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "family_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FamilyStatus {
    #[default]
    Active,
    Inactive,
}

/// A family group.
///
/// While ACTIVE, `owner_id` always names exactly one ACTIVE member of the
/// family. `invite_code` never changes once issued.
#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Family {
    #[builder(default = FamilyId::new())]
    pub id: FamilyId,
    pub owner_id: UserId,
    pub name: String,
    pub upload_cycle: i32,
    pub invite_code: String,
    #[builder(default)]
    pub represent_image: Option<String>,
    #[builder(default)]
    pub status: FamilyStatus,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Family {
    pub fn is_active(&self) -> bool {
        self.status == FamilyStatus::Active
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    pub fn validate_name(name: &str) -> FamilyResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FamilyError::validation("family name must not be empty"));
        }
        if name.chars().count() > MAX_FAMILY_NAME_CHARS {
            return Err(FamilyError::validation(format!(
                "family name must be at most {} characters",
                MAX_FAMILY_NAME_CHARS
            )));
        }
        Ok(())
    }

    pub fn validate_upload_cycle(days: i32) -> FamilyResult<()> {
        if days <= 0 {
            return Err(FamilyError::validation("upload cycle must be a positive number of days"));
        }
        Ok(())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Find family by ID (any status)
    pub async fn find_by_id(id: FamilyId, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM families WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Find the active family holding an invite code
    pub async fn find_active_by_code(code: &str, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM families WHERE invite_code = $1 AND status = 'active'",
        )
        .bind(code)
        .fetch_optional(conn)
        .await
        .map_err(Into::into)
    }

    /// Find active families owned by a user
    pub async fn find_active_by_owner(owner: UserId, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM families WHERE owner_id = $1 AND status = 'active' ORDER BY created_at",
        )
        .bind(owner)
        .fetch_all(conn)
        .await
        .map_err(Into::into)
    }

    /// Insert new family
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO families (
                id, owner_id, name, upload_cycle, invite_code,
                represent_image, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(self.id)
        .bind(self.owner_id)
        .bind(&self.name)
        .bind(self.upload_cycle)
        .bind(&self.invite_code)
        .bind(&self.represent_image)
        .bind(self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Persist the mutable columns (invite code is immutable)
    pub async fn update(&self, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE families
            SET owner_id = $2,
                name = $3,
                upload_cycle = $4,
                represent_image = $5,
                status = $6,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(self.owner_id)
        .bind(&self.name)
        .bind(self.upload_cycle)
        .bind(&self.represent_image)
        .bind(self.status)
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_counts_characters_not_bytes() {
        // 10 Hangul syllables: 30 bytes but only 10 characters
        assert!(Family::validate_name("우리가족사랑해요행복").is_ok());
        assert!(Family::validate_name(&"a".repeat(20)).is_ok());
        assert!(matches!(
            Family::validate_name(&"a".repeat(21)),
            Err(FamilyError::Validation(_))
        ));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(Family::validate_name("   ").is_err());
    }

    #[test]
    fn upload_cycle_must_be_positive() {
        assert!(Family::validate_upload_cycle(7).is_ok());
        assert!(Family::validate_upload_cycle(0).is_err());
        assert!(Family::validate_upload_cycle(-3).is_err());
    }

    #[test]
    fn builder_defaults_to_active() {
        let owner = UserId::new();
        let family = Family::builder()
            .owner_id(owner)
            .name("Kims")
            .upload_cycle(7)
            .invite_code("ABCD1234")
            .build();

        assert!(family.is_active());
        assert!(family.is_owner(owner));
        assert!(family.represent_image.is_none());
    }
}
