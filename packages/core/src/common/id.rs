//! Typed UUID wrappers for compile-time type safety.
//!
//! `Id<T>` wraps a `uuid::Uuid` so that a `UserId` can never be passed
//! where a `FamilyId` is expected, even though both are UUIDs in storage.
//!
//! # Example
//!
//! ```rust
//! use family_core::common::id::Id;
//!
//! pub struct User;
//! pub struct Family;
//!
//! pub type UserId = Id<User>;
//! pub type FamilyId = Id<Family>;
//!
//! let user_id = UserId::new();
//! let family_id = FamilyId::new();
//! assert_ne!(user_id.into_uuid(), family_id.into_uuid());
//!
//! // This would be a compile error:
//! // let wrong: FamilyId = user_id;
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// A typed wrapper around `Uuid`.
///
/// `T` names the entity the id belongs to. New ids are UUID v7, so primary
/// keys sort in creation order.
///
/// ```compile_fail
/// use family_core::common::id::Id;
///
/// struct User;
/// struct Post;
///
/// let user_id: Id<User> = Id::new();
/// let post_id: Id<Post> = user_id; // Compile error!
/// ```
#[repr(transparent)]
pub struct Id<T>(Uuid, PhantomData<fn() -> T>);

// ============================================================================
// Core implementations
// ============================================================================

impl<T> Id<T> {
    /// Creates a new time-ordered id.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7(), PhantomData)
    }

    /// Creates an `Id` from a raw `Uuid` (rows loaded from storage, CLI input).
    #[inline]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// Returns the inner `Uuid`.
    #[inline]
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// Parses an `Id` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    #[inline]
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?, PhantomData))
    }

    /// Returns a reference to the inner `Uuid`.
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Include type name for debugging clarity
        f.debug_tuple(&format!("Id<{}>", std::any::type_name::<T>()))
            .field(&self.0)
            .finish()
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> From<Uuid> for Id<T> {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    #[inline]
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = uuid::Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

// ============================================================================
// sqlx support
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <Uuid as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <Uuid as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <Uuid as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <Uuid as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <Uuid as Decode<Postgres>>::decode(value).map(Self::from_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Relative;

    type RelativeId = Id<Relative>;

    #[test]
    fn ids_parse_back_from_display() {
        let id = RelativeId::new();
        assert_eq!(RelativeId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn v7_ids_sort_by_creation() {
        let first = RelativeId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RelativeId::new();
        assert!(first < second);
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = RelativeId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn debug_names_the_entity() {
        let debug = format!("{:?}", RelativeId::new());
        assert!(debug.contains("Relative"));
    }
}
