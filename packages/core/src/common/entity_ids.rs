//! Typed ID definitions for all domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (owned by the identity store).
pub struct User;

/// Marker type for Family entities.
pub struct Family;

/// Marker type for Membership records (user x family).
pub struct Membership;

/// Marker type for Post entities.
pub struct Post;

/// Marker type for Comment entities.
pub struct Comment;

/// Marker type for Reaction entities (post likes and comment likes).
pub struct Reaction;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;
pub type FamilyId = Id<Family>;
pub type MembershipId = Id<Membership>;
pub type PostId = Id<Post>;
pub type CommentId = Id<Comment>;
pub type ReactionId = Id<Reaction>;
