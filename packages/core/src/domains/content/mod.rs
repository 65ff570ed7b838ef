//! Content domain - posts, comments and likes written inside a family
//!
//! The membership engine never edits content; cascades only flip status.

pub mod actions;
pub mod models;

pub use models::{Comment, ContentKind, ContentStatus, Post, Reaction, ReactionTarget};
