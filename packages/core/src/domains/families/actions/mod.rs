//! Family domain actions - business logic functions
//!
//! Every action opens one transaction through `deps.store`, checks its
//! preconditions inside it, and only hands events to the notifier after
//! the commit succeeded.

mod create_family;
mod delete_family;
mod join_with_code;
mod queries;
mod transfer_ownership;
mod update_family;

pub use create_family::{create_family, NewFamily};
pub use delete_family::delete_family;
pub use join_with_code::join_with_code;
pub use queries::{current_family, get_family, list_active_members, FamilyMember};
pub use transfer_ownership::transfer_ownership;
pub use update_family::{update_family, update_upload_cycle, FamilyUpdate};
