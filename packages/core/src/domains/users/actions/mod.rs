//! User domain actions

mod delete_account;
mod register_user;

pub use delete_account::delete_account;
pub use register_user::{get_user, register_user};
