pub mod cascade;
pub mod content;
pub mod families;
pub mod guards;
pub mod memberships;
pub mod users;
