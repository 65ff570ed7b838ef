pub mod family;

pub use family::{Family, FamilyStatus, MAX_FAMILY_NAME_CHARS};
