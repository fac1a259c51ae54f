//! Well-known role name constants.
//!
//! These must match the values stored in the `users.role` column.

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PATROL_OFFICER: &str = "patrol_officer";
pub const ROLE_CITIZEN: &str = "citizen";
