//! User rows, read for role checks and officer/station scoping.
//!
//! Authentication itself is an external concern; handlers receive actor ids
//! and validate role and station membership against this table.

use bantay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub role: String,
    /// Station the user belongs to. Set for admins and patrol officers.
    pub station_id: Option<DbId>,
    pub is_on_duty: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a user (seeding and tests).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub display_name: String,
    pub role: String,
    pub station_id: Option<DbId>,
    #[serde(default)]
    pub is_on_duty: bool,
}
