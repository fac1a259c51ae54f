//! Police station reference data.

use bantay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Distinguished station name for the cybercrime routing override.
pub const CYBERCRIME_DIVISION: &str = "Cybercrime Division";

/// A row from the `police_stations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PoliceStation {
    pub station_id: DbId,
    pub station_name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a station (reference-data seeding and tests).
#[derive(Debug, Deserialize)]
pub struct CreateStation {
    pub station_name: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
}
