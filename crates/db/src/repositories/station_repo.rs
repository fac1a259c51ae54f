//! Repository for the `police_stations` reference table.

use sqlx::PgPool;

use bantay_core::types::DbId;

use crate::models::station::{CreateStation, PoliceStation, CYBERCRIME_DIVISION};

/// Column list for `police_stations` queries.
const COLUMNS: &str = "station_id, station_name, address, contact_number, created_at";

/// Provides read access (and seeding inserts) for stations.
pub struct StationRepo;

impl StationRepo {
    /// Insert a station.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStation,
    ) -> Result<PoliceStation, sqlx::Error> {
        let query = format!(
            "INSERT INTO police_stations (station_name, address, contact_number) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(&input.station_name)
            .bind(input.address.as_deref())
            .bind(input.contact_number.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a station by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        station_id: DbId,
    ) -> Result<Option<PoliceStation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM police_stations WHERE station_id = $1");
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(station_id)
            .fetch_optional(pool)
            .await
    }

    /// The distinguished Cybercrime Division station, when seeded.
    pub async fn find_cybercrime_division(
        pool: &PgPool,
    ) -> Result<Option<PoliceStation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM police_stations WHERE station_name = $1 LIMIT 1"
        );
        sqlx::query_as::<_, PoliceStation>(&query)
            .bind(CYBERCRIME_DIVISION)
            .fetch_optional(pool)
            .await
    }
}
