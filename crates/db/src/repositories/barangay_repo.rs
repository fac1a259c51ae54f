//! Repository for the `barangays` reference table.

use sqlx::PgPool;

use bantay_core::jurisdiction::JurisdictionIndex;
use bantay_core::types::DbId;

use crate::models::barangay::{Barangay, CreateBarangay};
use crate::repositories::StationRepo;

/// Column list for `barangays` queries.
const COLUMNS: &str = "barangay_id, barangay_name, station_id, boundary_polygon, created_at";

/// Provides read access (and seeding inserts) for barangays, plus
/// construction of the in-memory jurisdiction index.
pub struct BarangayRepo;

impl BarangayRepo {
    /// Insert a barangay.
    pub async fn create(pool: &PgPool, input: &CreateBarangay) -> Result<Barangay, sqlx::Error> {
        let query = format!(
            "INSERT INTO barangays (barangay_name, station_id, boundary_polygon) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Barangay>(&query)
            .bind(&input.barangay_name)
            .bind(input.station_id)
            .bind(input.boundary_polygon.as_ref())
            .fetch_one(pool)
            .await
    }

    /// Find a barangay by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        barangay_id: DbId,
    ) -> Result<Option<Barangay>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM barangays WHERE barangay_id = $1");
        sqlx::query_as::<_, Barangay>(&query)
            .bind(barangay_id)
            .fetch_optional(pool)
            .await
    }

    /// All barangays that have a boundary polygon on file, ascending id.
    pub async fn list_with_boundaries(pool: &PgPool) -> Result<Vec<Barangay>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM barangays \
             WHERE boundary_polygon IS NOT NULL \
             ORDER BY barangay_id ASC"
        );
        sqlx::query_as::<_, Barangay>(&query).fetch_all(pool).await
    }

    /// Build the jurisdiction index the assignment engine consumes: every
    /// barangay boundary plus the Cybercrime Division reference.
    ///
    /// Barangays without boundary data are still included (the explicit
    /// barangay branch only needs the id-to-station mapping).
    pub async fn load_index(pool: &PgPool) -> Result<JurisdictionIndex, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM barangays ORDER BY barangay_id ASC");
        let barangays = sqlx::query_as::<_, Barangay>(&query).fetch_all(pool).await?;

        let cybercrime_station_id = StationRepo::find_cybercrime_division(pool)
            .await?
            .map(|station| station.station_id);

        let boundaries = barangays.into_iter().map(Barangay::into_boundary).collect();
        Ok(JurisdictionIndex::new(boundaries, cybercrime_station_id))
    }
}
