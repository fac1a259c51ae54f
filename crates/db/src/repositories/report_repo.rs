//! Repository for the `reports` table.
//!
//! This core only writes the assignment outcome and the projected status;
//! everything else on a report is owned by the (external) submission flow.

use sqlx::PgPool;

use bantay_core::roles::ROLE_SUPER_ADMIN;
use bantay_core::types::DbId;

use crate::models::report::{CreateReport, Report, ReportListQuery};
use crate::models::user::User;

/// Column list for `reports` queries.
const COLUMNS: &str = "\
    report_id, reporter_id, title, crime_types, latitude, longitude, \
    barangay_id, assigned_station_id, status, is_valid, validated_at, \
    created_at, updated_at";

/// Maximum page size for report listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for report listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides report reads and the narrow writes this core owns.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a report (exercised by tests; production rows come from the
    /// submission service).
    pub async fn create(pool: &PgPool, input: &CreateReport) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports \
                 (reporter_id, title, crime_types, latitude, longitude, barangay_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(input.reporter_id)
            .bind(input.title.as_deref())
            .bind(sqlx::types::Json(&input.crime_types))
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(input.barangay_id)
            .fetch_one(pool)
            .await
    }

    /// Find a report by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE report_id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(report_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the assignment engine's outcome. `None` clears the assignment
    /// (the unassigned branch); the decision is one-shot and only rewritten
    /// by an explicit re-assignment call.
    pub async fn set_assigned_station(
        pool: &PgPool,
        report_id: DbId,
        station_id: Option<DbId>,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports \
             SET assigned_station_id = $2, updated_at = NOW() \
             WHERE report_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(report_id)
            .bind(station_id)
            .fetch_optional(pool)
            .await
    }

    /// Projected status write, driven by dispatch-transition events.
    pub async fn set_status(
        pool: &PgPool,
        report_id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reports SET status = $2, updated_at = NOW() WHERE report_id = $1")
            .bind(report_id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Projected verdict write: status plus the validity flag, in one
    /// statement so no partially projected state is observable.
    pub async fn set_verdict(
        pool: &PgPool,
        report_id: DbId,
        status: &str,
        is_valid: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE reports \
             SET status = $2, is_valid = $3, validated_at = NOW(), updated_at = NOW() \
             WHERE report_id = $1",
        )
        .bind(report_id)
        .bind(status)
        .bind(is_valid)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List reports visible to the acting user.
    ///
    /// Super-admins see everything, including unassigned reports. Everyone
    /// else is station-scoped: they only see reports assigned to their
    /// station, so unassigned reports are invisible to them by construction.
    /// Callers without a station see nothing.
    pub async fn list_visible_to(
        pool: &PgPool,
        actor: &User,
        params: &ReportListQuery,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        if actor.role == ROLE_SUPER_ADMIN {
            let query = format!(
                "SELECT {COLUMNS} FROM reports \
                 ORDER BY created_at DESC \
                 LIMIT $1 OFFSET $2"
            );
            return sqlx::query_as::<_, Report>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await;
        }

        let Some(station_id) = actor.station_id else {
            return Ok(Vec::new());
        };

        // Station-scoped admins and patrol officers: assigned to their
        // station only. The NULL-excluding equality is what hides
        // unassigned reports from non-super-admins.
        let query = format!(
            "SELECT {COLUMNS} FROM reports \
             WHERE assigned_station_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(station_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
