//! Repository for the `users` table.

use sqlx::PgPool;

use bantay_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, display_name, role, station_id, is_on_duty, created_at";

/// Provides lookups for role and station checks.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (display_name, role, station_id, is_on_duty) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.display_name)
            .bind(&input.role)
            .bind(input.station_id)
            .bind(input.is_on_duty)
            .fetch_one(pool)
            .await
    }

    /// Find a user by their ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
