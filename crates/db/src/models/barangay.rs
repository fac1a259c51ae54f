//! Barangay reference data and boundary-polygon decoding.

use bantay_core::jurisdiction::BarangayBoundary;
use bantay_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `barangays` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Barangay {
    pub barangay_id: DbId,
    pub barangay_name: String,
    pub station_id: Option<DbId>,
    /// GeoJSON `Polygon` geometry, or NULL when no boundary is on file.
    pub boundary_polygon: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for inserting a barangay (reference-data seeding and tests).
#[derive(Debug, Deserialize)]
pub struct CreateBarangay {
    pub barangay_name: String,
    pub station_id: Option<DbId>,
    pub boundary_polygon: Option<serde_json::Value>,
}

impl Barangay {
    /// Decode the stored GeoJSON polygon into an ordered `(lat, lng)` vertex
    /// list.
    ///
    /// GeoJSON positions are `[lng, lat]`; only the exterior ring is used.
    /// Anything unparseable decodes to an empty list, which the geometry
    /// primitive treats as "never contains a point". Bad boundary data must
    /// not block report intake.
    pub fn boundary_vertices(&self) -> Vec<(f64, f64)> {
        let Some(geometry) = &self.boundary_polygon else {
            return Vec::new();
        };
        let Some(ring) = geometry
            .get("coordinates")
            .and_then(|c| c.get(0))
            .and_then(|r| r.as_array())
        else {
            return Vec::new();
        };
        ring.iter()
            .filter_map(|position| {
                let lng = position.get(0)?.as_f64()?;
                let lat = position.get(1)?.as_f64()?;
                Some((lat, lng))
            })
            .collect()
    }

    /// Convert into the pure jurisdiction record consumed by the assignment
    /// engine.
    pub fn into_boundary(self) -> BarangayBoundary {
        let polygon = self.boundary_vertices();
        BarangayBoundary {
            barangay_id: self.barangay_id,
            name: self.barangay_name,
            station_id: self.station_id,
            polygon,
        }
    }
}
