//! In-memory jurisdiction reference data.
//!
//! Maps barangay boundary polygons to their owning stations, plus the
//! distinguished Cybercrime Division station. Built from reference tables by
//! the persistence layer and handed to the assignment engine.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::types::DbId;

/// One barangay boundary record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarangayBoundary {
    pub barangay_id: DbId,
    pub name: String,
    /// Owning station. Nullable in reference data; a barangay without a
    /// station can match a point but yields no assignment.
    pub station_id: Option<DbId>,
    /// Ordered `(lat, lng)` vertex list. Fewer than 3 vertices is treated as
    /// "never contains a point", not an error.
    pub polygon: Vec<(f64, f64)>,
}

impl BarangayBoundary {
    /// Whether the point lies inside this barangay's boundary.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        geometry::contains(&self.polygon, lat, lng)
    }
}

/// Queryable collection of barangay boundaries plus the Cybercrime Division.
///
/// Barangays are iterated in ascending id order, which is the documented
/// deterministic tie-break when boundary polygons overlap. Overlap itself is
/// a data-quality concern outside this engine.
#[derive(Debug, Clone)]
pub struct JurisdictionIndex {
    barangays: Vec<BarangayBoundary>,
    cybercrime_station_id: Option<DbId>,
}

impl JurisdictionIndex {
    /// Build an index. Sorts the records by ascending barangay id.
    pub fn new(mut barangays: Vec<BarangayBoundary>, cybercrime_station_id: Option<DbId>) -> Self {
        barangays.sort_by_key(|b| b.barangay_id);
        Self {
            barangays,
            cybercrime_station_id,
        }
    }

    /// The Cybercrime Division station, when the reference data defines one.
    pub fn cybercrime_station_id(&self) -> Option<DbId> {
        self.cybercrime_station_id
    }

    /// Barangays in ascending id order.
    pub fn barangays(&self) -> &[BarangayBoundary] {
        &self.barangays
    }

    /// Look up a barangay record by id.
    pub fn barangay(&self, barangay_id: DbId) -> Option<&BarangayBoundary> {
        self.barangays
            .binary_search_by_key(&barangay_id, |b| b.barangay_id)
            .ok()
            .map(|i| &self.barangays[i])
    }

    /// First barangay (ascending id) whose boundary contains the point.
    pub fn locate(&self, lat: f64, lng: f64) -> Option<&BarangayBoundary> {
        self.barangays.iter().find(|b| b.contains(lat, lng))
    }
}
