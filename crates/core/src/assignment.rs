//! Station assignment engine.
//!
//! A priority-ordered, short-circuiting decision over a report's crime-type
//! tags, explicit barangay reference, and coordinates. Pure: the outcome is
//! recorded on the report by the caller, and recomputation is an explicit
//! operation, never automatic.

use serde::Serialize;

use crate::jurisdiction::JurisdictionIndex;
use crate::types::DbId;

/// Inputs the engine reads off a report. Coordinates are WGS84.
#[derive(Debug, Clone)]
pub struct AssignmentInput<'a> {
    pub report_id: DbId,
    pub latitude: f64,
    pub longitude: f64,
    /// Crime-type tags, non-empty for a valid report.
    pub crime_types: &'a [String],
    /// Submitter-declared barangay, trusted over geometric detection.
    pub barangay_id: Option<DbId>,
}

/// Which decision branch produced the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentBasis {
    CybercrimeOverride,
    ExplicitBarangay,
    PointInPolygon,
}

/// Outcome of the assignment decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Assignment {
    Assigned {
        station_id: DbId,
        basis: AssignmentBasis,
        /// Matched barangay, when the decision went through one.
        barangay_id: Option<DbId>,
    },
    /// No branch matched. The report stays unassigned and is only visible to
    /// super-admins until re-assignment.
    Unassigned,
}

impl Assignment {
    /// Station id when assigned.
    pub fn station_id(&self) -> Option<DbId> {
        match self {
            Assignment::Assigned { station_id, .. } => Some(*station_id),
            Assignment::Unassigned => None,
        }
    }
}

/// Whether any tag marks the report as cybercrime.
///
/// Matches the production normalizer: lowercase, trim, substring match on
/// "cybercrime" or "cyber crime".
pub fn is_cybercrime(crime_types: &[String]) -> bool {
    crime_types.iter().any(|tag| {
        let normalized = tag.to_lowercase();
        let normalized = normalized.trim();
        normalized.contains("cybercrime") || normalized.contains("cyber crime")
    })
}

/// Decide which station owns a report. First matching branch wins:
///
/// 1. cybercrime tag -> Cybercrime Division, ignoring location entirely;
/// 2. explicit barangay -> that barangay's owning station;
/// 3. point-in-polygon over the index in ascending-id order;
/// 4. otherwise unassigned.
pub fn assign(input: &AssignmentInput<'_>, index: &JurisdictionIndex) -> Assignment {
    if is_cybercrime(input.crime_types) {
        if let Some(station_id) = index.cybercrime_station_id() {
            return Assignment::Assigned {
                station_id,
                basis: AssignmentBasis::CybercrimeOverride,
                barangay_id: None,
            };
        }
        // Reference data lacks the division: fall through to location-based
        // routing rather than losing the report.
    }

    if let Some(barangay_id) = input.barangay_id {
        if let Some(station_id) = index.barangay(barangay_id).and_then(|b| b.station_id) {
            return Assignment::Assigned {
                station_id,
                basis: AssignmentBasis::ExplicitBarangay,
                barangay_id: Some(barangay_id),
            };
        }
    }

    if let Some(barangay) = index.locate(input.latitude, input.longitude) {
        if let Some(station_id) = barangay.station_id {
            return Assignment::Assigned {
                station_id,
                basis: AssignmentBasis::PointInPolygon,
                barangay_id: Some(barangay.barangay_id),
            };
        }
    }

    Assignment::Unassigned
}
