//! Point-in-polygon test used for jurisdiction detection.
//!
//! Polygons are ordered `(lat, lng)` vertex lists in WGS84. The test is a
//! cheap bounding-box rejection followed by the standard ray-casting
//! odd-crossing-number algorithm. Points exactly on a boundary edge get an
//! implementation-defined but deterministic answer; barangay boundaries are
//! survey data, so exact-boundary reports are not a case worth special-casing.

/// Axis-aligned bounding box of a polygon.
///
/// Exposed so the rejection pre-check can be exercised independently of the
/// exact ray-cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Compute the bounding box of a vertex list.
    ///
    /// Returns `None` for polygons with fewer than 3 vertices, which are
    /// degenerate and never contain any point.
    pub fn of(polygon: &[(f64, f64)]) -> Option<Self> {
        if polygon.len() < 3 {
            return None;
        }
        let mut bbox = BoundingBox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lng: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
        };
        for &(lat, lng) in polygon {
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
            bbox.min_lng = bbox.min_lng.min(lng);
            bbox.max_lng = bbox.max_lng.max(lng);
        }
        Some(bbox)
    }

    /// Whether the point lies inside or on the box.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Test whether `(lat, lng)` lies inside `polygon`.
///
/// A polygon with fewer than 3 vertices never contains a point. The ring may
/// be open or closed (a repeated final vertex contributes a zero-length edge
/// that never crosses the ray).
pub fn contains(polygon: &[(f64, f64)], lat: f64, lng: f64) -> bool {
    let Some(bbox) = BoundingBox::of(polygon) else {
        return false;
    };
    if !bbox.contains(lat, lng) {
        return false;
    }
    ray_cast(polygon, lat, lng)
}

/// Ray-casting odd-crossing-number test.
///
/// Casts a ray from the point toward negative longitude and counts edge
/// crossings; an odd count means inside.
fn ray_cast(polygon: &[(f64, f64)], lat: f64, lng: f64) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (lat_i, lng_i) = polygon[i];
        let (lat_j, lng_j) = polygon[j];

        let crosses = ((lat_i > lat) != (lat_j > lat))
            && (lng < (lng_j - lng_i) * (lat - lat_i) / (lat_j - lat_i) + lng_i);
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}
