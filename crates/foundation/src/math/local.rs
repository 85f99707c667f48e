use super::{LatLng, METERS_PER_DEGREE_LAT};

/// Local east/north offset (meters) on the tangent plane at some origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalOffset {
    pub east_m: f64,
    pub north_m: f64,
}

impl LocalOffset {
    pub fn new(east_m: f64, north_m: f64) -> Self {
        Self { east_m, north_m }
    }

    /// Rotates the offset by `deg` degrees clockwise (compass sense).
    pub fn rotated_clockwise(self, deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self::new(
            self.east_m * c + self.north_m * s,
            -self.east_m * s + self.north_m * c,
        )
    }
}

/// Ground length of one degree of longitude at `lat_deg` (flat-earth).
pub fn meters_per_degree_lng(lat_deg: f64) -> f64 {
    METERS_PER_DEGREE_LAT * lat_deg.to_radians().cos()
}

/// Flat-earth conversion of a local offset into a lat/lng around `origin`.
///
/// Only valid at city scale; the longitude scale is taken at the origin
/// latitude so that `lat_lng_to_offset` is its exact inverse.
pub fn offset_to_lat_lng(origin: LatLng, offset: LocalOffset) -> LatLng {
    LatLng::new(
        origin.lat + offset.north_m / METERS_PER_DEGREE_LAT,
        origin.lng + offset.east_m / meters_per_degree_lng(origin.lat),
    )
}

/// Flat-earth offset of `point` from `origin`.
pub fn lat_lng_to_offset(origin: LatLng, point: LatLng) -> LocalOffset {
    LocalOffset::new(
        (point.lng - origin.lng) * meters_per_degree_lng(origin.lat),
        (point.lat - origin.lat) * METERS_PER_DEGREE_LAT,
    )
}
