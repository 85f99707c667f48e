use serde::{Deserialize, Serialize};

use crate::math::LatLng;

/// Axis-aligned latitude/longitude box (degrees).
///
/// Boxes never straddle the antimeridian; city-scale data doesn't need it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        GeoBounds {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn enclosing(points: &[LatLng]) -> Option<Self> {
        let first = points.first()?;
        let mut b = GeoBounds::new(first.lat, first.lng, first.lat, first.lng);
        for p in &points[1..] {
            b.south = b.south.min(p.lat);
            b.north = b.north.max(p.lat);
            b.west = b.west.min(p.lng);
            b.east = b.east.max(p.lng);
        }
        Some(b)
    }

    /// Inclusive containment test.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            0.5 * (self.south + self.north),
            0.5 * (self.west + self.east),
        )
    }
}

/// Cheap containment check used for approximate zone tests and as a pre-filter
/// before polygon tests.
pub fn is_within_bounding_box(lat: f64, lng: f64, bounds: &GeoBounds) -> bool {
    bounds.contains(lat, lng)
}
