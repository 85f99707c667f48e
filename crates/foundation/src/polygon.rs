use serde::{Deserialize, Serialize};

use crate::math::LatLng;

/// Closed lat/lng ring. The closing edge from the last vertex back to the
/// first is implicit; a repeated first vertex is harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring {
    points: Vec<LatLng>,
}

impl Ring {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        point_in_polygon(lat, lng, &self.points)
    }
}

/// Ray-casting parity test of a point against a closed ring.
///
/// Rings with fewer than three vertices contain nothing. Points exactly on an
/// edge may fall either way.
pub fn point_in_polygon(lat: f64, lng: f64, ring: &[LatLng]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (yi, xi) = (ring[i].lat, ring[i].lng);
        let (yj, xj) = (ring[j].lat, ring[j].lng);
        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lng < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
