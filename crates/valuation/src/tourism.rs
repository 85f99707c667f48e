use foundation::GeoBounds;
use foundation::math::{LatLng, distance_meters};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_GRID_DEG, Stream, cell_rng, snap};

/// Times Square.
pub const DEFAULT_TOURISM_REFERENCE: LatLng = LatLng::new(40.758, -73.9855);

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourismConfig {
    pub grid_deg: f64,
    /// Point of peak visitor traffic.
    pub reference: LatLng,
    pub city_limits: GeoBounds,
    /// Distance over which the linear decay reaches `decay_floor`.
    pub decay_distance_m: f64,
    pub decay_floor: f64,
    pub inside_range_usd: (f64, f64),
    pub outside_range_usd: (f64, f64),
}

impl Default for TourismConfig {
    fn default() -> Self {
        Self {
            grid_deg: DEFAULT_GRID_DEG,
            reference: DEFAULT_TOURISM_REFERENCE,
            city_limits: GeoBounds::new(40.4774, -74.2591, 40.9176, -73.7004),
            decay_distance_m: 25_000.0,
            decay_floor: 0.15,
            inside_range_usd: (2_000_000.0, 12_000_000.0),
            outside_range_usd: (500_000.0, 2_000_000.0),
        }
    }
}

/// Annual tourism revenue model.
#[derive(Debug, Clone, Default)]
pub struct TourismModel {
    config: TourismConfig,
}

impl TourismModel {
    pub fn new(config: TourismConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TourismConfig {
        &self.config
    }

    /// Linear decay with distance from the reference point, floored.
    pub fn decay(&self, point: LatLng) -> f64 {
        let d = distance_meters(point, self.config.reference);
        (1.0 - d / self.config.decay_distance_m).max(self.config.decay_floor)
    }

    /// Base draw range for a point.
    pub fn range_for(&self, point: LatLng) -> (f64, f64) {
        if self.config.city_limits.contains(point.lat, point.lng) {
            self.config.inside_range_usd
        } else {
            self.config.outside_range_usd
        }
    }

    /// Revenue for the quantized cell containing `(lat, lng)`; decay and
    /// range are taken at the cell center.
    pub fn tourism_revenue(&self, lat: f64, lng: f64) -> f64 {
        let cell = snap(lat, lng, self.config.grid_deg);
        let mut rng = cell_rng(cell.lat, cell.lng, self.config.grid_deg, Stream::Tourism);
        self.tourism_revenue_with(cell.lat, cell.lng, &mut rng)
    }

    pub fn tourism_revenue_with<R: Rng + ?Sized>(&self, lat: f64, lng: f64, rng: &mut R) -> f64 {
        let point = LatLng::new(lat, lng);
        let (lo, hi) = self.range_for(point);
        let u: f64 = rng.r#gen();
        (lo + u * (hi - lo)) * self.decay(point)
    }
}
