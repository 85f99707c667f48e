use foundation::math::LatLng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_GRID_DEG, DataError, Stream, ZoneTable, cell_rng, snap};

/// Ground footprint of one landmark model.
pub const DEFAULT_FOOTPRINT_SQ_FT: f64 = 12_000.0;

/// Fees, financing and permits on top of raw land cost.
pub const DEFAULT_SOFT_COST_MULTIPLIER: f64 = 1.25;

/// Half-width of the multiplicative rate jitter.
pub const DEFAULT_JITTER_FRACTION: f64 = 0.05;

/// Land values are reported to this granularity.
pub const LAND_VALUE_ROUNDING_USD: f64 = 10_000.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppraisalConfig {
    pub grid_deg: f64,
    pub footprint_sq_ft: f64,
    pub soft_cost_multiplier: f64,
    pub jitter_fraction: f64,
}

impl Default for AppraisalConfig {
    fn default() -> Self {
        Self {
            grid_deg: DEFAULT_GRID_DEG,
            footprint_sq_ft: DEFAULT_FOOTPRINT_SQ_FT,
            soft_cost_multiplier: DEFAULT_SOFT_COST_MULTIPLIER,
            jitter_fraction: DEFAULT_JITTER_FRACTION,
        }
    }
}

/// Land valuation of a single point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Zone rate (or mean of overlapping zone rates) before jitter.
    pub rate_per_sq_ft: f64,
    pub land_value_usd: f64,
    pub neighborhood: String,
}

#[derive(Debug, Clone)]
pub struct Appraiser {
    table: ZoneTable,
    config: AppraisalConfig,
}

impl Appraiser {
    pub fn new(table: ZoneTable, config: AppraisalConfig) -> Self {
        Self { table, config }
    }

    /// Appraiser over the built-in zone table.
    pub fn builtin(config: AppraisalConfig) -> Result<Self, DataError> {
        Ok(Self::new(ZoneTable::builtin()?.clone(), config))
    }

    pub fn config(&self) -> AppraisalConfig {
        self.config
    }

    pub fn table(&self) -> &ZoneTable {
        &self.table
    }

    /// Values the quantized cell containing `(lat, lng)`.
    ///
    /// Zone lookup and jitter both use the cell center, so any two points in
    /// one cell get the same valuation even across a zone edge.
    pub fn valuate(&self, lat: f64, lng: f64) -> Valuation {
        let cell = snap(lat, lng, self.config.grid_deg);
        let mut rng = cell_rng(cell.lat, cell.lng, self.config.grid_deg, Stream::LandValue);
        self.valuate_with(cell.lat, cell.lng, &mut rng)
    }

    /// Values exactly `(lat, lng)` with an explicit jitter source.
    pub fn valuate_with<R: Rng + ?Sized>(&self, lat: f64, lng: f64, rng: &mut R) -> Valuation {
        let (rate, neighborhood) = self.table.rate_and_label(LatLng::new(lat, lng));
        let u: f64 = rng.r#gen();
        let jitter = 1.0 + (2.0 * u - 1.0) * self.config.jitter_fraction;
        let raw = rate * jitter * self.config.footprint_sq_ft * self.config.soft_cost_multiplier;

        Valuation {
            rate_per_sq_ft: rate,
            land_value_usd: (raw / LAND_VALUE_ROUNDING_USD).round() * LAND_VALUE_ROUNDING_USD,
            neighborhood,
        }
    }
}
