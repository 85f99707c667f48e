use scene::Landmark;
use serde::{Deserialize, Serialize};

use crate::ConstructionConfig;

/// Running totals over placed landmarks. The original statue is not for
/// sale and is left out.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub landmarks: usize,
    pub land_cost_usd: f64,
    pub construction_cost_usd: f64,
    pub tourism_revenue_usd: f64,
}

impl Ledger {
    pub fn total_cost_usd(&self) -> f64 {
        self.land_cost_usd + self.construction_cost_usd
    }

    /// Years of tourism revenue needed to recoup the outlay.
    pub fn payback_years(&self) -> Option<f64> {
        (self.tourism_revenue_usd > 0.0).then(|| self.total_cost_usd() / self.tourism_revenue_usd)
    }
}

pub fn construction_cost(landmark: &Landmark, config: &ConstructionConfig) -> f64 {
    if landmark.classification.surface.is_water() {
        config.base_cost_usd * config.water_premium
    } else {
        config.base_cost_usd
    }
}

pub fn tally<'a>(
    placed: impl IntoIterator<Item = &'a Landmark>,
    config: &ConstructionConfig,
) -> Ledger {
    placed.into_iter().fold(Ledger::default(), |mut acc, l| {
        acc.landmarks += 1;
        acc.land_cost_usd += l.land_value_usd;
        acc.construction_cost_usd += construction_cost(l, config);
        acc.tourism_revenue_usd += l.tourism_revenue_usd;
        acc
    })
}
