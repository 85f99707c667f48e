use foundation::math::LatLng;
use projection::{Calibration, CameraPose};
use scene::HoverConfig;
use serde::{Deserialize, Serialize};
use valuation::{AppraisalConfig, TourismConfig};

use crate::ExhibitError;

/// The real statue the session starts with.
pub const SENTINEL_POSITION: LatLng = LatLng::new(40.689247, -74.044502);

pub const DEFAULT_POSE: CameraPose = CameraPose {
    center: LatLng::new(40.7000, -74.0200),
    heading_deg: 30.0,
    tilt_deg: 60.0,
    range_m: 6000.0,
};

pub const DEFAULT_RESET_DURATION_MS: u32 = 2000;

/// Closer than this, the original is too near to frame or mention.
pub const DEFAULT_REFERENCE_MIN_M: f64 = 150.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitConfig {
    /// Camera target altitude above sea level.
    pub altitude_m: f64,
    pub range_m: f64,
    pub tilt_deg: f64,
    /// Added to the bearing towards the reference so it sits off-center.
    pub heading_offset_deg: f64,
    /// The reference is framed only between these distances.
    pub reference_min_m: f64,
    pub reference_max_m: f64,
    pub duration_ms: u32,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            altitude_m: 60.0,
            range_m: 350.0,
            tilt_deg: 72.0,
            heading_offset_deg: 18.0,
            reference_min_m: DEFAULT_REFERENCE_MIN_M,
            reference_max_m: 9_000.0,
            duration_ms: 2500,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostcardConfig {
    pub nearby_radius_m: f64,
    pub max_nearby: usize,
}

impl Default for PostcardConfig {
    fn default() -> Self {
        Self {
            nearby_radius_m: 3_000.0,
            max_nearby: 8,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionConfig {
    pub base_cost_usd: f64,
    /// Multiplier for marine foundations when a landmark stands in water.
    pub water_premium: f64,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            base_cost_usd: 85_000_000.0,
            water_premium: 1.4,
        }
    }
}

/// Every tunable of a session.
///
/// Deserializes from partial JSON; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhibitConfig {
    pub calibration: Calibration,
    pub hover: HoverConfig,
    pub appraisal: AppraisalConfig,
    pub tourism: TourismConfig,
    pub construction: ConstructionConfig,
    pub sentinel: LatLng,
    pub default_pose: CameraPose,
    pub reset_duration_ms: u32,
    pub visit: VisitConfig,
    pub postcard: PostcardConfig,
    /// Vertices in the projected footprint ring.
    pub footprint_segments: usize,
    pub journal_capacity: usize,
}

impl Default for ExhibitConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            hover: HoverConfig::default(),
            appraisal: AppraisalConfig::default(),
            tourism: TourismConfig::default(),
            construction: ConstructionConfig::default(),
            sentinel: SENTINEL_POSITION,
            default_pose: DEFAULT_POSE,
            reset_duration_ms: DEFAULT_RESET_DURATION_MS,
            visit: VisitConfig::default(),
            postcard: PostcardConfig::default(),
            footprint_segments: 48,
            journal_capacity: 256,
        }
    }
}

fn positive(name: &str, v: f64) -> Result<(), ExhibitError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ExhibitError::Config(format!("{name} must be positive, got {v}")))
    }
}

impl ExhibitConfig {
    pub fn from_json(json: &str) -> Result<Self, ExhibitError> {
        let config: ExhibitConfig =
            serde_json::from_str(json).map_err(|e| ExhibitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExhibitError> {
        positive("calibration.range_scale", self.calibration.range_scale)?;
        let c = self.calibration.min_tilt_cos;
        if !(c > 0.0 && c <= 1.0) {
            return Err(ExhibitError::Config(format!(
                "calibration.min_tilt_cos must be in (0, 1], got {c}"
            )));
        }

        positive("hover.capture_radius_m", self.hover.capture_radius_m)?;
        positive("hover.hint_radius_m", self.hover.hint_radius_m)?;
        if self.hover.hint_radius_m < self.hover.capture_radius_m {
            return Err(ExhibitError::Config(
                "hover.hint_radius_m must not be smaller than the capture radius".into(),
            ));
        }
        let r = self.hover.hysteresis_ratio;
        if !(r > 0.0 && r <= 1.0) {
            return Err(ExhibitError::Config(format!(
                "hover.hysteresis_ratio must be in (0, 1], got {r}"
            )));
        }

        positive("appraisal.grid_deg", self.appraisal.grid_deg)?;
        positive("appraisal.footprint_sq_ft", self.appraisal.footprint_sq_ft)?;
        positive("appraisal.soft_cost_multiplier", self.appraisal.soft_cost_multiplier)?;
        let j = self.appraisal.jitter_fraction;
        if !(0.0..1.0).contains(&j) {
            return Err(ExhibitError::Config(format!(
                "appraisal.jitter_fraction must be in [0, 1), got {j}"
            )));
        }

        positive("tourism.grid_deg", self.tourism.grid_deg)?;
        positive("tourism.decay_distance_m", self.tourism.decay_distance_m)?;
        let f = self.tourism.decay_floor;
        if !(f > 0.0 && f <= 1.0) {
            return Err(ExhibitError::Config(format!(
                "tourism.decay_floor must be in (0, 1], got {f}"
            )));
        }
        for (name, (lo, hi)) in [
            ("tourism.inside_range_usd", self.tourism.inside_range_usd),
            ("tourism.outside_range_usd", self.tourism.outside_range_usd),
        ] {
            if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi) {
                return Err(ExhibitError::Config(format!("{name} must be 0 <= lo <= hi")));
            }
        }

        let base = self.construction.base_cost_usd;
        if !(base.is_finite() && base >= 0.0) {
            return Err(ExhibitError::Config(
                "construction.base_cost_usd must be non-negative".into(),
            ));
        }
        positive("construction.water_premium", self.construction.water_premium)?;

        if !self.sentinel.is_finite() {
            return Err(ExhibitError::Config("sentinel position must be finite".into()));
        }
        if !self.default_pose.is_usable() {
            return Err(ExhibitError::Config("default_pose is not usable".into()));
        }

        positive("visit.range_m", self.visit.range_m)?;
        if !(self.visit.reference_min_m <= self.visit.reference_max_m) {
            return Err(ExhibitError::Config(
                "visit.reference_min_m must not exceed visit.reference_max_m".into(),
            ));
        }
        positive("postcard.nearby_radius_m", self.postcard.nearby_radius_m)?;
        if self.footprint_segments < 3 {
            return Err(ExhibitError::Config("footprint_segments must be at least 3".into()));
        }
        if self.journal_capacity == 0 {
            return Err(ExhibitError::Config("journal_capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn projector(&self) -> projection::CameraRelativeProjector {
        projection::CameraRelativeProjector::new(self.calibration)
    }
}
