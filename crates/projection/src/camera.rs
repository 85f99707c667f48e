use foundation::math::LatLng;
use serde::{Deserialize, Serialize};

/// Orbit camera state as exposed by the host map engine.
///
/// `heading_deg` is the compass bearing the camera faces (screen "up"),
/// `tilt_deg` is 0 looking straight down and approaches 90 at the horizon,
/// `range_m` is the distance from the camera to `center`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub center: LatLng,
    pub heading_deg: f64,
    pub tilt_deg: f64,
    pub range_m: f64,
}

impl CameraPose {
    pub fn new(center: LatLng, heading_deg: f64, tilt_deg: f64, range_m: f64) -> Self {
        Self {
            center,
            heading_deg,
            tilt_deg,
            range_m,
        }
    }

    /// A pose is usable when every field is finite and the range is positive.
    pub fn is_usable(&self) -> bool {
        self.center.is_finite()
            && self.heading_deg.is_finite()
            && self.tilt_deg.is_finite()
            && self.range_m.is_finite()
            && self.range_m > 0.0
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 1.0 && self.height >= 1.0
    }

    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_dimension(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Inclusive bounds check; non-finite points are outside.
    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x.is_finite()
            && p.y.is_finite()
            && p.x >= 0.0
            && p.y >= 0.0
            && p.x <= self.width
            && p.y <= self.height
    }
}

/// Container-relative pixel position, origin top-left, y down.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
