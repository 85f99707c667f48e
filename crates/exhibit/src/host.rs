use projection::{CameraPose, HostProjection, Viewport};
use serde::{Deserialize, Serialize};

/// Camera animation request handed to the host engine.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyTo {
    pub end_camera: CameraPose,
    /// Altitude of the orbit center above sea level.
    pub center_altitude_m: f64,
    pub duration_ms: u32,
}

/// The host 3D map engine.
///
/// The engine owns the camera and may change it between any two calls, so
/// the session re-reads `camera()` every time it needs a pose.
pub trait MapHost {
    /// Current camera, or `None` when the engine has none to offer.
    fn camera(&self) -> Option<CameraPose>;

    fn viewport(&self) -> Viewport;

    /// The engine's exact transform, when it has attached one.
    fn exact_projection(&self) -> Option<&dyn HostProjection>;

    fn fly_camera_to(&mut self, request: FlyTo);
}
