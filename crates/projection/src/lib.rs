//! Screen/geographic coordinate mapping under an orbiting, tiltable camera.
//!
//! Interaction code should only ever talk to [`ExactProjector`]; it prefers
//! the host engine's own projection and falls back to the
//! [`CameraRelativeProjector`] approximation, in both directions.

pub mod approximate;
pub mod camera;
pub mod exact;
pub mod footprint;

pub use approximate::*;
pub use camera::*;
pub use exact::*;
pub use footprint::*;

use foundation::math::GeoPoint;

/// Bidirectional screen <-> geographic mapping.
///
/// The pose is passed on every call; callers re-read it from the host each
/// time because user gestures can change it between events.
pub trait Projector {
    /// Maps a viewport pixel to the ground point under it.
    ///
    /// Returns `None` for pixels outside the viewport or an unusable pose.
    fn screen_to_geo(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        screen: ScreenPoint,
    ) -> Option<GeoPoint>;

    /// Maps a ground point to viewport pixels. The result may lie outside the
    /// viewport; callers clip as needed.
    fn geo_to_screen(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        point: GeoPoint,
    ) -> Option<ScreenPoint>;
}
