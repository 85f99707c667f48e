use foundation::math::{LatLng, bearing_degrees, distance_meters, normalize_degrees};
use projection::CameraPose;

use crate::{FlyTo, VisitConfig};

/// Camera move for visiting `target`.
///
/// The camera orbits `target` at close range. When `reference` lies within
/// the framing band, the camera faces it across the target, offset by the
/// configured heading so the two don't overlap; otherwise `fallback_heading`
/// is kept.
pub fn plan_visit(
    target: LatLng,
    reference: Option<LatLng>,
    fallback_heading_deg: f64,
    config: &VisitConfig,
) -> FlyTo {
    let framed = reference.filter(|r| {
        let d = distance_meters(target, *r);
        d >= config.reference_min_m && d <= config.reference_max_m
    });
    let heading_deg = match framed {
        Some(r) => normalize_degrees(bearing_degrees(target, r) + config.heading_offset_deg),
        None => normalize_degrees(fallback_heading_deg),
    };
    FlyTo {
        end_camera: CameraPose::new(target, heading_deg, config.tilt_deg, config.range_m),
        center_altitude_m: config.altitude_m,
        duration_ms: config.duration_ms,
    }
}
