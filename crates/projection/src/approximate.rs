use foundation::math::{GeoPoint, LocalOffset, lat_lng_to_offset, offset_to_lat_lng};
use serde::{Deserialize, Serialize};

use crate::{CameraPose, Projector, ScreenPoint, Viewport};

/// Empirical ground-meters-per-pixel scale relative to `range / min(w, h)`.
///
/// Calibrated against the host engine's field of view rather than derived; a
/// different renderer needs recalibration.
pub const DEFAULT_RANGE_SCALE: f64 = 0.83;

/// Lower clamp for `cos(tilt)` in the vertical foreshortening correction.
pub const DEFAULT_MIN_TILT_COS: f64 = 0.2;

/// Tunables for the camera-relative approximation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub range_scale: f64,
    pub min_tilt_cos: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            range_scale: DEFAULT_RANGE_SCALE,
            min_tilt_cos: DEFAULT_MIN_TILT_COS,
        }
    }
}

/// Flat-earth, small-angle screen/ground mapping around the camera center.
///
/// The viewport is treated as a tangent plane: pixel offsets from the
/// viewport center scale by `range * K / min(w, h)` meters, the vertical axis
/// is stretched by `1 / max(cos_clamp, cos(tilt))` for oblique views, and the
/// result is rotated by the camera heading before conversion to degrees.
///
/// Accuracy degrades as tilt approaches the horizon; the cosine clamp only
/// keeps the stretch finite.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CameraRelativeProjector {
    calibration: Calibration,
}

impl CameraRelativeProjector {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    /// Ground meters covered by one horizontal pixel at the view center.
    pub fn meters_per_pixel(&self, pose: &CameraPose, viewport: Viewport) -> f64 {
        pose.range_m * self.calibration.range_scale / viewport.min_dimension()
    }

    fn vertical_stretch(&self, pose: &CameraPose) -> f64 {
        let cos_tilt = pose.tilt_deg.to_radians().cos();
        1.0 / cos_tilt.max(self.calibration.min_tilt_cos)
    }

    fn usable(pose: &CameraPose, viewport: Viewport) -> bool {
        pose.is_usable() && viewport.is_usable()
    }
}

impl Projector for CameraRelativeProjector {
    fn screen_to_geo(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        screen: ScreenPoint,
    ) -> Option<GeoPoint> {
        if !Self::usable(pose, viewport) || !viewport.contains(screen) {
            return None;
        }

        let mpp = self.meters_per_pixel(pose, viewport);
        let c = viewport.center();
        // Screen y grows downward; the camera frame's "up" is forward.
        let right_m = (screen.x - c.x) * mpp;
        let forward_m = (c.y - screen.y) * mpp * self.vertical_stretch(pose);

        let ground = LocalOffset::new(right_m, forward_m).rotated_clockwise(pose.heading_deg);
        let ll = offset_to_lat_lng(pose.center, ground);
        Some(GeoPoint::ground(ll.lat, ll.lng))
    }

    fn geo_to_screen(
        &self,
        pose: &CameraPose,
        viewport: Viewport,
        point: GeoPoint,
    ) -> Option<ScreenPoint> {
        if !Self::usable(pose, viewport) || !point.is_finite() {
            return None;
        }

        let mpp = self.meters_per_pixel(pose, viewport);
        let c = viewport.center();
        let camera_frame =
            lat_lng_to_offset(pose.center, point.lat_lng()).rotated_clockwise(-pose.heading_deg);

        let x = c.x + camera_frame.east_m / mpp;
        let y = c.y - camera_frame.north_m / (mpp * self.vertical_stretch(pose));
        Some(ScreenPoint::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraRelativeProjector, Calibration};
    use crate::{CameraPose, Projector, ScreenPoint, Viewport};
    use foundation::math::{GeoPoint, LatLng, bearing_degrees, distance_meters};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn pose(heading: f64, tilt: f64, range: f64) -> CameraPose {
        CameraPose::new(LatLng::new(40.7, -74.02), heading, tilt, range)
    }

    #[test]
    fn viewport_center_maps_to_camera_center() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(1280.0, 720.0);
        let pose = pose(47.0, 63.0, 5000.0);
        let g = p.screen_to_geo(&pose, vp, vp.center()).expect("geo");
        assert_close(g.lat, 40.7, 1e-12);
        assert_close(g.lng, -74.02, 1e-12);
        assert_eq!(g.altitude_m, 0.0);
    }

    #[test]
    fn round_trip_over_tilts_headings_and_pixels() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(1024.0, 768.0);
        let pixels = [
            ScreenPoint::new(1.0, 1.0),
            ScreenPoint::new(512.0, 384.0),
            ScreenPoint::new(1000.5, 20.25),
            ScreenPoint::new(33.0, 760.0),
        ];
        for tilt in [0.0, 30.0, 60.0, 78.5, 85.0] {
            for heading in [0.0, 45.0, 137.0, 270.0, 359.0] {
                let pose = pose(heading, tilt, 4200.0);
                for px in pixels {
                    let g = p.screen_to_geo(&pose, vp, px).expect("geo");
                    let back = p.geo_to_screen(&pose, vp, g).expect("screen");
                    assert_close(back.x, px.x, 1e-6);
                    assert_close(back.y, px.y, 1e-6);
                }
            }
        }
    }

    #[test]
    fn screen_up_follows_heading() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(800.0, 800.0);
        let pose = pose(90.0, 0.0, 3000.0);
        let up = p
            .screen_to_geo(&pose, vp, ScreenPoint::new(400.0, 100.0))
            .expect("geo");
        let brg = bearing_degrees(pose.center, up.lat_lng());
        assert_close(brg, 90.0, 0.01);
    }

    #[test]
    fn scale_matches_range_and_calibration() {
        let p = CameraRelativeProjector::new(Calibration {
            range_scale: 1.0,
            min_tilt_cos: 0.2,
        });
        let vp = Viewport::new(1000.0, 500.0);
        let pose = pose(0.0, 0.0, 5000.0);
        // 10 m per pixel: 100 px to the right is ~1 km east.
        assert_close(p.meters_per_pixel(&pose, vp), 10.0, 1e-12);
        let g = p
            .screen_to_geo(&pose, vp, ScreenPoint::new(600.0, 250.0))
            .expect("geo");
        assert_close(distance_meters(pose.center, g.lat_lng()), 1000.0, 5.0);
    }

    #[test]
    fn tilt_stretches_vertical_axis_only() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(800.0, 800.0);
        let flat = pose(0.0, 0.0, 3000.0);
        let tilted = pose(0.0, 60.0, 3000.0);
        let px = ScreenPoint::new(400.0, 300.0);
        let d_flat = distance_meters(
            flat.center,
            p.screen_to_geo(&flat, vp, px).expect("geo").lat_lng(),
        );
        let d_tilted = distance_meters(
            tilted.center,
            p.screen_to_geo(&tilted, vp, px).expect("geo").lat_lng(),
        );
        assert_close(d_tilted / d_flat, 2.0, 1e-3);

        let side = ScreenPoint::new(500.0, 400.0);
        let s_flat = p.screen_to_geo(&flat, vp, side).expect("geo");
        let s_tilted = p.screen_to_geo(&tilted, vp, side).expect("geo");
        assert_close(s_flat.lng, s_tilted.lng, 1e-12);
    }

    #[test]
    fn near_horizon_tilt_is_clamped() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(800.0, 800.0);
        let px = ScreenPoint::new(400.0, 0.0);
        let at_89 = p.screen_to_geo(&pose(0.0, 89.9, 3000.0), vp, px).expect("geo");
        let at_85 = p.screen_to_geo(&pose(0.0, 85.0, 3000.0), vp, px).expect("geo");
        // Both beyond the clamp, so identical and finite.
        assert!(at_89.is_finite());
        assert_close(at_89.lat, at_85.lat, 1e-12);
    }

    #[test]
    fn rejects_outside_pixels_and_bad_poses() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(800.0, 600.0);
        let good = pose(0.0, 45.0, 3000.0);
        assert!(p.screen_to_geo(&good, vp, ScreenPoint::new(-1.0, 10.0)).is_none());
        assert!(p.screen_to_geo(&good, vp, ScreenPoint::new(10.0, 601.0)).is_none());

        let bad = CameraPose {
            range_m: f64::NAN,
            ..good
        };
        assert!(p.screen_to_geo(&bad, vp, vp.center()).is_none());
        assert!(
            p.geo_to_screen(&bad, vp, GeoPoint::ground(40.7, -74.0))
                .is_none()
        );
        assert!(
            p.screen_to_geo(&good, Viewport::new(0.0, 0.0), ScreenPoint::new(0.0, 0.0))
                .is_none()
        );
    }
}
