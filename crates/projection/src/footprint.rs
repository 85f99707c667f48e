use foundation::math::{LatLng, destination_point};

use crate::{CameraPose, Projector, ScreenPoint, Viewport};

/// Projects a ground circle of `radius_m` around `center` into screen space.
///
/// Vertices the projector can't place are skipped, so the ring may have fewer
/// than `segments` points (or none).
pub fn footprint_ring<P: Projector + ?Sized>(
    projector: &P,
    pose: &CameraPose,
    viewport: Viewport,
    center: LatLng,
    radius_m: f64,
    segments: usize,
) -> Vec<ScreenPoint> {
    let segments = segments.max(3);
    (0..segments)
        .filter_map(|i| {
            let bearing = 360.0 * i as f64 / segments as f64;
            let ground = destination_point(center, bearing, radius_m);
            projector.geo_to_screen(pose, viewport, ground.with_altitude(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::footprint_ring;
    use crate::{CameraPose, CameraRelativeProjector, Projector, Viewport};
    use foundation::math::LatLng;

    #[test]
    fn ring_surrounds_projected_center() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(900.0, 900.0);
        let pose = CameraPose::new(LatLng::new(40.7, -74.02), 0.0, 0.0, 3000.0);
        let ring = footprint_ring(&p, &pose, vp, pose.center, 122.0, 24);
        assert_eq!(ring.len(), 24);

        let c = vp.center();
        let mpp = p.meters_per_pixel(&pose, vp);
        for v in &ring {
            let r_px = v.distance_to(c);
            assert!((r_px * mpp - 122.0).abs() < 1.0, "radius {}", r_px * mpp);
        }
    }

    #[test]
    fn degenerate_segment_count_is_raised() {
        let p = CameraRelativeProjector::default();
        let vp = Viewport::new(900.0, 900.0);
        let pose = CameraPose::new(LatLng::new(40.7, -74.02), 0.0, 0.0, 3000.0);
        let ring = footprint_ring(&p, &pose, vp, pose.center, 50.0, 0);
        assert_eq!(ring.len(), 3);
        assert!(
            ring.iter()
                .all(|v| p.screen_to_geo(&pose, vp, *v).is_some())
        );
    }
}
