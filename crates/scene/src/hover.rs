use foundation::LandmarkId;
use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{LatLng, distance_meters};
use serde::{Deserialize, Serialize};

/// Ground radius within which the pointer is over a landmark's footprint.
pub const DEFAULT_CAPTURE_RADIUS_M: f64 = 122.0;

/// Radius within which the nearest landmark is offered as a hint.
pub const DEFAULT_HINT_RADIUS_M: f64 = 4.0 * DEFAULT_CAPTURE_RADIUS_M;

/// A challenger must be closer than this fraction of the locked hint's
/// distance to take over. Lower values are steadier but slower to follow.
pub const DEFAULT_HYSTERESIS_RATIO: f64 = 0.75;

/// Anything with an id and a ground position can be hovered.
pub trait Anchor {
    fn anchor_id(&self) -> LandmarkId;
    fn anchor_position(&self) -> LatLng;
}

impl Anchor for (LandmarkId, LatLng) {
    fn anchor_id(&self) -> LandmarkId {
        self.0
    }

    fn anchor_position(&self) -> LatLng {
        self.1
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub capture_radius_m: f64,
    pub hint_radius_m: f64,
    pub hysteresis_ratio: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            capture_radius_m: DEFAULT_CAPTURE_RADIUS_M,
            hint_radius_m: DEFAULT_HINT_RADIUS_M,
            hysteresis_ratio: DEFAULT_HYSTERESIS_RATIO,
        }
    }
}

/// Transient hover state for one pointer sample.
///
/// At most one of the two is set: a hint is only offered while nothing is
/// hovered.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverSelection {
    pub hovered: Option<LandmarkId>,
    pub hint: Option<LandmarkId>,
}

impl HoverSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hovered(id: LandmarkId) -> Self {
        Self {
            hovered: Some(id),
            hint: None,
        }
    }

    pub fn hint(id: LandmarkId) -> Self {
        Self {
            hovered: None,
            hint: Some(id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hovered.is_none() && self.hint.is_none()
    }

    /// Drops any reference to `id`.
    pub fn forget(&mut self, id: LandmarkId) {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        if self.hint == Some(id) {
            self.hint = None;
        }
    }
}

/// Where the pointer is, as far as hover resolution cares.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Pointer {
    /// Over UI chrome, outside the viewport, or not projectable.
    OffSurface,
    /// Over the action menu of the currently hovered landmark.
    OverMenu,
    /// Over the map at this ground position.
    Ground(LatLng),
}

/// Nearest anchor to `point` as `(id, distance_m)`.
///
/// Ties resolve to the lower id so results don't depend on slice order.
pub fn nearest<A: Anchor>(point: LatLng, anchors: &[A]) -> Option<(LandmarkId, f64)> {
    anchors
        .iter()
        .map(|a| (a.anchor_id(), distance_meters(point, a.anchor_position())))
        .min_by(|(ia, da), (ib, db)| stable_total_cmp_f64(*da, *db).then_with(|| ia.cmp(ib)))
}

/// Resolves hover and hint for a pointer sample.
///
/// - Off-surface pointers clear both immediately.
/// - Over the action menu, the current hover is kept while its landmark exists.
/// - On the ground, the nearest landmark strictly inside the capture radius is
///   hovered. Otherwise the nearest landmark inside the hint radius becomes the
///   hint, but a locked hint only yields to a challenger closer than
///   `hysteresis_ratio` times the locked landmark's distance.
pub fn resolve_hover<A: Anchor>(
    pointer: Pointer,
    anchors: &[A],
    config: &HoverConfig,
    previous: HoverSelection,
) -> HoverSelection {
    if anchors.is_empty() {
        return HoverSelection::none();
    }

    let point = match pointer {
        Pointer::OffSurface => return HoverSelection::none(),
        Pointer::OverMenu => {
            let still_there = previous
                .hovered
                .filter(|id| anchors.iter().any(|a| a.anchor_id() == *id));
            return HoverSelection {
                hovered: still_there,
                hint: None,
            };
        }
        Pointer::Ground(p) => p,
    };

    let Some((best_id, best_d)) = nearest(point, anchors) else {
        return HoverSelection::none();
    };

    if best_d < config.capture_radius_m {
        return HoverSelection::hovered(best_id);
    }
    if best_d >= config.hint_radius_m {
        return HoverSelection::none();
    }

    let locked = previous.hint.and_then(|id| {
        anchors
            .iter()
            .find(|a| a.anchor_id() == id)
            .map(|a| (id, distance_meters(point, a.anchor_position())))
            .filter(|(_, d)| *d < config.hint_radius_m)
    });

    let hint = match locked {
        None => best_id,
        Some((locked_id, _)) if locked_id == best_id => locked_id,
        Some((locked_id, locked_d)) => {
            if best_d < config.hysteresis_ratio * locked_d {
                best_id
            } else {
                locked_id
            }
        }
    };
    HoverSelection::hint(hint)
}

#[cfg(test)]
mod tests {
    use super::{HoverConfig, HoverSelection, Pointer, nearest, resolve_hover};
    use foundation::LandmarkId;
    use foundation::math::{LatLng, destination_point, distance_meters};
    use pretty_assertions::assert_eq;

    const ORIGIN: LatLng = LatLng::new(40.7, -74.0);

    fn id(n: u32) -> LandmarkId {
        LandmarkId::new(n)
    }

    fn at(bearing: f64, meters: f64) -> LatLng {
        destination_point(ORIGIN, bearing, meters)
    }

    #[test]
    fn empty_landmarks_resolve_to_nothing() {
        let none: [(LandmarkId, LatLng); 0] = [];
        let sel = resolve_hover(
            Pointer::Ground(ORIGIN),
            &none,
            &HoverConfig::default(),
            HoverSelection::hint(id(1)),
        );
        assert_eq!(sel, HoverSelection::none());
    }

    #[test]
    fn capture_radius_is_strict() {
        let anchors = [(id(1), at(90.0, 100.0))];
        let d = distance_meters(ORIGIN, anchors[0].1);

        let on_boundary = HoverConfig {
            capture_radius_m: d,
            ..HoverConfig::default()
        };
        let sel = resolve_hover(
            Pointer::Ground(ORIGIN),
            &anchors,
            &on_boundary,
            HoverSelection::none(),
        );
        assert_eq!(sel.hovered, None);

        let just_inside = HoverConfig {
            capture_radius_m: d + 1e-6,
            ..HoverConfig::default()
        };
        let sel = resolve_hover(
            Pointer::Ground(ORIGIN),
            &anchors,
            &just_inside,
            HoverSelection::none(),
        );
        assert_eq!(sel, HoverSelection::hovered(id(1)));
    }

    #[test]
    fn hover_suppresses_hint() {
        let anchors = [(id(1), at(0.0, 50.0)), (id(2), at(180.0, 300.0))];
        let sel = resolve_hover(
            Pointer::Ground(ORIGIN),
            &anchors,
            &HoverConfig::default(),
            HoverSelection::hint(id(2)),
        );
        assert_eq!(sel, HoverSelection::hovered(id(1)));
    }

    #[test]
    fn hint_is_sticky_inside_dead_zone() {
        // d1 = 200 m, d2 = 215 m (< 1.1 * d1), both outside the capture radius.
        let anchors = [(id(1), at(0.0, 200.0)), (id(2), at(180.0, 215.0))];
        let cfg = HoverConfig::default();

        let first = resolve_hover(
            Pointer::Ground(ORIGIN),
            &anchors,
            &cfg,
            HoverSelection::none(),
        );
        assert_eq!(first, HoverSelection::hint(id(1)));

        // Drift 20 m south: landmark 2 is now nearer (195 m vs 220 m) but not
        // by enough to take over.
        let drifted = destination_point(ORIGIN, 180.0, 20.0);
        let second = resolve_hover(Pointer::Ground(drifted), &anchors, &cfg, first);
        assert_eq!(second, HoverSelection::hint(id(1)));

        // Without a lock the nearer one would win.
        let fresh = resolve_hover(
            Pointer::Ground(drifted),
            &anchors,
            &cfg,
            HoverSelection::none(),
        );
        assert_eq!(fresh, HoverSelection::hint(id(2)));
    }

    #[test]
    fn hint_switches_past_threshold() {
        let anchors = [(id(1), at(0.0, 200.0)), (id(2), at(180.0, 215.0))];
        let cfg = HoverConfig::default();
        let locked = HoverSelection::hint(id(1));

        // 60 m south: d1 = 260 m, d2 = 155 m < 0.75 * 260 m.
        let moved = destination_point(ORIGIN, 180.0, 60.0);
        let sel = resolve_hover(Pointer::Ground(moved), &anchors, &cfg, locked);
        assert_eq!(sel, HoverSelection::hint(id(2)));
    }

    #[test]
    fn hint_beyond_radius_is_dropped() {
        let anchors = [(id(1), at(0.0, 2_000.0))];
        let sel = resolve_hover(
            Pointer::Ground(ORIGIN),
            &anchors,
            &HoverConfig::default(),
            HoverSelection::hint(id(1)),
        );
        assert_eq!(sel, HoverSelection::none());
    }

    #[test]
    fn off_surface_clears_regardless_of_hysteresis() {
        let anchors = [(id(1), at(0.0, 10.0))];
        let sel = resolve_hover(
            Pointer::OffSurface,
            &anchors,
            &HoverConfig::default(),
            HoverSelection::hovered(id(1)),
        );
        assert_eq!(sel, HoverSelection::none());
    }

    #[test]
    fn menu_keeps_existing_hover_only() {
        let anchors = [(id(1), at(0.0, 10.0))];
        let cfg = HoverConfig::default();
        let kept = resolve_hover(Pointer::OverMenu, &anchors, &cfg, HoverSelection::hovered(id(1)));
        assert_eq!(kept, HoverSelection::hovered(id(1)));

        let gone = resolve_hover(Pointer::OverMenu, &anchors, &cfg, HoverSelection::hovered(id(9)));
        assert_eq!(gone, HoverSelection::none());
    }

    #[test]
    fn nearest_ties_break_by_id() {
        let p = at(90.0, 150.0);
        let anchors = [(id(5), p), (id(3), p)];
        let (best, _) = nearest(ORIGIN, &anchors).expect("nearest");
        assert_eq!(best, id(3));
    }

    #[test]
    fn forget_clears_matching_ids() {
        let mut sel = HoverSelection::hovered(id(4));
        sel.forget(id(5));
        assert_eq!(sel, HoverSelection::hovered(id(4)));
        sel.forget(id(4));
        assert!(sel.is_empty());
    }
}
