use foundation::LandmarkId;
use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{LatLng, bearing_degrees, distance_meters};
use scene::Landmark;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{DEFAULT_REFERENCE_MIN_M, PostcardConfig, PostcardFailure};

/// Identifies one postcard attempt. Later tickets compare greater.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostcardTicket(u64);

impl PostcardTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyLandmark {
    pub id: LandmarkId,
    pub position: LatLng,
    /// Bearing from the visited landmark.
    pub bearing_deg: f64,
    pub distance_m: f64,
    pub neighborhood: String,
}

/// What the image generator is told about the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcardRequest {
    pub visited_id: LandmarkId,
    pub visited: LatLng,
    pub neighborhood: String,
    /// The original statue's position.
    pub reference: LatLng,
    pub heading_deg: f64,
    /// The original only belongs in the picture from at least this far away.
    #[serde(default = "default_reference_min_m")]
    pub reference_min_m: f64,
    pub nearby: Vec<NearbyLandmark>,
}

fn default_reference_min_m() -> f64 {
    DEFAULT_REFERENCE_MIN_M
}

/// Landmarks around `visited` within the configured radius, nearest first.
pub fn nearby_landmarks<'a>(
    visited: &Landmark,
    landmarks: impl IntoIterator<Item = &'a Landmark>,
    config: &PostcardConfig,
) -> Vec<NearbyLandmark> {
    let origin = visited.lat_lng();
    let mut nearby: Vec<NearbyLandmark> = landmarks
        .into_iter()
        .filter(|l| l.id != visited.id)
        .filter_map(|l| {
            let distance_m = distance_meters(origin, l.lat_lng());
            (distance_m <= config.nearby_radius_m).then(|| NearbyLandmark {
                id: l.id,
                position: l.lat_lng(),
                bearing_deg: bearing_degrees(origin, l.lat_lng()),
                distance_m,
                neighborhood: l.neighborhood_label.clone(),
            })
        })
        .collect();
    nearby.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance_m, b.distance_m).then_with(|| a.id.cmp(&b.id))
    });
    nearby.truncate(config.max_nearby);
    nearby
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcardImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PostcardState {
    #[default]
    Idle,
    Pending { ticket: PostcardTicket },
    Ready { ticket: PostcardTicket, image: PostcardImage },
    Unavailable { ticket: PostcardTicket, reason: PostcardFailure },
}

/// Tracks the single live postcard attempt.
///
/// Starting a new attempt or dismissing cancels the previous one; results
/// for any ticket but the pending one are discarded.
#[derive(Debug, Default)]
pub struct PostcardDesk {
    next: u64,
    state: PostcardState,
}

impl PostcardDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PostcardState {
        &self.state
    }

    /// The ticket whose result is still awaited.
    pub fn pending(&self) -> Option<PostcardTicket> {
        match self.state {
            PostcardState::Pending { ticket } => Some(ticket),
            _ => None,
        }
    }

    /// Opens a new attempt; returns its ticket and the one it superseded.
    pub fn begin(&mut self) -> (PostcardTicket, Option<PostcardTicket>) {
        self.next += 1;
        let ticket = PostcardTicket(self.next);
        let superseded = self.pending();
        if let Some(old) = superseded {
            debug!(ticket = old.get(), "postcard superseded");
        }
        self.state = PostcardState::Pending { ticket };
        (ticket, superseded)
    }

    /// Records a result. Returns false when `ticket` is stale.
    pub fn complete(
        &mut self,
        ticket: PostcardTicket,
        result: Result<PostcardImage, PostcardFailure>,
    ) -> bool {
        if self.pending() != Some(ticket) {
            debug!(ticket = ticket.get(), "discarding stale postcard result");
            return false;
        }
        self.state = match result {
            Ok(image) => PostcardState::Ready { ticket, image },
            Err(reason) => {
                warn!(ticket = ticket.get(), "postcard unavailable: {reason}");
                PostcardState::Unavailable { ticket, reason }
            }
        };
        true
    }

    /// Closes the postcard view; returns the ticket to abort, if pending.
    pub fn dismiss(&mut self) -> Option<PostcardTicket> {
        let pending = self.pending();
        self.state = PostcardState::Idle;
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::{GeoPoint, destination_point};
    use pretty_assertions::assert_eq;
    use valuation::{Classification, ClassificationSource, SurfaceKind};

    fn landmark(id: u32, at: LatLng) -> Landmark {
        Landmark {
            id: LandmarkId::new(id),
            position: GeoPoint::ground(at.lat, at.lng),
            neighborhood_label: format!("n{id}"),
            land_value_usd: 0.0,
            rate_per_sq_ft: 0.0,
            tourism_revenue_usd: 0.0,
            classification: Classification {
                surface: SurfaceKind::Land,
                source: ClassificationSource::BoundingBox,
                district: None,
            },
        }
    }

    fn image() -> PostcardImage {
        PostcardImage {
            content_type: "image/png".into(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn nearby_is_sorted_filtered_and_capped() {
        let origin = LatLng::new(40.70, -74.01);
        let visited = landmark(1, origin);
        let mut all = vec![visited.clone()];
        for (i, d) in [2_500.0, 400.0, 5_000.0, 1_200.0].into_iter().enumerate() {
            all.push(landmark(10 + i as u32, destination_point(origin, 90.0, d)));
        }

        let cfg = PostcardConfig {
            nearby_radius_m: 3_000.0,
            max_nearby: 2,
        };
        let nearby = nearby_landmarks(&visited, &all, &cfg);
        let ids: Vec<u32> = nearby.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![11, 13]);
        assert!((nearby[0].bearing_deg - 90.0).abs() < 1e-6);
        assert!((nearby[0].distance_m - 400.0).abs() < 1e-3);
    }

    #[test]
    fn stale_tickets_are_discarded() {
        let mut desk = PostcardDesk::new();
        let (first, none) = desk.begin();
        assert_eq!(none, None);
        let (second, superseded) = desk.begin();
        assert_eq!(superseded, Some(first));
        assert!(second > first);

        assert!(!desk.complete(first, Ok(image())));
        assert_eq!(desk.state(), &PostcardState::Pending { ticket: second });

        assert!(desk.complete(second, Err(PostcardFailure::Timeout)));
        assert_eq!(
            desk.state(),
            &PostcardState::Unavailable {
                ticket: second,
                reason: PostcardFailure::Timeout
            }
        );
        // Already settled.
        assert!(!desk.complete(second, Ok(image())));
    }

    #[test]
    fn dismiss_cancels_pending() {
        let mut desk = PostcardDesk::new();
        let (ticket, _) = desk.begin();
        assert_eq!(desk.dismiss(), Some(ticket));
        assert_eq!(desk.state(), &PostcardState::Idle);
        assert!(!desk.complete(ticket, Ok(image())));
        assert_eq!(desk.dismiss(), None);
    }
}
