use std::collections::BTreeMap;

use foundation::math::{GeoPoint, LatLng};
use foundation::{IdAllocator, LandmarkId};
use serde::{Deserialize, Serialize};
use valuation::Classification;

use crate::Anchor;

/// Id of the pre-existing landmark every session starts with.
pub const SENTINEL_ID: LandmarkId = LandmarkId::new(0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub position: GeoPoint,
    pub neighborhood_label: String,
    pub land_value_usd: f64,
    pub rate_per_sq_ft: f64,
    pub tourism_revenue_usd: f64,
    /// Best current land/water guess; refined when an elevation arrives.
    pub classification: Classification,
}

impl Landmark {
    pub fn lat_lng(&self) -> LatLng {
        self.position.lat_lng()
    }
}

impl Anchor for Landmark {
    fn anchor_id(&self) -> LandmarkId {
        self.id
    }

    fn anchor_position(&self) -> LatLng {
        self.position.lat_lng()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    Unknown(LandmarkId),
    Sentinel,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Unknown(id) => write!(f, "no landmark {id}"),
            RegistryError::Sentinel => write!(f, "the original landmark cannot be changed"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Session landmarks keyed by id, always containing the sentinel.
#[derive(Debug, Clone)]
pub struct LandmarkRegistry {
    landmarks: BTreeMap<LandmarkId, Landmark>,
    ids: IdAllocator,
}

impl LandmarkRegistry {
    /// Starts a registry holding only `sentinel`, whose id is forced to
    /// [`SENTINEL_ID`].
    pub fn new(mut sentinel: Landmark) -> Self {
        sentinel.id = SENTINEL_ID;
        let mut landmarks = BTreeMap::new();
        landmarks.insert(SENTINEL_ID, sentinel);
        Self {
            landmarks,
            ids: IdAllocator::starting_at(SENTINEL_ID.get() + 1),
        }
    }

    pub fn is_sentinel(&self, id: LandmarkId) -> bool {
        id == SENTINEL_ID
    }

    pub fn sentinel(&self) -> Option<&Landmark> {
        self.landmarks.get(&SENTINEL_ID)
    }

    /// Assigns the next id and stores the landmark built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(LandmarkId) -> Landmark) -> LandmarkId {
        let id = self.ids.allocate();
        let mut landmark = build(id);
        landmark.id = id;
        self.landmarks.insert(id, landmark);
        id
    }

    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.landmarks.get(&id)
    }

    pub fn contains(&self, id: LandmarkId) -> bool {
        self.landmarks.contains_key(&id)
    }

    /// Mutable access to a placed landmark. The sentinel is read-only.
    pub fn get_mut(&mut self, id: LandmarkId) -> Result<&mut Landmark, RegistryError> {
        if self.is_sentinel(id) {
            return Err(RegistryError::Sentinel);
        }
        self.landmarks.get_mut(&id).ok_or(RegistryError::Unknown(id))
    }

    pub fn remove(&mut self, id: LandmarkId) -> Result<Landmark, RegistryError> {
        if self.is_sentinel(id) {
            return Err(RegistryError::Sentinel);
        }
        self.landmarks.remove(&id).ok_or(RegistryError::Unknown(id))
    }

    /// Removes every placed landmark; returns how many went.
    pub fn clear_placed(&mut self) -> usize {
        let before = self.landmarks.len();
        self.landmarks.retain(|id, _| *id == SENTINEL_ID);
        before - self.landmarks.len()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// All landmarks in id order, sentinel first.
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.values()
    }

    /// Landmarks other than the sentinel.
    pub fn placed(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.values().filter(|l| l.id != SENTINEL_ID)
    }

    pub fn anchors(&self) -> Vec<(LandmarkId, LatLng)> {
        self.landmarks.values().map(|l| (l.id, l.lat_lng())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use valuation::{ClassificationSource, SurfaceKind};

    fn landmark(lat: f64, lng: f64) -> Landmark {
        Landmark {
            id: LandmarkId::new(99),
            position: GeoPoint::ground(lat, lng),
            neighborhood_label: "Somewhere".into(),
            land_value_usd: 1.0,
            rate_per_sq_ft: 1.0,
            tourism_revenue_usd: 1.0,
            classification: Classification {
                surface: SurfaceKind::Land,
                source: ClassificationSource::BoundingBox,
                district: None,
            },
        }
    }

    #[test]
    fn sentinel_is_forced_to_id_zero_and_protected() {
        let mut reg = LandmarkRegistry::new(landmark(40.689247, -74.044502));
        assert_eq!(reg.sentinel().map(|l| l.id), Some(SENTINEL_ID));
        assert_eq!(reg.remove(SENTINEL_ID), Err(RegistryError::Sentinel));
        assert!(matches!(reg.get_mut(SENTINEL_ID), Err(RegistryError::Sentinel)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn ids_are_monotonic_and_not_reused() {
        let mut reg = LandmarkRegistry::new(landmark(40.0, -74.0));
        let a = reg.insert_with(|_| landmark(40.1, -74.0));
        let b = reg.insert_with(|_| landmark(40.2, -74.0));
        assert_eq!(a, LandmarkId::new(1));
        assert_eq!(b, LandmarkId::new(2));
        assert_eq!(reg.get(a).map(|l| l.id), Some(a));

        reg.remove(b).unwrap();
        let c = reg.insert_with(|_| landmark(40.3, -74.0));
        assert_eq!(c, LandmarkId::new(3));
        assert_eq!(reg.remove(b), Err(RegistryError::Unknown(b)));
    }

    #[test]
    fn clear_placed_keeps_sentinel() {
        let mut reg = LandmarkRegistry::new(landmark(40.0, -74.0));
        reg.insert_with(|_| landmark(40.1, -74.0));
        reg.insert_with(|_| landmark(40.2, -74.0));
        assert_eq!(reg.clear_placed(), 2);
        assert_eq!(reg.iter().map(|l| l.id).collect::<Vec<_>>(), vec![SENTINEL_ID]);
        assert_eq!(reg.placed().count(), 0);
    }
}
