use std::sync::{Arc, OnceLock, RwLock};

use foundation::math::LatLng;
use foundation::{GeoBounds, Ring};
use serde::Deserialize;

use crate::DataError;

const BUILTIN_NEIGHBORHOODS: &str = include_str!("../data/neighborhoods.json");

/// A named area made of one or more closed rings.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    pub name: String,
    pub rings: Vec<Ring>,
    pub bounds: GeoBounds,
}

impl Neighborhood {
    pub fn contains(&self, point: LatLng) -> bool {
        self.bounds.contains(point.lat, point.lng)
            && self.rings.iter().any(|ring| ring.contains(point.lat, point.lng))
    }
}

#[derive(Deserialize)]
struct RawAtlas {
    neighborhoods: Vec<RawNeighborhood>,
}

#[derive(Deserialize)]
struct RawNeighborhood {
    name: String,
    rings: Vec<Vec<[f64; 2]>>,
}

/// Authoritative neighborhood boundaries used for land classification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NeighborhoodAtlas {
    neighborhoods: Vec<Neighborhood>,
}

impl NeighborhoodAtlas {
    pub fn new(neighborhoods: Vec<Neighborhood>) -> Self {
        Self { neighborhoods }
    }

    /// Parses `{"neighborhoods": [{"name", "rings": [[[lat, lng], ...]]}]}`.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let raw: RawAtlas = serde_json::from_str(json)?;
        let mut neighborhoods = Vec::with_capacity(raw.neighborhoods.len());
        for entry in raw.neighborhoods {
            let rings: Vec<Ring> = entry
                .rings
                .into_iter()
                .map(|pts| {
                    Ring::new(
                        pts.into_iter()
                            .map(|[lat, lng]| LatLng::new(lat, lng))
                            .collect(),
                    )
                })
                .collect();
            if rings.iter().any(|r| r.len() < 3) {
                return Err(DataError::Invalid(format!(
                    "neighborhood {:?} has a ring with fewer than three vertices",
                    entry.name
                )));
            }
            let all: Vec<LatLng> = rings
                .iter()
                .flat_map(|r| r.points().iter().copied())
                .collect();
            if all.iter().any(|p| !p.is_finite()) {
                return Err(DataError::Invalid(format!(
                    "neighborhood {:?} has a non-finite vertex",
                    entry.name
                )));
            }
            let bounds = GeoBounds::enclosing(&all).ok_or_else(|| {
                DataError::Invalid(format!("neighborhood {:?} has no rings", entry.name))
            })?;
            neighborhoods.push(Neighborhood {
                name: entry.name,
                rings,
                bounds,
            });
        }
        Ok(Self { neighborhoods })
    }

    pub fn builtin() -> Result<Self, DataError> {
        Self::from_json(BUILTIN_NEIGHBORHOODS)
    }

    pub fn neighborhoods(&self) -> &[Neighborhood] {
        &self.neighborhoods
    }

    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }

    /// First neighborhood containing the point, in table order.
    pub fn locate(&self, point: LatLng) -> Option<&Neighborhood> {
        self.neighborhoods.iter().find(|n| n.contains(point))
    }
}

// Process-wide polygon cache: installed once at startup, read on every
// classification, reset only by tests or a runtime data swap.
fn slot() -> &'static RwLock<Option<Arc<NeighborhoodAtlas>>> {
    static SLOT: OnceLock<RwLock<Option<Arc<NeighborhoodAtlas>>>> = OnceLock::new();
    SLOT.get_or_init(|| RwLock::new(None))
}

/// Replaces the cached atlas.
pub fn install(atlas: NeighborhoodAtlas) -> Arc<NeighborhoodAtlas> {
    let atlas = Arc::new(atlas);
    let mut guard = slot().write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(Arc::clone(&atlas));
    tracing::debug!(neighborhoods = atlas.len(), "neighborhood atlas installed");
    atlas
}

/// Installs the compiled-in atlas unless one is already present.
pub fn install_builtin() -> Result<Arc<NeighborhoodAtlas>, DataError> {
    if let Some(existing) = current() {
        return Ok(existing);
    }
    Ok(install(NeighborhoodAtlas::builtin()?))
}

pub fn current() -> Option<Arc<NeighborhoodAtlas>> {
    slot().read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

pub fn reset() {
    *slot().write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_locates_known_places() {
        let atlas = NeighborhoodAtlas::builtin().unwrap();
        let name = |lat, lng| atlas.locate(LatLng::new(lat, lng)).map(|n| n.name.as_str());

        assert_eq!(name(40.758, -73.9855), Some("Midtown"));
        assert_eq!(name(40.7829, -73.9654), Some("Central Park"));
        assert_eq!(name(40.689247, -74.044502), Some("Liberty Island"));
        assert_eq!(name(40.7075, -74.0110), Some("Lower Manhattan"));
        assert_eq!(name(40.670, -74.040), None);
    }

    #[test]
    fn rejects_degenerate_rings() {
        let json = r#"{"neighborhoods":[{"name":"Sliver","rings":[[[40.0,-74.0],[40.1,-74.0]]]}]}"#;
        assert!(matches!(NeighborhoodAtlas::from_json(json), Err(DataError::Invalid(_))));

        let json = r#"{"neighborhoods":[{"name":"Empty","rings":[]}]}"#;
        assert!(matches!(NeighborhoodAtlas::from_json(json), Err(DataError::Invalid(_))));

        assert!(matches!(NeighborhoodAtlas::from_json("{"), Err(DataError::Parse(_))));
    }

    // The cache is process-wide, so its whole lifecycle runs in one test.
    #[test]
    fn cache_lifecycle() {
        reset();
        assert!(current().is_none());

        let first = install_builtin().unwrap();
        assert!(!first.is_empty());
        let again = install_builtin().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        install(NeighborhoodAtlas::default());
        assert!(current().unwrap().is_empty());

        reset();
        assert!(current().is_none());
    }
}
