//! Land/water classification with graceful degradation.
//!
//! Sources are consulted in order of authority: neighborhood polygons, then a
//! measured elevation if one has arrived, then a coarse bounding-box mask.
//! Polygons only ever assert land; a point outside every polygon falls
//! through to the next source.

use std::sync::OnceLock;

use foundation::math::LatLng;
use foundation::{GeoBounds, is_within_bounding_box};
use serde::{Deserialize, Serialize};

use crate::{DataError, NeighborhoodAtlas};

const BUILTIN_LAND: &str = include_str!("../data/land.json");

/// Elevations above this are treated as dry land.
pub const LAND_ELEVATION_THRESHOLD_M: f64 = 0.5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Land,
    Water,
}

impl SurfaceKind {
    pub fn is_water(self) -> bool {
        matches!(self, SurfaceKind::Water)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Polygon,
    Elevation,
    BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub surface: SurfaceKind,
    pub source: ClassificationSource,
    /// Name of the containing neighborhood polygon, if any.
    pub district: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandBox {
    pub name: String,
    pub bounds: GeoBounds,
}

/// Coarse land boxes; anything outside them is water.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandMask {
    pub boxes: Vec<LandBox>,
}

impl LandMask {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let mask: LandMask = serde_json::from_str(json)?;
        for b in &mask.boxes {
            let g = b.bounds;
            if !(g.south <= g.north && g.west <= g.east) {
                return Err(DataError::Invalid(format!("land box {:?} is inverted", b.name)));
            }
        }
        Ok(mask)
    }

    pub fn builtin() -> Result<&'static LandMask, DataError> {
        static MASK: OnceLock<Result<LandMask, DataError>> = OnceLock::new();
        MASK.get_or_init(|| LandMask::from_json(BUILTIN_LAND))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn surface_at(&self, point: LatLng) -> SurfaceKind {
        if self
            .boxes
            .iter()
            .any(|b| is_within_bounding_box(point.lat, point.lng, &b.bounds))
        {
            SurfaceKind::Land
        } else {
            SurfaceKind::Water
        }
    }

    /// Classifies `point` from the best source available.
    ///
    /// `elevation_m` is the elevation service result, `None` while the lookup
    /// is pending or after it failed.
    pub fn classify(
        &self,
        atlas: Option<&NeighborhoodAtlas>,
        point: LatLng,
        elevation_m: Option<f64>,
    ) -> Classification {
        if let Some(hood) = atlas.and_then(|a| a.locate(point)) {
            return Classification {
                surface: SurfaceKind::Land,
                source: ClassificationSource::Polygon,
                district: Some(hood.name.clone()),
            };
        }
        if let Some(elevation) = elevation_m.filter(|e| e.is_finite()) {
            let surface = if elevation > LAND_ELEVATION_THRESHOLD_M {
                SurfaceKind::Land
            } else {
                SurfaceKind::Water
            };
            return Classification {
                surface,
                source: ClassificationSource::Elevation,
                district: None,
            };
        }
        Classification {
            surface: self.surface_at(point),
            source: ClassificationSource::BoundingBox,
            district: None,
        }
    }
}
