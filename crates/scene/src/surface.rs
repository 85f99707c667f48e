//! On-surface filtering: decides whether a pointer sample is over the map or
//! absorbed by UI chrome layered above it.

use std::collections::BTreeSet;

use projection::{ScreenPoint, Viewport};
use serde::{Deserialize, Serialize};

/// What a chrome region is, for exclusion purposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromeRole {
    Button,
    Panel,
    Modal,
    /// The per-landmark action menu opened by hovering.
    ActionMenu,
    /// Readouts such as the cost ledger.
    Meter,
    /// Decorative labels that let pointer events through.
    Label,
}

/// Axis-aligned screen rectangle (CSS pixels).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: ScreenPoint) -> bool {
        p.x >= self.x && p.y >= self.y && p.x <= self.x + self.width && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromeRegion {
    pub id: String,
    pub role: ChromeRole,
    pub rect: ScreenRect,
    /// Stacking order; higher is on top.
    #[serde(default)]
    pub z: i32,
}

/// Layer hit-test against the registered chrome regions.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFilter {
    regions: Vec<ChromeRegion>,
    blocking: BTreeSet<ChromeRole>,
}

impl Default for SurfaceFilter {
    fn default() -> Self {
        Self::with_blocking([
            ChromeRole::Button,
            ChromeRole::Panel,
            ChromeRole::Modal,
            ChromeRole::ActionMenu,
            ChromeRole::Meter,
        ])
    }
}

impl SurfaceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter where only the given roles absorb the pointer.
    pub fn with_blocking(roles: impl IntoIterator<Item = ChromeRole>) -> Self {
        Self {
            regions: Vec::new(),
            blocking: roles.into_iter().collect(),
        }
    }

    /// Inserts or replaces the region with the same id.
    pub fn upsert(&mut self, region: ChromeRegion) {
        match self.regions.iter_mut().find(|r| r.id == region.id) {
            Some(existing) => *existing = region,
            None => self.regions.push(region),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.regions.len();
        self.regions.retain(|r| r.id != id);
        self.regions.len() != before
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn regions(&self) -> &[ChromeRegion] {
        &self.regions
    }

    /// Topmost blocking region under `p`. Equal z resolves to the region
    /// registered last.
    pub fn hit(&self, p: ScreenPoint) -> Option<&ChromeRegion> {
        self.regions
            .iter()
            .enumerate()
            .filter(|(_, r)| self.blocking.contains(&r.role) && r.rect.contains(p))
            .max_by_key(|(idx, r)| (r.z, *idx))
            .map(|(_, r)| r)
    }

    /// True when `p` lands on the map itself.
    pub fn is_on_surface(&self, viewport: Viewport, p: ScreenPoint) -> bool {
        viewport.contains(p) && self.hit(p).is_none()
    }

    pub fn is_over_role(&self, p: ScreenPoint, role: ChromeRole) -> bool {
        self.hit(p).is_some_and(|r| r.role == role)
    }
}
