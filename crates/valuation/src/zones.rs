use std::sync::OnceLock;

use foundation::math::{LatLng, distance_meters};
use serde::{Deserialize, Serialize};

use crate::DataError;

const BUILTIN_ZONES: &str = include_str!("../data/zones.json");

/// Named circular pricing zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub center: LatLng,
    pub radius_m: f64,
    pub rate_per_sq_ft: f64,
}

impl Zone {
    pub fn contains(&self, point: LatLng) -> bool {
        distance_meters(point, self.center) <= self.radius_m
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub default_rate_per_sq_ft: f64,
    pub default_label: String,
    pub zones: Vec<Zone>,
}

/// How a point relates to the zone table.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneMatch<'a> {
    Unzoned,
    Single(&'a Zone),
    Border(Vec<&'a Zone>),
}

impl ZoneTable {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let table: ZoneTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// The table compiled into the crate, parsed once.
    pub fn builtin() -> Result<&'static ZoneTable, DataError> {
        static TABLE: OnceLock<Result<ZoneTable, DataError>> = OnceLock::new();
        TABLE
            .get_or_init(|| ZoneTable::from_json(BUILTIN_ZONES))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn validate(&self) -> Result<(), DataError> {
        if !(self.default_rate_per_sq_ft > 0.0) {
            return Err(DataError::Invalid("default rate must be positive".into()));
        }
        for zone in &self.zones {
            if !(zone.radius_m > 0.0) || !(zone.rate_per_sq_ft > 0.0) || !zone.center.is_finite() {
                return Err(DataError::Invalid(format!(
                    "zone {:?} needs a finite center and positive radius and rate",
                    zone.name
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, point: LatLng) -> ZoneMatch<'_> {
        let mut hits: Vec<&Zone> = self.zones.iter().filter(|z| z.contains(point)).collect();
        match hits.len() {
            0 => ZoneMatch::Unzoned,
            1 => ZoneMatch::Single(hits.remove(0)),
            _ => ZoneMatch::Border(hits),
        }
    }

    /// Rate and label for a point: the zone's own, the mean of overlapping
    /// zones, or the table default.
    pub fn rate_and_label(&self, point: LatLng) -> (f64, String) {
        match self.matches(point) {
            ZoneMatch::Unzoned => (self.default_rate_per_sq_ft, self.default_label.clone()),
            ZoneMatch::Single(zone) => (zone.rate_per_sq_ft, zone.name.clone()),
            ZoneMatch::Border(zones) => {
                let mean =
                    zones.iter().map(|z| z.rate_per_sq_ft).sum::<f64>() / zones.len() as f64;
                let names: Vec<&str> = zones.iter().map(|z| z.name.as_str()).collect();
                (mean, format!("Border Zone ({})", names.join(" / ")))
            }
        }
    }
}
