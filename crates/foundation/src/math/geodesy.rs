use serde::{Deserialize, Serialize};

/// Mean Earth radius (meters), used for great-circle math.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Ground length of one degree of latitude under the flat-earth approximation.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    pub fn with_altitude(self, altitude_m: f64) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng, altitude_m)
    }
}

/// Geographic position with altitude above sea level.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64, altitude_m: f64) -> Self {
        Self {
            lat,
            lng,
            altitude_m,
        }
    }

    pub fn ground(lat: f64, lng: f64) -> Self {
        Self::new(lat, lng, 0.0)
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.altitude_m.is_finite()
    }
}

impl From<GeoPoint> for LatLng {
    fn from(p: GeoPoint) -> Self {
        p.lat_lng()
    }
}

/// Haversine great-circle distance in meters.
///
/// Uses the `asin(sqrt(h))` form, which stays well conditioned for points a few
/// meters apart.
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng * 0.5).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Initial bearing from `a` to `b`, degrees clockwise from north in `[0, 360)`.
pub fn bearing_degrees(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if d >= 360.0 { 0.0 } else { d }
}

/// Point reached by travelling `distance_m` from `origin` along `bearing_deg`
/// on a sphere.
pub fn destination_point(origin: LatLng, bearing_deg: f64, distance_m: f64) -> LatLng {
    let delta = distance_m / EARTH_MEAN_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();

    let sin_lat2 = lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lng2 = lng1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * sin_lat2);

    LatLng::new(lat2.to_degrees(), lng2.to_degrees())
}

/// Eight-point compass name for a bearing.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    const NAMES: [&str; 8] = [
        "north",
        "northeast",
        "east",
        "southeast",
        "south",
        "southwest",
        "west",
        "northwest",
    ];
    let idx = ((normalize_degrees(bearing_deg) + 22.5) / 45.0).floor() as usize % 8;
    NAMES[idx]
}
