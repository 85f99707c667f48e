//! The browser map element seen through the exhibit's host traits.

use exhibit::{FlyTo, MapHost};
use foundation::math::{GeoPoint, LatLng};
use js_sys::{Function, Object, Reflect};
use projection::{CameraPose, HostProjection, ProjectionError, ScreenPoint, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    get(target, key).and_then(|v| v.as_f64()).filter(|v| v.is_finite())
}

fn set(target: &Object, key: &str, value: impl Into<JsValue>) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), &value.into()).map(|_| ())
}

fn lat_lng_alt(lat: f64, lng: f64, altitude: f64) -> Result<Object, JsValue> {
    let obj = Object::new();
    set(&obj, "lat", lat)?;
    set(&obj, "lng", lng)?;
    set(&obj, "altitude", altitude)?;
    Ok(obj)
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| get(err, "message").and_then(|m| m.as_string()))
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Exact transform callbacks registered by the page once the engine's
/// projection is attached.
pub struct JsProjection {
    is_ready: Function,
    geo_to_container: Function,
    container_to_geo: Function,
}

impl JsProjection {
    pub fn new(is_ready: Function, geo_to_container: Function, container_to_geo: Function) -> Self {
        Self {
            is_ready,
            geo_to_container,
            container_to_geo,
        }
    }
}

impl HostProjection for JsProjection {
    fn is_ready(&self) -> bool {
        self.is_ready
            .call0(&JsValue::NULL)
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn geo_to_container(&self, point: GeoPoint) -> Result<Option<ScreenPoint>, ProjectionError> {
        let arg = lat_lng_alt(point.lat, point.lng, point.altitude_m)
            .map_err(|e| ProjectionError::Callback(js_error_text(&e)))?;
        let out = self
            .geo_to_container
            .call1(&JsValue::NULL, &arg)
            .map_err(|e| ProjectionError::Callback(js_error_text(&e)))?;
        Ok(get_f64(&out, "x").zip(get_f64(&out, "y")).map(|(x, y)| ScreenPoint::new(x, y)))
    }

    fn container_to_geo(&self, screen: ScreenPoint) -> Result<Option<GeoPoint>, ProjectionError> {
        let arg = Object::new();
        set(&arg, "x", screen.x).map_err(|e| ProjectionError::Callback(js_error_text(&e)))?;
        set(&arg, "y", screen.y).map_err(|e| ProjectionError::Callback(js_error_text(&e)))?;
        let out = self
            .container_to_geo
            .call1(&JsValue::NULL, &arg)
            .map_err(|e| ProjectionError::Callback(js_error_text(&e)))?;
        let Some((lat, lng)) = get_f64(&out, "lat").zip(get_f64(&out, "lng")) else {
            return Ok(None);
        };
        let altitude = get_f64(&out, "altitude").unwrap_or(0.0);
        Ok(Some(GeoPoint::new(lat, lng, altitude)))
    }
}

/// The page's 3D map element: `center`, `heading`, `tilt` and `range`
/// properties plus `flyCameraTo`.
pub struct JsMapHost {
    map: JsValue,
    viewport: Viewport,
    projection: Option<JsProjection>,
}

impl JsMapHost {
    pub fn new(map: JsValue, viewport: Viewport) -> Self {
        Self {
            map,
            viewport,
            projection: None,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_projection(&mut self, projection: Option<JsProjection>) {
        self.projection = projection;
    }
}

impl MapHost for JsMapHost {
    fn camera(&self) -> Option<CameraPose> {
        let center = get(&self.map, "center")?;
        let center = LatLng::new(get_f64(&center, "lat")?, get_f64(&center, "lng")?);
        Some(CameraPose::new(
            center,
            get_f64(&self.map, "heading").unwrap_or(0.0),
            get_f64(&self.map, "tilt").unwrap_or(0.0),
            get_f64(&self.map, "range")?,
        ))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn exact_projection(&self) -> Option<&dyn HostProjection> {
        self.projection.as_ref().map(|p| p as &dyn HostProjection)
    }

    fn fly_camera_to(&mut self, request: FlyTo) {
        if let Err(err) = fly(&self.map, request) {
            tracing::warn!("flyCameraTo failed: {}", js_error_text(&err));
        }
    }
}

fn fly(map: &JsValue, request: FlyTo) -> Result<(), JsValue> {
    let cam = request.end_camera;
    let end_camera = Object::new();
    set(
        &end_camera,
        "center",
        lat_lng_alt(cam.center.lat, cam.center.lng, request.center_altitude_m)?,
    )?;
    set(&end_camera, "heading", cam.heading_deg)?;
    set(&end_camera, "tilt", cam.tilt_deg)?;
    set(&end_camera, "range", cam.range_m)?;

    let options = Object::new();
    set(&options, "endCamera", end_camera)?;
    set(&options, "durationMillis", request.duration_ms)?;

    let method: Function = get(map, "flyCameraTo")
        .ok_or_else(|| JsValue::from_str("map has no flyCameraTo"))?
        .dyn_into()?;
    method.call1(map, &options)?;
    Ok(())
}
