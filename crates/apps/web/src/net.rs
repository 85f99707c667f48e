//! Calls to the exhibit server: elevation lookups and postcard generation.

use exhibit::{PostcardFailure, PostcardImage, PostcardRequest};
use gloo_net::http::Request;
use serde::Deserialize;
use web_sys::AbortSignal;

#[derive(Deserialize)]
struct ElevationBody {
    elevation: Option<f64>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Elevation at a point, or `None` when the service can't say.
pub async fn fetch_elevation(base: &str, lat: f64, lng: f64) -> Result<Option<f64>, String> {
    let url = format!("{base}/api/elevation?lat={lat}&lng={lng}");
    let resp = Request::get(&url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body: ElevationBody = resp.json().await.map_err(|e| e.to_string())?;
    Ok(body.elevation.filter(|e| e.is_finite()))
}

/// Asks the server to render a postcard; `signal` aborts the request.
pub async fn fetch_postcard(
    base: &str,
    request: &PostcardRequest,
    signal: Option<&AbortSignal>,
) -> Result<PostcardImage, PostcardFailure> {
    let url = format!("{base}/api/postcard");
    let req = Request::post(&url)
        .abort_signal(signal)
        .json(request)
        .map_err(|e| PostcardFailure::Upstream(e.to_string()))?;
    let resp = req.send().await.map_err(|e| {
        if signal.is_some_and(|s| s.aborted()) {
            PostcardFailure::Cancelled
        } else {
            PostcardFailure::Upstream(e.to_string())
        }
    })?;

    match resp.status() {
        200 => {
            let content_type = resp
                .headers()
                .get("content-type")
                .unwrap_or_else(|| "image/png".to_string());
            let data = resp
                .binary()
                .await
                .map_err(|e| PostcardFailure::Upstream(e.to_string()))?;
            Ok(PostcardImage { content_type, data })
        }
        503 => {
            let body: Option<ErrorBody> = resp.json().await.ok();
            match body {
                Some(b) if b.error == "not_configured" => Err(PostcardFailure::NotConfigured),
                Some(b) => Err(PostcardFailure::Upstream(b.error)),
                None => Err(PostcardFailure::Upstream("HTTP 503".into())),
            }
        }
        504 => Err(PostcardFailure::Timeout),
        status => Err(PostcardFailure::Upstream(format!("HTTP {status}"))),
    }
}
