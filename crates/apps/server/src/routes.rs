use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use exhibit::PostcardRequest;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::prompt::build_prompt;

#[derive(Clone, Debug)]
pub struct PostcardUpstream {
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub postcard: Option<Arc<PostcardUpstream>>,
    pub elevation_url: Option<String>,
}

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

fn error_body(status: StatusCode, code: &str) -> Response {
    (status, Json(json!({ "error": code }))).into_response()
}

fn upstream_failure(err: &reqwest::Error, what: &str) -> Response {
    if err.is_timeout() {
        warn!("{what} upstream timed out");
        error_body(StatusCode::GATEWAY_TIMEOUT, "timeout")
    } else {
        error!("{what} upstream failed: {err}");
        error_body(StatusCode::BAD_GATEWAY, "upstream_failed")
    }
}

/// Renders a postcard through the configured image generator.
pub async fn postcard(State(state): State<AppState>, Json(req): Json<PostcardRequest>) -> Response {
    let Some(upstream) = state.postcard.clone() else {
        return error_body(StatusCode::SERVICE_UNAVAILABLE, "not_configured");
    };

    let prompt = build_prompt(&req);
    info!(landmark = %req.visited_id, nearby = req.nearby.len(), "postcard requested");

    let mut call = state.http.post(&upstream.url).json(&json!({
        "prompt": prompt,
        "size": "1024x768",
    }));
    if let Some(key) = &upstream.api_key {
        call = call.bearer_auth(key);
    }

    let resp = match call.send().await {
        Ok(resp) => resp,
        Err(err) => return upstream_failure(&err, "postcard"),
    };
    if !resp.status().is_success() {
        error!("postcard upstream answered {}", resp.status());
        return error_body(StatusCode::BAD_GATEWAY, "upstream_failed");
    }

    let content_type = resp
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/png")
        .to_string();
    match resp.bytes().await {
        Ok(bytes) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(&content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("image/png")),
            );
            (StatusCode::OK, headers, Body::from(bytes)).into_response()
        }
        Err(err) => upstream_failure(&err, "postcard"),
    }
}

#[derive(Debug, Deserialize)]
pub struct ElevationQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct ElevationResults {
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: Option<f64>,
}

/// Elevation at a point as `{"elevation": number | null}`.
///
/// Without an upstream the answer is always null; clients then keep their
/// bounding-box guess.
pub async fn elevation(State(state): State<AppState>, Query(q): Query<ElevationQuery>) -> Response {
    if !(q.lat.is_finite() && q.lng.is_finite() && q.lat.abs() <= 90.0 && q.lng.abs() <= 180.0) {
        return error_body(StatusCode::BAD_REQUEST, "invalid_coordinate");
    }
    let Some(url) = &state.elevation_url else {
        return Json(json!({ "elevation": null })).into_response();
    };

    let resp = match state
        .http
        .get(url)
        .query(&[("locations", format!("{},{}", q.lat, q.lng))])
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(err) => return upstream_failure(&err, "elevation"),
    };
    if !resp.status().is_success() {
        warn!("elevation upstream answered {}", resp.status());
        return error_body(StatusCode::BAD_GATEWAY, "upstream_failed");
    }
    match resp.json::<ElevationResults>().await {
        Ok(body) => {
            let elevation = body
                .results
                .first()
                .and_then(|r| r.elevation)
                .filter(|e| e.is_finite());
            Json(json!({ "elevation": elevation })).into_response()
        }
        Err(err) => upstream_failure(&err, "elevation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::routing::{get, post};
    use axum::Router;
    use exhibit::PostcardRequest;
    use foundation::math::LatLng;
    use foundation::LandmarkId;

    fn state(postcard: Option<String>, elevation: Option<String>, timeout: Duration) -> AppState {
        AppState {
            http: reqwest::Client::builder().timeout(timeout).build().unwrap(),
            postcard: postcard.map(|url| {
                Arc::new(PostcardUpstream {
                    url,
                    api_key: Some("secret".into()),
                })
            }),
            elevation_url: elevation,
        }
    }

    fn request() -> PostcardRequest {
        PostcardRequest {
            visited_id: LandmarkId::new(1),
            visited: LatLng::new(40.7163, -74.0086),
            neighborhood: "Tribeca".into(),
            reference: LatLng::new(40.689247, -74.044502),
            heading_deg: 200.0,
            reference_min_m: 150.0,
            nearby: Vec::new(),
        }
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // Serves `app` on an ephemeral port and returns its base URL.
    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn postcard_without_upstream_is_not_configured() {
        let app_state = state(None, None, Duration::from_secs(5));
        let resp = postcard(State(app_state), Json(request())).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(resp).await, json!({ "error": "not_configured" }));
    }

    #[tokio::test]
    async fn postcard_forwards_image_bytes() {
        let upstream = Router::new().route(
            "/render",
            post(|headers: HeaderMap| async move {
                let authorized = headers
                    .get(http::header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer secret");
                if authorized {
                    let headers = [(http::header::CONTENT_TYPE, "image/jpeg")];
                    (headers, vec![0xff_u8, 0xd8, 0xff]).into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        );
        let base = spawn_upstream(upstream).await;

        let resp = postcard(
            State(state(Some(format!("{base}/render")), None, Duration::from_secs(5))),
            Json(request()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "image/jpeg");
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        assert_eq!(bytes.as_ref(), &[0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn postcard_upstream_error_is_bad_gateway() {
        let upstream = Router::new().route(
            "/render",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_upstream(upstream).await;
        let resp = postcard(
            State(state(Some(format!("{base}/render")), None, Duration::from_secs(5))),
            Json(request()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn postcard_upstream_timeout_is_gateway_timeout() {
        let upstream = Router::new().route(
            "/render",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let base = spawn_upstream(upstream).await;
        let resp = postcard(
            State(state(Some(format!("{base}/render")), None, Duration::from_millis(200))),
            Json(request()),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn elevation_without_upstream_is_null() {
        let resp = elevation(
            State(state(None, None, Duration::from_secs(5))),
            Query(ElevationQuery { lat: 40.7, lng: -74.0 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "elevation": null }));
    }

    #[tokio::test]
    async fn elevation_reads_first_result() {
        let upstream = Router::new().route(
            "/lookup",
            get(|| async { Json(json!({ "results": [{ "elevation": 12.5 }] })) }),
        );
        let base = spawn_upstream(upstream).await;
        let resp = elevation(
            State(state(None, Some(format!("{base}/lookup")), Duration::from_secs(5))),
            Query(ElevationQuery { lat: 40.7, lng: -74.0 }),
        )
        .await;
        assert_eq!(body_json(resp).await, json!({ "elevation": 12.5 }));
    }

    #[tokio::test]
    async fn elevation_rejects_bad_coordinates() {
        let resp = elevation(
            State(state(None, None, Duration::from_secs(5))),
            Query(ElevationQuery { lat: 91.0, lng: 0.0 }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
