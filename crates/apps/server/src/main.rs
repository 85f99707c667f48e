mod config;
mod prompt;
mod routes;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{non_empty, Args};
use crate::routes::{AppState, PostcardUpstream};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        error!("server failed: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let http = reqwest::Client::builder()
        .timeout(args.upstream_timeout())
        .build()?;

    let postcard = non_empty(args.postcard_api_url.clone()).map(|url| {
        Arc::new(PostcardUpstream {
            url,
            api_key: non_empty(args.postcard_api_key.clone()),
        })
    });
    if postcard.is_none() {
        warn!("POSTCARD_API_URL not set; postcards will report not_configured");
    }
    let elevation_url = non_empty(args.elevation_api_url.clone());
    if elevation_url.is_none() {
        warn!("ELEVATION_API_URL not set; elevation lookups return null");
    }

    let state = AppState {
        http,
        postcard,
        elevation_url,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/api/postcard", post(routes::postcard))
        .route("/api/elevation", get(routes::elevation))
        .fallback_service(ServeDir::new(&args.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(
        "exhibit server listening on http://{} (static files from {})",
        args.addr,
        args.static_dir.display()
    );
    axum::serve(listener, app).await?;
    Ok(())
}
