use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Exhibit backend: postcard and elevation proxies plus the static site.
#[derive(Parser, Debug, Clone)]
#[command(name = "server", version)]
pub struct Args {
    #[arg(long, env = "EXHIBIT_ADDR", default_value = "127.0.0.1:9200")]
    pub addr: SocketAddr,

    /// Directory holding the built web front-end.
    #[arg(long, env = "EXHIBIT_STATIC_DIR", default_value = "web/dist")]
    pub static_dir: PathBuf,

    /// Image generation endpoint. Postcards answer 503 when unset.
    #[arg(long, env = "POSTCARD_API_URL")]
    pub postcard_api_url: Option<String>,

    #[arg(long, env = "POSTCARD_API_KEY", hide_env_values = true)]
    pub postcard_api_key: Option<String>,

    /// Elevation lookup endpoint taking `?locations=lat,lng`.
    #[arg(long, env = "ELEVATION_API_URL")]
    pub elevation_api_url: Option<String>,

    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 20)]
    pub upstream_timeout_secs: u64,
}

impl Args {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

/// Treats blank values as unset, so `POSTCARD_API_URL=` disables postcards.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
