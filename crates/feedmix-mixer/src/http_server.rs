//! HTTP Server for the Content Feed
//!
//! This module provides the HTTP surface of the mixer using axum.
//! It serves the feed endpoint at `/` and a health check at `/__health`.
//!
//! The feed endpoint takes `offset` and `count` query parameters. Parameter
//! parsing is deliberately forgiving: a missing or malformed value is logged
//! and becomes zero, and the mixer's own contract turns a zero-count window
//! into an empty response. Provider failures never surface as HTTP errors;
//! they only shorten the returned mapping.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use feedmix_common::{FeedError, Result};

use crate::mixer::Mixer;

/// HTTP server for the feed endpoint.
pub struct HttpServer {
    mixer: Arc<Mixer>,
}

impl HttpServer {
    /// Creates a new HTTP server around a mixer.
    pub fn new(mixer: Arc<Mixer>) -> Self {
        Self { mixer }
    }

    /// Runs the HTTP server.
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "0.0.0.0:8080")
    ///
    /// # Behavior
    /// - Binds to the specified address
    /// - Logs the listening address
    /// - Runs indefinitely until shutdown
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FeedError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serves connections from an already-bound listener.
    ///
    /// Split out of [`HttpServer::run`] so callers (and the feed tests) can
    /// bind an ephemeral port themselves and learn the address first.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = axum::Router::new()
            .route("/", axum::routing::get(handle_feed))
            .route("/__health", axum::routing::get(health_check))
            .layer(CorsLayer::permissive())
            .with_state(self.mixer);

        info!(
            "feedmix HTTP server listening on {}",
            listener
                .local_addr()
                .map_err(|e| FeedError::Transport(format!("Failed to get local addr: {}", e)))?
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| FeedError::Transport(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Parses one integer query parameter of the feed request.
///
/// A missing or malformed value is logged and becomes zero; negative values
/// clamp to zero. The feed contract never turns bad parameters into a
/// request error.
fn parse_param(params: &HashMap<String, String>, name: &str) -> u64 {
    let raw = match params.get(name) {
        Some(raw) => raw,
        None => {
            warn!("missing query parameter '{}', using 0", name);
            return 0;
        }
    };

    match raw.parse::<i64>() {
        Ok(value) if value >= 0 => value as u64,
        Ok(value) => {
            warn!("negative value {} for '{}', using 0", value, name);
            0
        }
        Err(e) => {
            warn!("error parsing request for {}: {}", name, e);
            0
        }
    }
}

/// Handles feed GET requests.
///
/// Always responds `200 OK` with a JSON object mapping relative offsets
/// (string keys `"0"`, `"1"`, ...) to content items; the mapping may be
/// empty.
async fn handle_feed(
    State(mixer): State<Arc<Mixer>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let offset = parse_param(&params, "offset");
    let count = parse_param(&params, "count");

    info!("GET / offset={} count={}", offset, count);

    let feed = mixer.mix(offset, count).await;

    Json(feed)
}

/// Handles health check GET requests.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
