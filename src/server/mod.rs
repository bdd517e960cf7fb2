//! The analyze-face API service.
//!
//! One route, no state beyond the provider client. Shape follows the usual
//! axum service skeleton: router construction is separate from `start` so
//! the tests can drive the router directly.

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::post;
use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::net::provider::ProviderClient;

/// Photos up to 20 MB are accepted, matching the upload widget's copy.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub struct AppState {
    pub provider: ProviderClient,
}

impl AppState {
    pub fn new(config: &Config) -> Arc<Self> {
        Arc::new(Self {
            provider: ProviderClient::new(&config.api_base, &config.api_key),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/analyze-face", post(routes::analyze_face))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

pub async fn start(config: Config) {
    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(&config);
    let app = router(state);

    info!("binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .expect("port unavailable");
    info!("server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    info!("server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
