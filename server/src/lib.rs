use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use murmur_core::{ArtifactStore, SpeechProvider, SynthesisOrchestrator};

pub mod api;
pub mod config;
pub mod error;
pub mod locator;

pub use api::TtsResponse;
pub use config::{MurmurConfig, ServerConfig};
pub use error::ApiError;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Core(#[from] murmur_core::MurmurError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArtifactStore>,
    pub orchestrator: Arc<SynthesisOrchestrator>,
    pub public_base_url: Option<String>,
    pub ttl_secs: i64,
    /// Used for links when the request carries no Host header.
    pub fallback_host: String,
}

impl AppState {
    pub fn new(
        store: Arc<ArtifactStore>,
        orchestrator: Arc<SynthesisOrchestrator>,
        cfg: &MurmurConfig,
    ) -> Self {
        Self {
            store,
            orchestrator,
            public_base_url: cfg.server.public_base_url.clone(),
            ttl_secs: cfg.server.ttl_secs,
            fallback_host: cfg.server.addr.clone(),
        }
    }

    /// Wire a fresh store and orchestrator around `provider`.
    pub fn from_config(cfg: &MurmurConfig, provider: Arc<dyn SpeechProvider>) -> Self {
        let store = Arc::new(ArtifactStore::new(cfg.ttl()));
        let orchestrator = Arc::new(SynthesisOrchestrator::new(provider, cfg.synthesis.clone()));
        Self::new(store, orchestrator, cfg)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root_handler))
        .route("/tts", post(api::tts_handler))
        .route("/tts/mp3", post(api::tts_mp3_handler))
        .route("/audio/:file", get(api::audio_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start_server<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Serve(e.to_string()))?;
    info!(target: "http", %addr, "Starting Murmur HTTP server");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(e.to_string()))
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })
}
