use std::sync::Arc;
use std::time::Duration;

use murmur_core::{spawn_sweeper, OpenAiSpeechProvider};
use murmur_server::{bind, start_server, AppState, MurmurConfig};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,murmur_core=info,murmur_server=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    let cfg = MurmurConfig::load();
    cfg.validate()?;
    info!(
        target: "murmur",
        addr = %cfg.server.addr,
        ttl_secs = cfg.server.ttl_secs,
        model = %cfg.synthesis.model,
        voice = %cfg.synthesis.default_voice,
        public_base_url = ?cfg.server.public_base_url,
        "Starting Murmur"
    );

    let provider = Arc::new(OpenAiSpeechProvider::new(cfg.openai.clone())?);
    let state = AppState::from_config(&cfg, provider);

    let sweeper = if cfg.server.sweep_interval_secs > 0 {
        info!(target: "murmur", every_secs = cfg.server.sweep_interval_secs, "Background sweeper enabled");
        Some(spawn_sweeper(
            Arc::clone(&state.store),
            Duration::from_secs(cfg.server.sweep_interval_secs),
        ))
    } else {
        None
    };

    let listener = bind(&cfg.server.addr).await?;
    let result = start_server(listener, state, async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(target: "murmur", error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!(target: "murmur", "Shutdown signal received");
    })
    .await;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    result.map_err(|e| e.into())
}
