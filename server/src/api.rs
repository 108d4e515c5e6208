// HTTP handlers
//
// POST /tts        synthesize, cache, return a short-lived link
// POST /tts/mp3    synthesize and return the bytes directly (no cache)
// GET  /audio/:f   serve a cached artifact as `{id}.mp3`
// GET  /           liveness/info

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use murmur_core::{ArtifactId, AudioFormat, SynthesisRequest};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::locator::{audio_locator, resolve_base_url};
use crate::AppState;

/// Response body for `POST /tts`
#[derive(Debug, Serialize)]
pub struct TtsResponse {
    pub id: ArtifactId,
    pub audio_url: String,
    pub expires_in_seconds: i64,
}

pub(crate) async fn root_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "murmur",
        "version": env!("CARGO_PKG_VERSION"),
        "ttl_seconds": state.ttl_secs,
        "cached_artifacts": state.store.len(),
    }))
}

pub(crate) async fn tts_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SynthesisRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    // The provider call completes before the store is touched; nothing is
    // written if it fails or the client goes away.
    let audio = state.orchestrator.synthesize(&req).await?;
    let size = audio.len();
    let id = state.store.put(audio);

    let base_url = resolve_base_url(
        state.public_base_url.as_deref(),
        &headers,
        &state.fallback_host,
    );
    info!(target: "http", %id, bytes = size, cached = state.store.len(), "Audio cached");
    Ok(Json(TtsResponse {
        id,
        audio_url: audio_locator(&base_url, &id),
        expires_in_seconds: state.ttl_secs,
    }))
}

pub(crate) async fn tts_mp3_handler(
    State(state): State<AppState>,
    Json(req): Json<SynthesisRequest>,
) -> Result<Response, ApiError> {
    let audio = state.orchestrator.synthesize(&req).await?;
    debug!(target: "http", bytes = audio.len(), "Returning audio inline");
    Ok(audio_response(
        audio,
        Some(HeaderValue::from_static("inline; filename=\"speech.mp3\"")),
    ))
}

pub(crate) async fn audio_handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let token = file.strip_suffix(".mp3").ok_or_else(ApiError::not_found)?;
    let audio = state.store.get_str(token)?;
    Ok(audio_response(audio, None))
}

fn audio_response(audio: Bytes, disposition: Option<HeaderValue>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(AudioFormat::Mp3.mime_type()),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Some(value) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    (StatusCode::OK, headers, audio).into_response()
}
