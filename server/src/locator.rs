//! Audio link construction.
//!
//! A configured public base URL always wins. Otherwise the base is rebuilt
//! from what the client used to reach us, honouring reverse-proxy headers.

use axum::http::{header, HeaderMap};
use murmur_core::ArtifactId;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Base URL without a trailing slash.
pub fn resolve_base_url(configured: Option<&str>, headers: &HeaderMap, fallback_host: &str) -> String {
    if let Some(base) = configured.map(|b| b.trim().trim_end_matches('/')) {
        if !base.is_empty() {
            return base.to_string();
        }
    }
    let scheme = first_value(headers, FORWARDED_PROTO).unwrap_or("http");
    let host = first_value(headers, FORWARDED_HOST)
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .unwrap_or(fallback_host);
    format!("{scheme}://{host}")
}

/// `{base_url}/audio/{id}.mp3`
pub fn audio_locator(base_url: &str, id: &ArtifactId) -> String {
    format!("{}/audio/{}.mp3", base_url.trim_end_matches('/'), id)
}

// Proxies may append to these headers; the first entry is the client-facing one.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
