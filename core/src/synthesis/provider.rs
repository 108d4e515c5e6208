use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::pin::Pin;
use tokio_stream::{Stream, StreamExt};

use crate::{MurmurError, Result};

/// Encoded audio container requested from a provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mp3,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }
}

/// One call to a speech provider.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    pub format: AudioFormat,
    /// `None` means the parameter is omitted from the call entirely.
    pub speed: Option<f32>,
}

impl SpeechRequest {
    /// Same request with the speed parameter dropped.
    pub fn without_speed(&self) -> Self {
        Self {
            speed: None,
            ..self.clone()
        }
    }
}

pub type AudioChunkStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Bytes, String>> + Send + 'static>>;

/// Audio as handed back by a provider: already buffered, or still arriving.
pub enum ProviderAudio {
    Buffer(Bytes),
    Stream(AudioChunkStream),
}

impl ProviderAudio {
    /// Drain into a single contiguous buffer.
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            ProviderAudio::Buffer(bytes) => Ok(bytes),
            ProviderAudio::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| {
                        MurmurError::Synthesis(format!("audio stream interrupted: {e}"))
                    })?;
                    buf.extend_from_slice(&chunk);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for ProviderAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderAudio::Buffer(b) => f.debug_tuple("Buffer").field(&b.len()).finish(),
            ProviderAudio::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Result of a single provider attempt.
#[derive(Debug)]
pub enum ProviderOutcome {
    Succeeded(ProviderAudio),
    /// The provider refused an optional parameter (speed) rather than the content.
    UnsupportedParameter(String),
    Failed(String),
}

/// External text-to-speech capability.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &'static str {
        "speech"
    }

    async fn speak(&self, request: &SpeechRequest) -> ProviderOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_passes_through() {
        let audio = ProviderAudio::Buffer(Bytes::from_static(b"ID3abc"));
        assert_eq!(audio.into_bytes().await.unwrap(), Bytes::from_static(b"ID3abc"));
    }

    #[tokio::test]
    async fn stream_is_drained_in_order() {
        let chunks: Vec<std::result::Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::new()),
            Ok(Bytes::from_static(b"cd")),
        ];
        let audio = ProviderAudio::Stream(Box::pin(tokio_stream::iter(chunks)));
        assert_eq!(audio.into_bytes().await.unwrap(), Bytes::from_static(b"abcd"));
    }

    #[tokio::test]
    async fn stream_error_is_a_synthesis_error() {
        let chunks: Vec<std::result::Result<Bytes, String>> =
            vec![Ok(Bytes::from_static(b"ab")), Err("connection reset".into())];
        let audio = ProviderAudio::Stream(Box::pin(tokio_stream::iter(chunks)));
        match audio.into_bytes().await {
            Err(MurmurError::Synthesis(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("expected synthesis error, got {other:?}"),
        }
    }

    #[test]
    fn without_speed_keeps_everything_else() {
        let req = SpeechRequest {
            model: "m".into(),
            voice: "alloy".into(),
            input: "hi".into(),
            format: AudioFormat::Mp3,
            speed: Some(1.2),
        };
        let stripped = req.without_speed();
        assert_eq!(stripped.speed, None);
        assert_eq!(stripped.input, req.input);
        assert_eq!(stripped.voice, req.voice);
    }
}
