use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::MurmurError;

/// Length of the hex token an [`ArtifactId`] renders to.
pub const ARTIFACT_ID_LEN: usize = 32;

/// Opaque 128-bit artifact identifier, rendered as 32 lowercase hex chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactId(u128);

impl ArtifactId {
    /// Draw a fresh, uniformly random id.
    pub fn random() -> Self {
        Self(rand::random::<u128>())
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

impl From<u128> for ArtifactId {
    fn from(v: u128) -> Self {
        Self(v)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = MurmurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // from_str_radix alone would also take a leading '+' and short tokens
        if s.len() != ARTIFACT_ID_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(MurmurError::NotFound(format!("malformed artifact id: {s}")));
        }
        u128::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| MurmurError::NotFound(format!("malformed artifact id: {e}")))
    }
}

impl Serialize for ArtifactId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A stored audio payload with its creation instant.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub id: ArtifactId,
    pub created_at: DateTime<Utc>,
    pub payload: Bytes,
}

impl Artifact {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// `age > ttl` is the only eviction rule.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}
