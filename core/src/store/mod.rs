// Artifact store - in-memory, TTL-bounded audio cache
//
// Entries live in a sharded concurrent map; no lock is ever held across an
// await point. Every access sweeps expired entries first.

mod artifact;
mod sweep;

pub use artifact::{Artifact, ArtifactId, ARTIFACT_ID_LEN};
pub use sweep::spawn_sweeper;

use bytes::Bytes;
use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::{MurmurError, Result};

/// Largest magnitude accepted by `chrono::Duration::seconds`.
const MAX_TTL_SECS: i64 = i64::MAX / 1_000;

/// Convert a configured TTL in seconds to a duration. Out-of-range values
/// saturate; zero and negative values pass through untouched.
pub fn ttl_from_secs(secs: i64) -> Duration {
    Duration::seconds(secs.clamp(-MAX_TTL_SECS, MAX_TTL_SECS))
}

/// Process-wide audio artifact cache.
#[derive(Debug)]
pub struct ArtifactStore {
    entries: DashMap<ArtifactId, Artifact>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ArtifactStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        info!(target: "store", ttl_secs = ttl.num_seconds(), "Artifact store created");
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a payload under a freshly generated id.
    pub fn put(&self, payload: Bytes) -> ArtifactId {
        self.evict_expired();
        let created_at = self.clock.now();
        let size = payload.len();
        loop {
            let id = ArtifactId::random();
            // A live id is never overwritten; draw again on collision.
            if let Entry::Vacant(slot) = self.entries.entry(id) {
                slot.insert(Artifact {
                    id,
                    created_at,
                    payload,
                });
                debug!(target: "store", %id, bytes = size, "Artifact stored");
                return id;
            }
        }
    }

    /// Fetch a live payload. Expired and unknown ids are both `NotFound`.
    pub fn get(&self, id: &ArtifactId) -> Result<Bytes> {
        self.evict_expired();
        let now = self.clock.now();
        match self.entries.get(id) {
            // Re-check age: the entry may have been inserted just before the sweep
            // with a timestamp that is already past the window.
            Some(artifact) if !artifact.is_expired(now, self.ttl) => Ok(artifact.payload.clone()),
            _ => Err(MurmurError::NotFound(format!("artifact {id}"))),
        }
    }

    /// Like [`get`](Self::get), from the hex token used in locators.
    pub fn get_str(&self, token: &str) -> Result<Bytes> {
        let id: ArtifactId = token.parse()?;
        self.get(&id)
    }

    /// Remove every entry older than `ttl`. Returns how many were removed.
    pub fn sweep(&self, ttl: Duration) -> usize {
        sweep::sweep_entries(&self.entries, self.clock.now(), ttl)
    }

    /// Sweep with the store's configured TTL.
    pub fn evict_expired(&self) -> usize {
        self.sweep(self.ttl)
    }
}
