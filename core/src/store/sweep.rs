// Age-based eviction
//
// The store runs `sweep_entries` before every put/get. The optional periodic
// sweeper below only removes what the next access would remove anyway.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Artifact, ArtifactId, ArtifactStore};

/// Remove every entry whose age exceeds `ttl`. Returns the number removed.
pub(crate) fn sweep_entries(
    entries: &DashMap<ArtifactId, Artifact>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> usize {
    if entries.is_empty() {
        return 0;
    }
    let mut removed = 0usize;
    entries.retain(|_, artifact| {
        let keep = !artifact.is_expired(now, ttl);
        if !keep {
            removed += 1;
        }
        keep
    });
    removed
}

/// Spawn a task that evicts expired artifacts every `every`.
///
/// The first tick is skipped so a freshly started server does not sweep an
/// empty store. Abort the returned handle to stop it.
pub fn spawn_sweeper(store: Arc<ArtifactStore>, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = store.evict_expired();
            if removed > 0 {
                debug!(target: "sweeper", removed, remaining = store.len(), "Evicted expired artifacts");
            }
        }
    })
}
