use bytes::Bytes;
use chrono::Duration;
use murmur_core::{spawn_sweeper, ArtifactStore, ManualClock};
use std::sync::Arc;
use tokio::time::sleep;

#[tokio::test]
async fn sweeper_evicts_without_any_access() {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(ArtifactStore::with_clock(Duration::seconds(10), clock.clone()));
    store.put(Bytes::from_static(b"a"));
    store.put(Bytes::from_static(b"b"));

    let handle = spawn_sweeper(Arc::clone(&store), std::time::Duration::from_millis(10));

    sleep(std::time::Duration::from_millis(40)).await;
    assert_eq!(store.len(), 2, "live entries must survive periodic sweeps");

    clock.advance_secs(11);
    sleep(std::time::Duration::from_millis(60)).await;
    assert!(store.is_empty());

    handle.abort();
}

#[tokio::test]
async fn sweeper_keeps_young_entries() {
    let clock = Arc::new(ManualClock::new());
    let store = Arc::new(ArtifactStore::with_clock(Duration::seconds(10), clock.clone()));
    store.put(Bytes::from_static(b"old"));
    clock.advance_secs(8);
    let young = store.put(Bytes::from_static(b"young"));
    clock.advance_secs(5);

    let handle = spawn_sweeper(Arc::clone(&store), std::time::Duration::from_millis(10));
    sleep(std::time::Duration::from_millis(60)).await;
    handle.abort();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&young).unwrap(), Bytes::from_static(b"young"));
}
