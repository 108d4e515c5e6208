use bytes::Bytes;
use chrono::Duration;
use murmur_core::{ArtifactId, ArtifactStore, ManualClock, MurmurError};
use std::sync::Arc;

fn store_with_clock(ttl_secs: i64) -> (ArtifactStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let store = ArtifactStore::with_clock(Duration::seconds(ttl_secs), clock.clone());
    (store, clock)
}

#[test]
fn put_then_get_round_trips() {
    let (store, _clock) = store_with_clock(60);
    let id = store.put(Bytes::from_static(b"ID3\x04mp3-bytes"));
    assert_eq!(store.get(&id).unwrap(), Bytes::from_static(b"ID3\x04mp3-bytes"));
    assert_eq!(store.len(), 1);
}

#[test]
fn ttl_window_scenario() {
    let (store, clock) = store_with_clock(2);
    let id = store.put(Bytes::from_static(b"abc"));

    clock.advance_secs(1);
    assert_eq!(store.get(&id).unwrap(), Bytes::from_static(b"abc"));

    clock.advance_secs(2);
    assert!(matches!(store.get(&id), Err(MurmurError::NotFound(_))));
    assert!(store.is_empty(), "expired entry should have been swept");
}

#[test]
fn entry_is_live_exactly_at_ttl() {
    let (store, clock) = store_with_clock(5);
    let id = store.put(Bytes::from_static(b"edge"));

    clock.advance_secs(5);
    assert!(store.get(&id).is_ok());

    clock.advance(Duration::milliseconds(1));
    assert!(store.get(&id).is_err());
}

#[test]
fn unknown_id_is_not_found() {
    let (store, _clock) = store_with_clock(60);
    let issued = store.put(Bytes::from_static(b"mine"));
    let other = loop {
        let candidate = ArtifactId::random();
        if candidate != issued {
            break candidate;
        }
    };
    assert!(matches!(store.get(&other), Err(MurmurError::NotFound(_))));
    assert_eq!(store.get(&issued).unwrap(), Bytes::from_static(b"mine"));
}

#[test]
fn get_str_parses_locator_tokens() {
    let (store, _clock) = store_with_clock(60);
    let id = store.put(Bytes::from_static(b"tok"));
    assert_eq!(store.get_str(&id.to_string()).unwrap(), Bytes::from_static(b"tok"));
    assert!(matches!(store.get_str("not-an-id"), Err(MurmurError::NotFound(_))));
    assert!(matches!(store.get_str("../../etc/passwd"), Err(MurmurError::NotFound(_))));
}

#[test]
fn ids_are_unique_per_put() {
    let (store, _clock) = store_with_clock(60);
    let a = store.put(Bytes::from_static(b"same"));
    let b = store.put(Bytes::from_static(b"same"));
    assert_ne!(a, b);
    assert_eq!(store.len(), 2);
}

#[test]
fn sweep_removes_only_expired_entries() {
    let (store, clock) = store_with_clock(10);
    let old = store.put(Bytes::from_static(b"old"));
    clock.advance_secs(6);
    let young = store.put(Bytes::from_static(b"young"));
    clock.advance_secs(5);

    assert_eq!(store.evict_expired(), 1);
    assert!(store.get(&old).is_err());
    assert_eq!(store.get(&young).unwrap(), Bytes::from_static(b"young"));
}

#[test]
fn sweep_is_idempotent() {
    let (store, clock) = store_with_clock(1);
    store.put(Bytes::from_static(b"a"));
    store.put(Bytes::from_static(b"b"));
    clock.advance_secs(2);

    assert_eq!(store.evict_expired(), 2);
    assert_eq!(store.evict_expired(), 0);
    assert!(store.is_empty());
}

#[test]
fn sweep_on_empty_store_is_noop() {
    let (store, _clock) = store_with_clock(1);
    assert_eq!(store.sweep(Duration::seconds(1)), 0);
    assert_eq!(store.sweep(Duration::seconds(-1)), 0);
}

#[test]
fn sweep_accepts_explicit_ttl() {
    let (store, clock) = store_with_clock(3_600);
    store.put(Bytes::from_static(b"a"));
    clock.advance_secs(30);
    assert_eq!(store.sweep(Duration::seconds(60)), 0);
    assert_eq!(store.sweep(Duration::seconds(10)), 1);
}

#[test]
fn negative_ttl_expires_immediately() {
    let (store, _clock) = store_with_clock(-1);
    let id = store.put(Bytes::from_static(b"gone"));
    assert!(matches!(store.get(&id), Err(MurmurError::NotFound(_))));
}

#[test]
fn zero_ttl_keeps_entry_only_for_the_same_instant() {
    let (store, clock) = store_with_clock(0);
    let id = store.put(Bytes::from_static(b"now"));
    assert!(store.get(&id).is_ok());
    clock.advance(Duration::milliseconds(1));
    assert!(store.get(&id).is_err());
}

#[test]
fn ttl_from_secs_saturates() {
    assert_eq!(murmur_core::ttl_from_secs(3_600), Duration::seconds(3_600));
    assert_eq!(murmur_core::ttl_from_secs(-5), Duration::seconds(-5));
    assert!(murmur_core::ttl_from_secs(i64::MAX) > Duration::days(365 * 1_000));
}

#[test]
fn concurrent_puts_and_gets_do_not_corrupt_keys() {
    let store = Arc::new(ArtifactStore::new(Duration::seconds(60)));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..200u32 {
                    let payload = Bytes::from(format!("{t}-{i}"));
                    let id = store.put(payload.clone());
                    assert_eq!(store.get(&id).unwrap(), payload);
                    ids.push((id, payload));
                }
                ids
            })
        })
        .collect();

    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().unwrap());
    }
    assert_eq!(store.len(), 8 * 200);
    for (id, payload) in all {
        assert_eq!(store.get(&id).unwrap(), payload);
    }
}
