use chrono::{Duration as ChronoDuration, Utc};
use portcullis::domain::RevocationStore;
use portcullis::infra::InMemoryRevocationStore;
use std::sync::Arc;
use std::time::Duration;

fn store() -> InMemoryRevocationStore {
    InMemoryRevocationStore::new(Duration::from_secs(86400))
}

#[tokio::test]
async fn revoked_token_is_reported_revoked() {
    let store = store();
    let issued_at = Utc::now();

    store.revoke("token-a").await.unwrap();

    assert!(store.is_revoked("token-a", "u1", issued_at).await.unwrap());
    assert!(!store.is_revoked("token-b", "u1", issued_at).await.unwrap());
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let store = store();

    store.revoke("token-a").await.unwrap();
    store.revoke("token-a").await.unwrap();

    assert_eq!(store.stats().revoked_tokens, 1);
    assert!(store.is_revoked("token-a", "u1", Utc::now()).await.unwrap());
}

#[tokio::test]
async fn watermark_kills_tokens_issued_at_or_before_it() {
    let store = store();

    store.revoke_all("u1").await.unwrap();

    let before = Utc::now() - ChronoDuration::seconds(5);
    let after = Utc::now() + ChronoDuration::seconds(5);
    assert!(store.is_revoked("any-token", "u1", before).await.unwrap());
    assert!(!store.is_revoked("any-token", "u1", after).await.unwrap());
    // other subjects are untouched
    assert!(!store.is_revoked("any-token", "u2", before).await.unwrap());
}

#[tokio::test]
async fn sweep_removes_only_entries_older_than_retention() {
    let store = InMemoryRevocationStore::new(Duration::from_millis(200));
    let issued_at = Utc::now();

    store.revoke("old-token").await.unwrap();
    store.revoke_all("old-subject").await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    store.revoke("fresh-token").await.unwrap();

    let removed = store.sweep();
    assert_eq!(removed, 2);

    assert!(!store.is_revoked("old-token", "u1", issued_at).await.unwrap());
    assert!(!store.is_revoked("t", "old-subject", issued_at).await.unwrap());
    assert!(store.is_revoked("fresh-token", "u1", issued_at).await.unwrap());

    let stats = store.stats();
    assert_eq!(stats.revoked_tokens, 1);
    assert_eq!(stats.subject_watermarks, 0);
}

#[tokio::test]
async fn sweep_on_an_empty_store_removes_nothing() {
    let store = store();
    assert_eq!(store.sweep(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_revokes_of_one_token_leave_one_entry() {
    let store = Arc::new(store());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.revoke("contended-token").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.stats().revoked_tokens, 1);
    assert!(
        store
            .is_revoked("contended-token", "u1", Utc::now())
            .await
            .unwrap()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn reads_and_writes_interleave_without_errors() {
    let store = Arc::new(store());
    let issued_at = Utc::now();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..50 {
                store.revoke(&format!("token-{i}-{j}")).await.unwrap();
            }
        }));
    }
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..50 {
                // result is pre- or post-revoke, never an error
                let _ = store
                    .is_revoked(&format!("token-{i}-{j}"), "u1", issued_at)
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.stats().revoked_tokens, 8 * 50);
    for i in 0..8 {
        assert!(
            store
                .is_revoked(&format!("token-{i}-0"), "u1", issued_at)
                .await
                .unwrap()
        );
    }
}
