//! Lifecycle Tests
//!
//! Close semantics: one-way transition, fail-fast operations, and release
//! of blocked waits.

use crate::*;

#[tokio::test]
async fn test_close_twice_fails() {
    let t = create_storage();
    t.storage.close().await.unwrap();
    assert_closed(t.storage.close().await.unwrap_err());
}

#[tokio::test]
async fn test_operations_fail_after_close() {
    let t = create_storage();
    let version = t.storage.create_value("a", "1").await.unwrap();
    t.storage.close().await.unwrap();

    assert_closed(t.storage.get_value("a").await.unwrap_err());
    assert_closed(t.storage.wait_for_value("a", version).await.unwrap_err());
    assert_closed(t.storage.create_value("b", "1").await.unwrap_err());
    assert_closed(t.storage.update_value("a", "2", version).await.unwrap_err());
    assert_closed(
        t.storage
            .create_or_update_value("a", "2", None)
            .await
            .unwrap_err(),
    );
    assert_closed(t.storage.delete_value("a", None).await.unwrap_err());

    // Nothing reached the store.
    let resp = t.client.get_prefix(t.storage.prefix()).await.unwrap();
    assert_eq!(resp.kvs.len(), 1);
    assert_eq!(resp.kvs[0].value, "1");
}

#[tokio::test]
async fn test_close_releases_blocked_wait() {
    let t = create_storage();
    let storage = Arc::clone(&t.storage);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        storage.close().await.unwrap();
    });

    let err = t.storage.wait_for_value("foo", None).await.unwrap_err();
    assert_closed(err);
    assert_eq!(t.client.watcher_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_releases_all_waiters() {
    let t = create_storage();
    let version = t.storage.create_value("held", "1").await.unwrap();

    const WAITERS: usize = 10;
    let waiters: Vec<_> = (0..WAITERS)
        .map(|i| {
            let storage = Arc::clone(&t.storage);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    storage.wait_for_value("absent", None).await
                } else {
                    storage.wait_for_value("held", version).await
                }
            })
        })
        .collect();

    wait_for_watchers(&t.client, WAITERS).await;
    t.storage.close().await.unwrap();

    for waiter in waiters {
        assert_closed(waiter.await.unwrap().unwrap_err());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_close_has_one_winner() {
    let t = create_storage();

    let closers: Vec<_> = (0..8)
        .map(|_| {
            let storage = Arc::clone(&t.storage);
            tokio::spawn(async move { storage.close().await })
        })
        .collect();

    let mut closed = 0;
    for closer in closers {
        match closer.await.unwrap() {
            Ok(()) => closed += 1,
            Err(err) => assert_closed(err),
        }
    }
    assert_eq!(closed, 1);
}

#[tokio::test]
async fn test_close_does_not_touch_stored_values() {
    let t = create_storage();
    let prefix = t.storage.prefix().to_string();
    t.storage.create_value("a", "1").await.unwrap();
    t.storage.close().await.unwrap();

    let reopened = StorageBuilder::new()
        .prefix(prefix)
        .build(Arc::clone(&t.client));
    assert_eq!(reopened.get_value("a").await.unwrap().unwrap().value, "1");
}
