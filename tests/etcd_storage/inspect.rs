//! Inspect Tests
//!
//! Snapshots of live entries under a storage's prefix.

use crate::*;

#[tokio::test]
async fn test_inspect_empty() {
    let t = create_storage();
    let details = t.storage.inspect().await.unwrap();
    assert!(!details.is_closed);
    assert!(details.values.is_empty());
}

#[tokio::test]
async fn test_inspect_reports_live_entries() {
    let t = create_storage();
    let a1 = t.storage.create_value("a", "1").await.unwrap().unwrap();
    let a2 = t.storage.update_value("a", "2", Some(a1)).await.unwrap().unwrap();
    let b = t.storage.create_value("b", "1").await.unwrap().unwrap();
    t.storage.create_value("c", "1").await.unwrap().unwrap();
    t.storage.delete_value("c", None).await.unwrap();
    let d = t
        .storage
        .create_or_update_value("dir/d", "4", None)
        .await
        .unwrap()
        .unwrap();

    let details = t.storage.inspect().await.unwrap();
    assert!(!details.is_closed);

    let keys: Vec<&str> = details.values.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "dir/d"]);
    assert_eq!(
        details.values["a"],
        ValueDetails {
            value: "2".into(),
            version: a2
        }
    );
    assert_eq!(details.values["b"].version, b);
    assert_eq!(details.values["dir/d"].version, d);
}

#[tokio::test]
async fn test_inspect_after_close() {
    let t = create_storage();
    t.storage.create_value("a", "1").await.unwrap();
    t.storage.close().await.unwrap();

    let details = t.storage.inspect().await.unwrap();
    assert!(details.is_closed);
    assert!(details.values.is_empty());
}

#[tokio::test]
async fn test_prefixes_isolate_storages() {
    let t = create_storage();
    let other = StorageBuilder::new()
        .prefix(random_prefix())
        .build(Arc::clone(&t.client));

    t.storage.create_value("a", "mine").await.unwrap();
    other.create_value("a", "theirs").await.unwrap();
    other.create_value("b", "theirs").await.unwrap();

    let details = t.storage.inspect().await.unwrap();
    assert_eq!(details.values.len(), 1);
    assert_eq!(details.values["a"].value, "mine");
    assert_eq!(other.inspect().await.unwrap().values.len(), 2);
}

#[tokio::test]
async fn test_inspect_serializes() {
    let t = create_storage();
    let version = t.storage.create_value("a", "1").await.unwrap().unwrap();

    let details = t.storage.inspect().await.unwrap();
    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["is_closed"], false);
    assert_eq!(json["values"]["a"]["value"], "1");
    assert_eq!(json["values"]["a"]["version"], version.raw());
}
