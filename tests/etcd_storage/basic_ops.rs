//! Basic Operations Tests
//!
//! Reads, creates, unconditional writes and deletes.

use crate::*;

#[tokio::test]
async fn test_get_nonexistent_returns_none() {
    let t = create_storage();
    assert_eq!(t.storage.get_value("never-written").await.unwrap(), None);
}

#[tokio::test]
async fn test_create_then_get() {
    let t = create_storage();
    let version = t.storage.create_value("a", "1").await.unwrap().unwrap();

    let current = t.storage.get_value("a").await.unwrap().unwrap();
    assert_eq!(current, Versioned::new("1", version));
}

#[tokio::test]
async fn test_create_twice_never_overwrites() {
    let t = create_storage();
    let version = t.storage.create_value("a", "1").await.unwrap().unwrap();

    assert_eq!(t.storage.create_value("a", "2").await.unwrap(), None);

    let current = t.storage.get_value("a").await.unwrap().unwrap();
    assert_eq!(current, Versioned::new("1", version));
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let t = create_storage();

    let v1 = t.storage.create_value("a", "1").await.unwrap().unwrap();
    let v2 = t
        .storage
        .update_value("a", "2", Some(v1))
        .await
        .unwrap()
        .unwrap();
    assert!(v2 > v1);

    assert_eq!(
        t.storage.get_value("a").await.unwrap(),
        Some(Versioned::new("2", v2))
    );
    assert!(t.storage.delete_value("a", Some(v2)).await.unwrap());
    assert_eq!(t.storage.get_value("a").await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_without_version() {
    let t = create_storage();
    t.storage.create_value("a", "1").await.unwrap();

    assert!(t.storage.delete_value("a", None).await.unwrap());
    assert!(!t.storage.delete_value("a", None).await.unwrap());
}

#[tokio::test]
async fn test_delete_nonexistent_returns_false() {
    let t = create_storage();
    assert!(!t.storage.delete_value("missing", None).await.unwrap());
}

#[tokio::test]
async fn test_create_or_update_without_version_always_writes() {
    let t = create_storage();

    let v1 = t
        .storage
        .create_or_update_value("a", "x", None)
        .await
        .unwrap()
        .unwrap();
    let v2 = t
        .storage
        .create_or_update_value("a", "x", None)
        .await
        .unwrap()
        .unwrap();
    assert!(v2 > v1);

    assert_eq!(
        t.storage.get_value("a").await.unwrap(),
        Some(Versioned::new("x", v2))
    );
}

#[tokio::test]
async fn test_versions_increase_across_keys() {
    let t = create_storage();
    let a = t.storage.create_value("a", "1").await.unwrap().unwrap();
    let b = t.storage.create_value("b", "1").await.unwrap().unwrap();
    let a2 = t.storage.update_value("a", "2", Some(a)).await.unwrap().unwrap();

    assert!(b > a);
    assert!(a2 > b);
}

#[tokio::test]
async fn test_empty_value_is_a_value() {
    let t = create_storage();
    let version = t.storage.create_value("a", "").await.unwrap().unwrap();

    assert_eq!(
        t.storage.get_value("a").await.unwrap(),
        Some(Versioned::new("", version))
    );
}

#[tokio::test]
async fn test_special_and_unicode_keys() {
    let t = create_storage();
    let keys = [
        "key-with-dashes",
        "key.with.dots",
        "key/with/slashes",
        "key:with:colons",
        "key_\u{65e5}\u{672c}",
        "key_\u{1f600}",
    ];

    for key in keys {
        let version = t.storage.create_value(key, key).await.unwrap().unwrap();
        let current = t.storage.get_value(key).await.unwrap();
        assert_eq!(current, Some(Versioned::new(key, version)), "key {}", key);
    }
}

#[tokio::test]
async fn test_large_value() {
    let t = create_storage();
    let large: String = (0..1_000_000).map(|i| ((i % 26) as u8 + b'a') as char).collect();

    t.storage.create_value("large", &large).await.unwrap().unwrap();
    let current = t.storage.get_value("large").await.unwrap().unwrap();
    assert_eq!(current.value.len(), 1_000_000);
    assert_eq!(current.value, large);
}

#[tokio::test]
async fn test_usable_as_trait_object() {
    let client = Arc::new(MemoryClient::new());
    let storage: Arc<dyn Storage> = StorageBuilder::new()
        .prefix(random_prefix())
        .build_dyn(client);

    let version = storage.create_value("a", "1").await.unwrap();
    assert!(version.is_some());
    assert_eq!(storage.get_value("a").await.unwrap().unwrap().value, "1");
}
