//! Storage backend tests across the factory-selectable backends.

use shortgate::config::StorageConfig;
use shortgate::storage::{ShortcodeRecord, StorageFactory, User};
use tempfile::TempDir;

fn record(code: &str, status: u16) -> ShortcodeRecord {
    ShortcodeRecord {
        code: code.to_string(),
        redirect: "https://example.com".to_string(),
        status,
        created_at: chrono::Utc::now(),
    }
}

fn sqlite_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        backend: "sqlite".to_string(),
        path: dir.path().join("test.db").to_str().unwrap().to_string(),
    }
}

fn file_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        backend: "file".to_string(),
        path: dir.path().join("data").to_str().unwrap().to_string(),
    }
}

#[tokio::test]
async fn test_factory_rejects_unknown_backend() {
    let config = StorageConfig {
        backend: "papyrus".to_string(),
        path: String::new(),
    };
    assert!(StorageFactory::create(&config).is_err());
}

#[tokio::test]
async fn test_memory_round_trip() {
    let collections = StorageFactory::memory();

    collections
        .shortcodes
        .set("abc", record("abc", 302))
        .await
        .unwrap();

    let stored = collections.shortcodes.get("abc").await.unwrap().unwrap();
    assert_eq!(stored.redirect, "https://example.com");
    assert_eq!(stored.status, 302);
    assert!(collections.shortcodes.get("zzz").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_round_trip() {
    let dir = TempDir::new().unwrap();
    let collections = StorageFactory::create(&sqlite_config(&dir)).unwrap();

    collections
        .shortcodes
        .set("abc", record("abc", 301))
        .await
        .unwrap();

    let stored = collections.shortcodes.get("abc").await.unwrap().unwrap();
    assert_eq!(stored.code, "abc");
    assert!(collections.shortcodes.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_namespaces_are_independent() {
    let dir = TempDir::new().unwrap();
    let collections = StorageFactory::create(&sqlite_config(&dir)).unwrap();

    collections
        .shortcodes
        .set("key", record("key", 301))
        .await
        .unwrap();

    // Same key, different namespace: no cross-talk.
    assert!(collections.creations.get("key").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let config = sqlite_config(&dir);

    {
        let collections = StorageFactory::create(&config).unwrap();
        collections
            .shortcodes
            .set("keep", record("keep", 308))
            .await
            .unwrap();
    }

    let collections = StorageFactory::create(&config).unwrap();
    let stored = collections.shortcodes.get("keep").await.unwrap().unwrap();
    assert_eq!(stored.status, 308);
}

#[tokio::test]
async fn test_file_round_trip_and_reopen() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    {
        let collections = StorageFactory::create(&config).unwrap();
        collections
            .shortcodes
            .set("f1", record("f1", 303))
            .await
            .unwrap();
    }

    let collections = StorageFactory::create(&config).unwrap();
    let stored = collections.shortcodes.get("f1").await.unwrap().unwrap();
    assert_eq!(stored.status, 303);
}

#[tokio::test]
async fn test_filter_users_by_provider_id() {
    let collections = StorageFactory::memory();

    for (id, provider_id) in [("u1", 100u64), ("u2", 200u64)] {
        let user = User {
            id: id.to_string(),
            provider_id,
            login: format!("login-{}", id),
            profile: serde_json::json!({ "id": provider_id }),
            created_at: chrono::Utc::now(),
        };
        collections.users.set(id, user).await.unwrap();
    }

    let matches = collections
        .users
        .filter(Box::new(|u: &User| u.provider_id == 200))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, "u2");
}

#[tokio::test]
async fn test_filter_on_sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let collections = StorageFactory::create(&sqlite_config(&dir)).unwrap();

    for code in ["a1", "a2", "b1"] {
        collections
            .shortcodes
            .set(code, record(code, 301))
            .await
            .unwrap();
    }

    let matches = collections
        .shortcodes
        .filter(Box::new(|r: &ShortcodeRecord| r.code.starts_with('a')))
        .await
        .unwrap();
    assert_eq!(matches.len(), 2);
}
