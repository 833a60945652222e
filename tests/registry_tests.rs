//! Resource control registry tests

use orca_gate::access_control::{AccessPolicy, ResourceKind};
use orca_gate::config::RegistryConfig;
use orca_gate::error::RegistryError;
use orca_gate::registry::{FileStore, ResourceControlStore, open_store};
use std::fs;
use tempfile::tempdir;

const CONTROLS_TOML: &str = r#"
[[resource_controls]]
resource_id = "web"
kind = "stack"
owner = "alice"
access = { type = "teams", teams = ["frontend"] }

[[resource_controls]]
resource_id = "s1"
kind = "secret"
access = { type = "users", users = ["alice", "bob"] }
"#;

#[tokio::test]
async fn test_open_toml_registry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.toml");
    fs::write(&path, CONTROLS_TOML).unwrap();

    let store = FileStore::open(&path).await.unwrap();
    assert_eq!(store.store_type(), "file");
    assert_eq!(store.path(), path.as_path());

    let snapshot = store.snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    let web = snapshot.get(ResourceKind::Stack, "web").unwrap();
    assert_eq!(web.access, AccessPolicy::teams(["frontend"]));
}

#[tokio::test]
async fn test_open_json_registry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.json");
    fs::write(
        &path,
        r#"{"resource_controls": [{"resource_id": "n1", "kind": "network", "access": {"type": "public"}}]}"#,
    )
    .unwrap();

    let store = FileStore::open(&path).await.unwrap();
    let controls = store.list_resource_controls().await.unwrap();
    assert_eq!(controls.len(), 1);
    assert_eq!(controls[0].kind, ResourceKind::Network);
}

#[tokio::test]
async fn test_reload_swaps_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.toml");
    fs::write(&path, CONTROLS_TOML).unwrap();

    let store = FileStore::open(&path).await.unwrap();
    let before = store.snapshot().await.unwrap();

    fs::write(
        &path,
        r#"
[[resource_controls]]
resource_id = "s1"
kind = "secret"
access = { type = "administrators_only" }
"#,
    )
    .unwrap();
    assert_eq!(store.reload().await.unwrap(), 1);

    // Snapshots taken earlier are unaffected
    assert_eq!(before.len(), 2);
    let after = store.snapshot().await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(
        after.get(ResourceKind::Secret, "s1").unwrap().access,
        AccessPolicy::AdministratorsOnly
    );
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.toml");
    fs::write(&path, CONTROLS_TOML).unwrap();

    let store = FileStore::open(&path).await.unwrap();
    fs::write(&path, "[[resource_controls]]\nkind = 12\n").unwrap();

    assert!(matches!(store.reload().await, Err(RegistryError::Parse { .. })));
    assert_eq!(store.snapshot().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_entries_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.toml");
    fs::write(
        &path,
        r#"
[[resource_controls]]
resource_id = "web"
kind = "stack"
access = { type = "public" }

[[resource_controls]]
resource_id = "web"
kind = "stack"
access = { type = "administrators_only" }
"#,
    )
    .unwrap();

    let result = FileStore::open(&path).await;
    assert!(matches!(result, Err(RegistryError::Duplicate { .. })));
}

#[tokio::test]
async fn test_unsupported_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.yaml");
    fs::write(&path, "resource_controls: []").unwrap();

    let result = FileStore::open(&path).await;
    assert!(matches!(result, Err(RegistryError::UnsupportedFormat { .. })));
}

#[tokio::test]
async fn test_missing_file() {
    let result = FileStore::open("/nonexistent/controls.toml").await;
    assert!(matches!(result, Err(RegistryError::Read { .. })));
}

#[tokio::test]
async fn test_open_store_from_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("controls.toml");
    fs::write(&path, CONTROLS_TOML).unwrap();

    let config = RegistryConfig {
        path: Some(path.to_str().unwrap().to_string()),
    };
    let store = open_store(&config).await.unwrap();
    assert_eq!(store.store_type(), "file");
    assert_eq!(store.snapshot().await.unwrap().len(), 2);
}
