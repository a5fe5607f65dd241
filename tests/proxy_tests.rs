// Registry mirror config file updates

use doke::proxy::{DEFAULT_MIRRORS, MirrorChange, ResetReason, update_config_file};
use serde_json::{Value, json};

fn read(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_update_keeps_other_settings() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("daemon.json");
    std::fs::write(&path, r#"{"log-driver": "json-file", "registry-mirrors": ["https://mine"]}"#)
        .unwrap();

    let changes = update_config_file(&path, &DEFAULT_MIRRORS).expect("update");

    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| matches!(c, MirrorChange::Added(_))));
    let written = read(&path);
    assert_eq!(written["log-driver"], json!("json-file"));
    assert_eq!(
        written["registry-mirrors"],
        json!(["https://mine", DEFAULT_MIRRORS[0], DEFAULT_MIRRORS[1]])
    );
}

#[test]
fn test_update_is_idempotent() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("daemon.json");
    std::fs::write(&path, "{}").unwrap();

    let first = update_config_file(&path, &DEFAULT_MIRRORS).unwrap();
    assert_eq!(first[0], MirrorChange::Reset(ResetReason::Missing));
    let second = update_config_file(&path, &DEFAULT_MIRRORS).unwrap();
    assert!(second
        .iter()
        .all(|c| matches!(c, MirrorChange::AlreadyPresent(_))));
    assert_eq!(read(&path)["registry-mirrors"], json!(DEFAULT_MIRRORS));
}

#[test]
fn test_update_rejects_non_object_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("daemon.json");
    std::fs::write(&path, "[1, 2]").unwrap();

    let err = update_config_file(&path, &DEFAULT_MIRRORS).unwrap_err();
    assert!(err.to_string().contains("parsing engine config"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1, 2]");
}

#[test]
fn test_update_missing_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = update_config_file(&path, &DEFAULT_MIRRORS).unwrap_err();
    assert!(err.to_string().contains("reading engine config"));
}
