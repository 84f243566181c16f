//! Connections configured from `typedkv.toml`

use super::*;
use std::collections::HashSet;
use tempfile::TempDir;
use typedkv::{Error, MaxWait, CONFIG_FILE_NAME};

#[test]
fn config_file_drives_connection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "scan_count = 2\nallow_unbounded_blocking = true\n").unwrap();

    let config = FacadeConfig::from_file(&path).unwrap();
    let (store, conn) = connect_with(config);
    assert_eq!(conn.config().scan_count, 2);

    conn.sets().add("s", 0..9).unwrap();
    let all: HashSet<i32> = conn.sets().scan("s", "*").unwrap();
    assert_eq!(all.len(), 9);
    assert_eq!(store.open_cursors(), 0);

    conn.lists().right_push("q", "ready").unwrap();
    let popped: Option<String> = conn.lists().left_pop_blocking("q", MaxWait::Unbounded).unwrap();
    assert_eq!(popped.as_deref(), Some("ready"));
}

#[test]
fn default_file_is_written_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    FacadeConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(FacadeConfig::from_file(&path).unwrap(), FacadeConfig::default());
}

#[test]
fn invalid_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "scan_count = 0\n").unwrap();
    assert!(matches!(FacadeConfig::from_file(&path), Err(Error::ConfigError(_))));
}
