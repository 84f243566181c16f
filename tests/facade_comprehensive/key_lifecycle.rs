//! Key-level operations across collection kinds

use super::*;
use std::time::Duration;
use typedkv::{KeyType, Ttl};

#[test]
fn key_types_follow_the_first_write() {
    let (_, conn) = connect();
    conn.values().set("s", "x").unwrap();
    conn.hashes().put("h", "f", "v").unwrap();
    conn.lists().right_push("l", "x").unwrap();
    conn.sets().add("set", ["x"]).unwrap();
    conn.sorted_sets().add("z", "x", 1.0).unwrap();

    assert_eq!(conn.key_type("s").unwrap(), KeyType::String);
    assert_eq!(conn.key_type("h").unwrap(), KeyType::Hash);
    assert_eq!(conn.key_type("l").unwrap(), KeyType::List);
    assert_eq!(conn.key_type("set").unwrap(), KeyType::Set);
    assert_eq!(conn.key_type("z").unwrap(), KeyType::ZSet);
    assert_eq!(conn.keys("*").unwrap().len(), 5);
}

#[test]
fn rename_keeps_collection_and_expiry() {
    let (_, conn) = connect();
    conn.lists().right_push_all("old", [1, 2]).unwrap();
    conn.expire("old", Duration::from_secs(30)).unwrap();
    conn.rename("old", "new").unwrap();
    assert_eq!(conn.lists().range_all::<i32>("new").unwrap(), vec![1, 2]);
    assert!(matches!(conn.ttl("new").unwrap(), Ttl::Expires(_)));
    assert_eq!(conn.ttl("old").unwrap(), Ttl::Missing);
}

#[test]
fn expired_collections_disappear() {
    let (store, conn) = connect();
    conn.sets().add("s", [1, 2]).unwrap();
    conn.expire("s", Duration::from_millis(20)).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(conn.sets().size("s").unwrap(), 0);
    assert!(!conn.exists("s").unwrap());
    assert!(store.is_empty());
}

#[test]
fn keys_scan_with_many_pages() {
    let (store, conn) = connect();
    let entries: Vec<(String, usize)> = (0..57).map(|i| (format!("k:{:02}", i), i)).collect();
    conn.values().batch_set(entries).unwrap();
    assert_eq!(conn.keys("k:*").unwrap().len(), 57);
    assert_eq!(conn.keys("k:0?").unwrap().len(), 10);
    assert_eq!(store.open_cursors(), 0);
}

#[test]
fn delete_all_counts_existing_keys() {
    let (_, conn) = connect();
    conn.values().batch_set([("a", 1), ("b", 2)]).unwrap();
    assert_eq!(conn.delete_all(["a", "b", "c"]).unwrap(), 2);
    assert!(!conn.delete("a").unwrap());
}

#[test]
fn absolute_expiry() {
    let (_, conn) = connect();
    conn.values().set("report", "q3").unwrap();

    let yesterday = chrono::Utc::now() - chrono::Duration::days(1);
    assert!(!conn.expire_at("report", yesterday).unwrap());
    assert_eq!(conn.ttl("report").unwrap(), Ttl::Persistent);

    let soon = chrono::Utc::now() + chrono::Duration::milliseconds(30);
    assert!(conn.expire_at("report", soon).unwrap());
    std::thread::sleep(Duration::from_millis(60));
    assert!(!conn.exists("report").unwrap());
}
