//! User profiles stored as whole values and as hashes

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use typedkv::{Error, Ttl};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    age: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct ProfileV2 {
    name: String,
    age: u32,
    #[serde(default)]
    nickname: Option<String>,
}

#[test]
fn schema_changes_decode_leniently() {
    let (_, conn) = connect();
    conn.values()
        .set(
            "p:1",
            &ProfileV2 {
                name: "ada".into(),
                age: 36,
                nickname: Some("countess".into()),
            },
        )
        .unwrap();
    // Older readers ignore the new field.
    let old: Profile = conn.values().get("p:1").unwrap().unwrap();
    assert_eq!(old.name, "ada");

    // Newer readers default the missing field.
    conn.values()
        .set(
            "p:2",
            &Profile {
                name: "bob".into(),
                age: 40,
            },
        )
        .unwrap();
    let new: ProfileV2 = conn.values().get("p:2").unwrap().unwrap();
    assert_eq!(new.nickname, None);
}

#[test]
fn mismatched_type_is_a_decoding_error() {
    let (_, conn) = connect();
    conn.values().set("p", "just text").unwrap();
    let err = conn.values().get::<Profile>("p").unwrap_err();
    assert!(matches!(err, Error::DecodingError { .. }));
}

#[test]
fn session_values_expire() {
    let (_, conn) = connect();
    assert!(conn
        .values()
        .set_if_absent_with_expiry("session:ada", "token", Duration::from_secs(60))
        .unwrap());
    assert!(matches!(conn.ttl("session:ada").unwrap(), Ttl::Expires(d) if d <= Duration::from_secs(60)));
    conn.values().set("session:ada", "rotated").unwrap();
    assert_eq!(conn.ttl("session:ada").unwrap(), Ttl::Persistent);
}

#[test]
fn profile_fields_in_a_hash() {
    let (_, conn) = connect();
    let hashes = conn.hashes();
    hashes
        .put_all("user:1", [("name", "ada"), ("city", "london")])
        .unwrap();
    assert_eq!(hashes.increment("user:1", "logins", 1).unwrap(), 1);
    assert!(!hashes.put_if_absent("user:1", "name", "eve").unwrap());

    let fields: HashMap<String, String> = hashes.scan_fields("user:1", "*").unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields["logins"], "1");
    assert_eq!(hashes.get::<u32>("user:1", "logins").unwrap(), Some(1));
}

#[test]
fn counters_and_appends() {
    let (_, conn) = connect();
    let values = conn.values();
    assert_eq!(values.increment("visits", 3).unwrap(), 3);
    assert_eq!(values.decrement("visits", 1).unwrap(), 2);
    assert!((values.increment_float("ratio", 0.25).unwrap() - 0.25).abs() < f64::EPSILON);
    assert_eq!(values.append("log", "a|").unwrap(), 2);
    assert_eq!(values.append("log", "b|").unwrap(), 4);
    assert_eq!(values.get::<String>("log").unwrap(), Some("a|b|".into()));
}
