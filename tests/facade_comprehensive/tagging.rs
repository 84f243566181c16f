//! Tagging built on sets

use super::*;
use std::collections::HashSet;

fn tags(conn: &Connection) {
    let sets = conn.sets();
    sets.add("tag:rust", ["post:1", "post:2", "post:3"]).unwrap();
    sets.add("tag:db", ["post:2", "post:3", "post:4"]).unwrap();
    sets.add("tag:draft", ["post:3"]).unwrap();
}

fn owned(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn published_posts_about_both_topics() {
    let (_, conn) = connect();
    tags(&conn);
    let sets = conn.sets();
    sets.intersect_all_and_store(["tag:rust", "tag:db"], "both").unwrap();
    let published: HashSet<String> = sets.difference("both", ["tag:draft"]).unwrap();
    assert_eq!(published, owned(&["post:2"]));
}

#[test]
fn union_of_everything() {
    let (_, conn) = connect();
    tags(&conn);
    let all: HashSet<String> = conn
        .sets()
        .union_all(["tag:rust", "tag:db", "tag:draft"])
        .unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn publishing_moves_between_sets() {
    let (_, conn) = connect();
    tags(&conn);
    let sets = conn.sets();
    assert!(sets.move_to("tag:draft", "post:3", "published").unwrap());
    assert!(!conn.exists("tag:draft").unwrap());
    assert!(sets.is_member("published", "post:3").unwrap());
}

#[test]
fn sampling_members() {
    let (_, conn) = connect();
    tags(&conn);
    let sets = conn.sets();
    let sample: HashSet<String> = sets.distinct_random_members("tag:rust", 2).unwrap();
    assert_eq!(sample.len(), 2);
    assert!(sample.is_subset(&owned(&["post:1", "post:2", "post:3"])));
    let scanned: HashSet<String> = sets.scan("tag:db", "post:[23]").unwrap();
    assert_eq!(scanned, owned(&["post:2", "post:3"]));
}
