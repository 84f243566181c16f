//! Leaderboard built on sorted sets

use super::*;
use typedkv::{LexRange, TypedTuple};

fn seeded() -> (MemoryStore, Connection) {
    let (store, conn) = connect();
    conn.sorted_sets()
        .add_all(
            "scores",
            [
                TypedTuple::new("ada", 120.0),
                TypedTuple::new("bob", 80.0),
                TypedTuple::new("cy", 95.5),
                TypedTuple::new("dee", 80.0),
            ],
        )
        .unwrap();
    (store, conn)
}

#[test]
fn top_n_comes_from_the_tail() {
    let (_, conn) = seeded();
    let top: Vec<TypedTuple<String>> = conn.sorted_sets().range_with_scores("scores", -2, -1).unwrap();
    assert_eq!(
        top,
        vec![
            TypedTuple::new("cy".to_string(), 95.5),
            TypedTuple::new("ada".to_string(), 120.0),
        ]
    );
}

#[test]
fn equal_scores_rank_by_member() {
    let (_, conn) = seeded();
    assert_eq!(conn.sorted_sets().rank("scores", "bob").unwrap(), Some(0));
    assert_eq!(conn.sorted_sets().rank("scores", "dee").unwrap(), Some(1));
}

#[test]
fn increments_reorder_players() {
    let (_, conn) = seeded();
    let zsets = conn.sorted_sets();
    assert_eq!(zsets.increment_score("scores", "bob", 50.0).unwrap(), 130.0);
    assert_eq!(zsets.reverse_rank("scores", "bob").unwrap(), Some(0));
    assert_eq!(zsets.count("scores", 90.0, 200.0).unwrap(), 3);
}

#[test]
fn lexical_counts_cover_member_names() {
    let (_, conn) = seeded();
    let range = LexRange::parse("[b", "(d").unwrap();
    assert_eq!(conn.sorted_sets().lex_count("scores", &range).unwrap(), 2);
    assert!(LexRange::parse("b", "[d").is_err());
}

#[test]
fn retiring_players() {
    let (store, conn) = seeded();
    let zsets = conn.sorted_sets();
    assert_eq!(zsets.remove("scores", ["ada", "nobody"]).unwrap(), 1);
    assert_eq!(zsets.size("scores").unwrap(), 3);
    zsets.remove("scores", ["bob", "cy", "dee"]).unwrap();
    assert!(store.is_empty());
}
