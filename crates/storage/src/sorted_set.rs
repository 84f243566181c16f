//! Score-ordered member set
//!
//! Members are ordered by `(score, member)`: equal scores fall back to the
//! byte order of the member text. Two indexes are kept in step:
//! - `by_score`: ordered `(score, member)` pairs for rank and range queries
//! - `by_member`: member → score for O(1) lookups

use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Sorted set payload
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    by_score: BTreeSet<(OrderedFloat<f64>, String)>,
    by_member: FxHashMap<String, f64>,
}

impl SortedSet {
    /// Number of members
    pub fn len(&self) -> usize {
        self.by_member.len()
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }

    /// Insert or re-score a member; returns true when the member is new
    pub fn insert(&mut self, member: &str, score: f64) -> bool {
        match self.by_member.insert(member.to_string(), score) {
            Some(old) => {
                self.by_score.remove(&(OrderedFloat(old), member.to_string()));
                self.by_score.insert((OrderedFloat(score), member.to_string()));
                false
            }
            None => {
                self.by_score.insert((OrderedFloat(score), member.to_string()));
                true
            }
        }
    }

    /// Insert a member only if absent; returns true when inserted
    pub fn insert_if_absent(&mut self, member: &str, score: f64) -> bool {
        if self.by_member.contains_key(member) {
            return false;
        }
        self.insert(member, score)
    }

    /// Remove a member; returns true when it existed
    pub fn remove(&mut self, member: &str) -> bool {
        match self.by_member.remove(member) {
            Some(score) => {
                self.by_score.remove(&(OrderedFloat(score), member.to_string()));
                true
            }
            None => false,
        }
    }

    /// Score of a member
    pub fn score(&self, member: &str) -> Option<f64> {
        self.by_member.get(member).copied()
    }

    /// 0-based rank, lowest score first
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.score(member)?;
        Some(
            self.by_score
                .range(..(OrderedFloat(score), member.to_string()))
                .count(),
        )
    }

    /// Members in rank order with their scores
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.by_score
            .iter()
            .map(|(score, member)| (member.as_str(), score.into_inner()))
    }

    /// Number of members with `min <= score <= max`
    pub fn count_between(&self, min: f64, max: f64) -> usize {
        if min > max {
            return 0;
        }
        self.by_score
            .range((OrderedFloat(min), String::new())..)
            .take_while(|(score, _)| score.into_inner() <= max)
            .count()
    }
}
