//! Sorted-set facade - typed members ordered by score
//!
//! Members are unique per key. Equal scores are ordered by the encoded
//! member text, which the store decides.
//!
//! ## Desugaring
//!
//! | Facade | Transport |
//! |--------|-----------|
//! | `add(key, v, s)` | `zadd(key, [(encode(v), s)]) == 1` |
//! | `add_unscored(key, v)` | `zadd(key, [(encode(v), 0.0)]) == 1` |
//! | `add_all_if_absent(key, ts)` | `zadd_nx(key, ts)` |
//! | `range_with_scores(key, a, b)` | `zrange_with_scores(key, a, b)` |
//! | `increment_score(key, v, d)` | `zincr_by(key, encode(v), d)` |

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use typedkv_core::codec::{decode, decode_all, encode, encode_all};
use typedkv_core::{Error, LexRange, Result, SortedSetCommands, Transport, TypedTuple};

/// Typed access to sorted sets
#[derive(Clone)]
pub struct SortedSetFacade {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for SortedSetFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedSetFacade").finish_non_exhaustive()
    }
}

fn check_score(key: &str, score: f64) -> Result<f64> {
    if score.is_nan() {
        return Err(Error::precondition(format!(
            "score for sorted set '{}' must be a number",
            key
        )));
    }
    Ok(score)
}

fn encode_tuples<I, V>(key: &str, tuples: I) -> Result<Vec<(String, f64)>>
where
    I: IntoIterator<Item = TypedTuple<V>>,
    V: Serialize,
{
    tuples
        .into_iter()
        .map(|t| Ok((encode(&t.value)?, check_score(key, t.score)?)))
        .collect()
}

impl SortedSetFacade {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Number of members
    pub fn size(&self, key: &str) -> Result<u64> {
        self.transport.zcard(key)
    }

    /// Alias of [`SortedSetFacade::size`]
    pub fn cardinality(&self, key: &str) -> Result<u64> {
        self.size(key)
    }

    /// Members with `min <= score <= max`
    pub fn count(&self, key: &str, min: f64, max: f64) -> Result<u64> {
        self.transport.zcount(key, min, max)
    }

    /// Members whose encoded text falls inside `range`
    pub fn lex_count(&self, key: &str, range: &LexRange) -> Result<u64> {
        self.transport.zlexcount(key, range)
    }

    /// Members between two inclusive ranks, lowest score first
    pub fn range<T: DeserializeOwned>(&self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        decode_all(self.transport.zrange(key, start, end)?)
    }

    /// Like [`SortedSetFacade::range`], keeping each member's score
    pub fn range_with_scores<T: DeserializeOwned>(
        &self,
        key: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<TypedTuple<T>>> {
        self.transport
            .zrange_with_scores(key, start, end)?
            .into_iter()
            .map(|(member, score)| Ok(TypedTuple::new(decode::<T>(&member)?, score)))
            .collect()
    }

    /// 0-based rank, lowest score first
    pub fn rank<V: Serialize + ?Sized>(&self, key: &str, member: &V) -> Result<Option<u64>> {
        self.transport.zrank(key, &encode(member)?)
    }

    /// 0-based rank, highest score first
    pub fn reverse_rank<V: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &V,
    ) -> Result<Option<u64>> {
        self.transport.zrevrank(key, &encode(member)?)
    }

    /// Score of a member
    pub fn score<V: Serialize + ?Sized>(&self, key: &str, member: &V) -> Result<Option<f64>> {
        self.transport.zscore(key, &encode(member)?)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Add a member or update its score
    ///
    /// Returns `true` if the member is new; re-adding only updates the score.
    pub fn add<V: Serialize + ?Sized>(&self, key: &str, member: &V, score: f64) -> Result<bool> {
        let score = check_score(key, score)?;
        Ok(self.transport.zadd(key, &[(encode(member)?, score)])? == 1)
    }

    /// Add a member with score 0
    pub fn add_unscored<V: Serialize + ?Sized>(&self, key: &str, member: &V) -> Result<bool> {
        self.add(key, member, 0.0)
    }

    /// Add or update many members, returning how many were new
    pub fn add_all<I, V>(&self, key: &str, tuples: I) -> Result<u64>
    where
        I: IntoIterator<Item = TypedTuple<V>>,
        V: Serialize,
    {
        let tuples = encode_tuples(key, tuples)?;
        if tuples.is_empty() {
            return Ok(0);
        }
        self.transport.zadd(key, &tuples)
    }

    /// Add a member only if it is absent
    pub fn add_if_absent<V: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &V,
        score: f64,
    ) -> Result<bool> {
        let score = check_score(key, score)?;
        Ok(self.transport.zadd_nx(key, &[(encode(member)?, score)])? == 1)
    }

    /// Add a member with score 0 only if it is absent
    pub fn add_if_absent_unscored<V: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &V,
    ) -> Result<bool> {
        self.add_if_absent(key, member, 0.0)
    }

    /// Add the absent members, returning how many were added
    pub fn add_all_if_absent<I, V>(&self, key: &str, tuples: I) -> Result<u64>
    where
        I: IntoIterator<Item = TypedTuple<V>>,
        V: Serialize,
    {
        let tuples = encode_tuples(key, tuples)?;
        if tuples.is_empty() {
            return Ok(0);
        }
        self.transport.zadd_nx(key, &tuples)
    }

    /// Add `delta` to a member's score; a missing member starts at 0
    pub fn increment_score<V: Serialize + ?Sized>(
        &self,
        key: &str,
        member: &V,
        delta: f64,
    ) -> Result<f64> {
        let delta = check_score(key, delta)?;
        self.transport.zincr_by(key, &encode(member)?, delta)
    }

    /// Remove members, returning how many existed
    pub fn remove<I>(&self, key: &str, members: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let members = encode_all(members)?;
        if members.is_empty() {
            return Ok(0);
        }
        self.transport.zrem(key, &members)
    }
}
