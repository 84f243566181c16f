//! Sorted-set commands

use typedkv_core::{LexRange, Result, SortedSetCommands, TransportError};

use super::{resolve_range, MemoryStore};
use crate::sorted_set::SortedSet;

fn check_scores(key: &str, members: &[(String, f64)]) -> Result<()> {
    if members.is_empty() {
        return Err(TransportError::Protocol("wrong number of arguments for 'zadd'".into()).into());
    }
    if members.iter().any(|(_, score)| score.is_nan()) {
        return Err(TransportError::not_numeric(key).into());
    }
    Ok(())
}

fn ranked(set: &SortedSet, start: i64, stop: i64) -> Vec<(String, f64)> {
    match resolve_range(start, stop, set.len()) {
        Some((from, to)) => set
            .iter()
            .skip(from)
            .take(to - from + 1)
            .map(|(member, score)| (member.to_string(), score))
            .collect(),
        None => Vec::new(),
    }
}

impl SortedSetCommands for MemoryStore {
    fn zcard(&self, key: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.zset_mut(key)?.map_or(0, |z| z.len() as u64))
    }

    fn zrem(&self, key: &str, members: &[String]) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let removed = match keyspace.zset_mut(key)? {
            Some(zset) => members.iter().filter(|m| zset.remove(m)).count(),
            None => 0,
        };
        keyspace.drop_if_empty(key);
        Ok(removed as u64)
    }

    fn zcount(&self, key: &str, min: f64, max: f64) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .zset_mut(key)?
            .map_or(0, |z| z.count_between(min, max) as u64))
    }

    fn zlexcount(&self, key: &str, range: &LexRange) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.zset_mut(key)?.map_or(0, |z| {
            z.iter().filter(|(member, _)| range.contains(member)).count() as u64
        }))
    }

    fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        Ok(self
            .zrange_with_scores(key, start, stop)?
            .into_iter()
            .map(|(member, _)| member)
            .collect())
    }

    fn zrange_with_scores(
        &self,
        key: &str,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(String, f64)>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .zset_mut(key)?
            .map(|z| ranked(z, start, stop))
            .unwrap_or_default())
    }

    fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .zset_mut(key)?
            .and_then(|z| z.rank(member))
            .map(|r| r as u64))
    }

    fn zrevrank(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .zset_mut(key)?
            .and_then(|z| z.rank(member).map(|r| (z.len() - 1 - r) as u64)))
    }

    fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.zset_mut(key)?.and_then(|z| z.score(member)))
    }

    fn zadd(&self, key: &str, members: &[(String, f64)]) -> Result<u64> {
        check_scores(key, members)?;
        let mut keyspace = self.lock()?;
        let zset = keyspace.zset_or_insert(key)?;
        let added = members
            .iter()
            .filter(|(member, score)| zset.insert(member, *score))
            .count();
        Ok(added as u64)
    }

    fn zadd_nx(&self, key: &str, members: &[(String, f64)]) -> Result<u64> {
        check_scores(key, members)?;
        let mut keyspace = self.lock()?;
        let zset = keyspace.zset_or_insert(key)?;
        let added = members
            .iter()
            .filter(|(member, score)| zset.insert_if_absent(member, *score))
            .count();
        Ok(added as u64)
    }

    fn zincr_by(&self, key: &str, member: &str, delta: f64) -> Result<f64> {
        let mut keyspace = self.lock()?;
        let zset = keyspace.zset_or_insert(key)?;
        let next = zset.score(member).unwrap_or(0.0) + delta;
        if next.is_nan() {
            keyspace.drop_if_empty(key);
            return Err(TransportError::not_numeric(key).into());
        }
        zset.insert(member, next);
        Ok(next)
    }
}
