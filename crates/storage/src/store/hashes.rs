//! Hash commands

use std::collections::HashMap;

use rand::seq::{IteratorRandom, SliceRandom};
use typedkv_core::{HashCommands, Result, ScanCursor, ScanOptions, TransportError};

use super::{float_step, format_float, parse_float_base, parse_int_base, MemoryStore};
use crate::cursor::{select_page, MemoryCursor, PageFn};
use crate::glob::glob_match;

/// Pick random items: distinct when `count >= 0`, with repeats otherwise
pub(crate) fn pick_random<'a, T: Clone + 'a>(
    items: impl Iterator<Item = &'a T>,
    count: i64,
) -> Vec<T> {
    let mut rng = rand::thread_rng();
    if count >= 0 {
        items
            .choose_multiple(&mut rng, count as usize)
            .into_iter()
            .cloned()
            .collect()
    } else {
        let pool: Vec<&T> = items.collect();
        if pool.is_empty() {
            return Vec::new();
        }
        (0..count.unsigned_abs())
            .filter_map(|_| pool.choose(&mut rng).map(|item| (*item).clone()))
            .collect()
    }
}

impl HashCommands for MemoryStore {
    fn hlen(&self, key: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.hash_mut(key)?.map_or(0, |h| h.len() as u64))
    }

    fn hexists(&self, key: &str, field: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .hash_mut(key)?
            .map_or(false, |h| h.contains_key(field)))
    }

    fn hscan(
        &self,
        key: &str,
        options: &ScanOptions,
    ) -> Result<Box<dyn ScanCursor<(String, String)>>> {
        // Type check up front so a wrong-type key fails at open time
        self.lock()?.hash_mut(key)?;
        let key = key.to_string();
        let pattern = options.pattern.clone();
        let fetch: PageFn<(String, String)> = Box::new(move |keyspace, resume_after, page_size| {
            let Some(hash) = keyspace.hash_mut(&key)? else {
                return Ok(Vec::new());
            };
            let candidates = hash
                .iter()
                .filter(|(field, _)| pattern.as_deref().map_or(true, |p| glob_match(p, field)))
                .map(|(field, value)| (field.clone(), (field.clone(), value.clone())));
            Ok(select_page(candidates, resume_after, page_size))
        });
        Ok(Box::new(MemoryCursor::open(
            self.shared(),
            options.count,
            fetch,
        )))
    }

    fn hkeys(&self, key: &str) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .hash_mut(key)?
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.hash_mut(key)?.and_then(|h| h.get(field).cloned()))
    }

    fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>> {
        let mut keyspace = self.lock()?;
        let hash = keyspace.hash_mut(key)?;
        Ok(fields
            .iter()
            .map(|field| hash.as_ref().and_then(|h| h.get(field).cloned()))
            .collect())
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.hash_mut(key)?.cloned().unwrap_or_default())
    }

    fn hvals(&self, key: &str) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .hash_mut(key)?
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default())
    }

    fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        let hash = keyspace.hash_or_insert(key)?;
        Ok(hash.insert(field.to_string(), value.to_string()).is_none())
    }

    fn hset_all(&self, key: &str, entries: &[(String, String)]) -> Result<()> {
        if entries.is_empty() {
            return Err(TransportError::Protocol("wrong number of arguments for 'hset'".into()).into());
        }
        let mut keyspace = self.lock()?;
        let hash = keyspace.hash_or_insert(key)?;
        hash.extend(entries.iter().cloned());
        Ok(())
    }

    fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        let hash = keyspace.hash_or_insert(key)?;
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        let mut keyspace = self.lock()?;
        let stored = keyspace.hash_mut(key)?.and_then(|hash| hash.get(field));
        let base = parse_int_base(key, stored.map(|s| s.as_str()))?;
        let next = base
            .checked_add(delta)
            .ok_or_else(|| TransportError::not_numeric(key))?;
        keyspace
            .hash_or_insert(key)?
            .insert(field.to_string(), next.to_string());
        Ok(next)
    }

    fn hincr_by_float(&self, key: &str, field: &str, delta: f64) -> Result<f64> {
        let mut keyspace = self.lock()?;
        let stored = keyspace.hash_mut(key)?.and_then(|hash| hash.get(field));
        let base = parse_float_base(key, stored.map(|s| s.as_str()))?;
        let next = float_step(key, base, delta)?;
        keyspace
            .hash_or_insert(key)?
            .insert(field.to_string(), format_float(next));
        Ok(next)
    }

    fn hrand_fields(&self, key: &str, count: i64) -> Result<Vec<String>> {
        let mut keyspace = self.lock()?;
        Ok(match keyspace.hash_mut(key)? {
            Some(hash) => pick_random(hash.keys(), count),
            None => Vec::new(),
        })
    }

    fn hrand_entries(&self, key: &str, count: i64) -> Result<Vec<(String, String)>> {
        let mut keyspace = self.lock()?;
        let Some(hash) = keyspace.hash_mut(key)? else {
            return Ok(Vec::new());
        };
        let fields = pick_random(hash.keys(), count);
        Ok(fields
            .into_iter()
            .filter_map(|field| hash.get(&field).cloned().map(|value| (field, value)))
            .collect())
    }

    fn hdel(&self, key: &str, fields: &[String]) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let removed = match keyspace.hash_mut(key)? {
            Some(hash) => fields.iter().filter(|f| hash.remove(*f).is_some()).count(),
            None => 0,
        };
        keyspace.drop_if_empty(key);
        Ok(removed as u64)
    }
}
