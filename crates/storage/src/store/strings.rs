//! Scalar (string) commands

use std::time::{Duration, Instant};

use typedkv_core::{Result, StringCommands, TransportError};

use super::{float_step, format_float, parse_float_base, parse_int_base, MemoryStore};
use crate::entry::{Data, Entry};

fn scalar(value: &str, ttl: Option<Duration>) -> Entry {
    let data = Data::Str(value.to_string());
    match ttl {
        Some(ttl) => Entry::with_expiry(data, Instant::now() + ttl),
        None => Entry::new(data),
    }
}

impl StringCommands for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut keyspace = self.lock()?;
        Ok(keyspace.string_mut(key)?.cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.put(key, scalar(value, None));
        Ok(())
    }

    fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(TransportError::Protocol("invalid expire time in 'set'".to_string()).into());
        }
        self.lock()?.put(key, scalar(value, Some(ttl)));
        Ok(())
    }

    fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool> {
        if ttl.map_or(false, |t| t.is_zero()) {
            return Err(TransportError::Protocol("invalid expire time in 'set'".to_string()).into());
        }
        let mut keyspace = self.lock()?;
        if keyspace.contains(key) {
            return Ok(false);
        }
        keyspace.put(key, scalar(value, ttl));
        Ok(true)
    }

    fn append(&self, key: &str, value: &str) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let current = keyspace.string_or_insert(key)?;
        current.push_str(value);
        Ok(current.len() as u64)
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let mut keyspace = self.lock()?;
        let base = parse_int_base(key, keyspace.string_mut(key)?.map(|s| s.as_str()))?;
        let next = base
            .checked_add(delta)
            .ok_or_else(|| TransportError::not_numeric(key))?;
        *keyspace.string_or_insert(key)? = next.to_string();
        Ok(next)
    }

    fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64> {
        let mut keyspace = self.lock()?;
        let base = parse_float_base(key, keyspace.string_mut(key)?.map(|s| s.as_str()))?;
        let next = float_step(key, base, delta)?;
        *keyspace.string_or_insert(key)? = format_float(next);
        Ok(next)
    }

    fn get_set(&self, key: &str, value: &str) -> Result<Option<String>> {
        let mut keyspace = self.lock()?;
        let previous = keyspace.string_mut(key)?.cloned();
        keyspace.put(key, scalar(value, None));
        Ok(previous)
    }

    fn get_del(&self, key: &str) -> Result<Option<String>> {
        let mut keyspace = self.lock()?;
        let value = keyspace.string_mut(key)?.cloned();
        if value.is_some() {
            keyspace.take(key);
        }
        Ok(value)
    }

    fn mset(&self, entries: &[(String, String)]) -> Result<()> {
        let mut keyspace = self.lock()?;
        for (key, value) in entries {
            keyspace.put(key, scalar(value, None));
        }
        Ok(())
    }

    fn mset_nx(&self, entries: &[(String, String)]) -> Result<bool> {
        let mut keyspace = self.lock()?;
        if entries.iter().any(|(key, _)| keyspace.contains(key)) {
            return Ok(false);
        }
        for (key, value) in entries {
            keyspace.put(key, scalar(value, None));
        }
        Ok(true)
    }

    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut keyspace = self.lock()?;
        Ok(keys
            .iter()
            .map(|key| match keyspace.live_mut(key) {
                Some(Entry {
                    data: Data::Str(value),
                    ..
                }) => Some(value.clone()),
                _ => None,
            })
            .collect())
    }
}
