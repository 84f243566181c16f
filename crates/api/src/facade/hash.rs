//! Hash facade - typed fields and values under one key
//!
//! Fields and values both go through the codec, so a hash can be keyed by
//! any serializable type, not only text.
//!
//! ## Desugaring
//!
//! | Facade | Transport |
//! |--------|-----------|
//! | `get::<V>(key, field)` | `hget(key, encode(field))` |
//! | `put(key, field, value)` | `hset(key, encode(field), encode(value))` |
//! | `scan_fields(key, pattern)` | `hscan(key, MATCH pattern)`, drained |
//! | `random_fields(key, n)` | `hrand_fields(key, -n)` |
//! | `random_entries(key, n)` | `hrand_entries(key, n)` |

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use typedkv_core::codec::{
    decode, decode_all, decode_each, decode_map, decode_opt, decode_set, encode, encode_all,
    encode_pairs,
};
use typedkv_core::{HashCommands, Result, Transport};

use super::cursor::CursorGuard;
use super::signed_count;
use crate::config::FacadeConfig;

/// Typed access to hashes
#[derive(Clone)]
pub struct HashFacade {
    transport: Arc<dyn Transport>,
    config: Arc<FacadeConfig>,
}

impl fmt::Debug for HashFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashFacade")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HashFacade {
    pub(crate) fn new(transport: Arc<dyn Transport>, config: Arc<FacadeConfig>) -> Self {
        Self { transport, config }
    }

    /// Number of fields
    pub fn size(&self, key: &str) -> Result<u64> {
        self.transport.hlen(key)
    }

    /// Whether a field exists
    pub fn has_field<F: Serialize + ?Sized>(&self, key: &str, field: &F) -> Result<bool> {
        self.transport.hexists(key, &encode(field)?)
    }

    /// Fields and values whose field matches `pattern`
    ///
    /// Uses a server-side cursor, which is always released before returning.
    pub fn scan_fields<F, V>(&self, key: &str, pattern: &str) -> Result<HashMap<F, V>>
    where
        F: DeserializeOwned + Eq + Hash,
        V: DeserializeOwned,
    {
        let cursor = self
            .transport
            .hscan(key, &self.config.scan_options(pattern))?;
        CursorGuard::new(cursor)
            .drain_map(|(field, value)| Ok((decode::<F>(&field)?, decode::<V>(&value)?)))
    }

    /// All field names
    pub fn fields<F: DeserializeOwned + Eq + Hash>(&self, key: &str) -> Result<HashSet<F>> {
        decode_set(self.transport.hkeys(key)?)
    }

    /// Read one field
    ///
    /// Returns `None` if the key or the field doesn't exist.
    pub fn get<V: DeserializeOwned>(
        &self,
        key: &str,
        field: &(impl Serialize + ?Sized),
    ) -> Result<Option<V>> {
        decode_opt(self.transport.hget(key, &encode(field)?)?)
    }

    /// Read many fields, aligned with `fields`
    pub fn multi_get<V, I>(&self, key: &str, fields: I) -> Result<Vec<Option<V>>>
    where
        V: DeserializeOwned,
        I: IntoIterator,
        I::Item: Serialize,
    {
        let fields = encode_all(fields)?;
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        decode_each(self.transport.hmget(key, &fields)?)
    }

    /// Every field and value
    pub fn entries<F, V>(&self, key: &str) -> Result<HashMap<F, V>>
    where
        F: DeserializeOwned + Eq + Hash,
        V: DeserializeOwned,
    {
        decode_map(self.transport.hgetall(key)?)
    }

    /// Every value
    pub fn values<V: DeserializeOwned>(&self, key: &str) -> Result<Vec<V>> {
        decode_all(self.transport.hvals(key)?)
    }

    /// Write one field
    ///
    /// Returns `true` if the field is new.
    pub fn put<F, V>(&self, key: &str, field: &F, value: &V) -> Result<bool>
    where
        F: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.transport.hset(key, &encode(field)?, &encode(value)?)
    }

    /// Write many fields
    pub fn put_all<I, F, V>(&self, key: &str, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (F, V)>,
        F: Serialize,
        V: Serialize,
    {
        let entries = encode_pairs(entries)?;
        if entries.is_empty() {
            return Ok(());
        }
        self.transport.hset_all(key, &entries)
    }

    /// Write a field only if it is absent
    pub fn put_if_absent<F, V>(&self, key: &str, field: &F, value: &V) -> Result<bool>
    where
        F: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        self.transport
            .hset_nx(key, &encode(field)?, &encode(value)?)
    }

    /// Integer increment of a field; a missing field starts at 0
    pub fn increment<F: Serialize + ?Sized>(&self, key: &str, field: &F, delta: i64) -> Result<i64> {
        self.transport.hincr_by(key, &encode(field)?, delta)
    }

    /// Float increment of a field; a missing field starts at 0
    pub fn increment_float<F: Serialize + ?Sized>(
        &self,
        key: &str,
        field: &F,
        delta: f64,
    ) -> Result<f64> {
        self.transport.hincr_by_float(key, &encode(field)?, delta)
    }

    /// One random field name
    pub fn random_field<F: DeserializeOwned>(&self, key: &str) -> Result<Option<F>> {
        decode_opt(self.transport.hrand_fields(key, 1)?.pop())
    }

    /// `count` random field names; the same field may appear more than once
    pub fn random_fields<F: DeserializeOwned>(&self, key: &str, count: usize) -> Result<Vec<F>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        decode_all(self.transport.hrand_fields(key, -signed_count(count)?)?)
    }

    /// One random field and its value
    pub fn random_entry<F, V>(&self, key: &str) -> Result<Option<(F, V)>>
    where
        F: DeserializeOwned,
        V: DeserializeOwned,
    {
        self.transport
            .hrand_entries(key, 1)?
            .pop()
            .map(|(field, value)| Ok((decode(&field)?, decode(&value)?)))
            .transpose()
    }

    /// Up to `count` distinct random fields with their values
    pub fn random_entries<F, V>(&self, key: &str, count: usize) -> Result<HashMap<F, V>>
    where
        F: DeserializeOwned + Eq + Hash,
        V: DeserializeOwned,
    {
        if count == 0 {
            return Ok(HashMap::new());
        }
        decode_map(self.transport.hrand_entries(key, signed_count(count)?)?)
    }

    /// Delete fields, returning how many existed
    pub fn delete<I>(&self, key: &str, fields: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let fields = encode_all(fields)?;
        if fields.is_empty() {
            return Ok(0);
        }
        self.transport.hdel(key, &fields)
    }
}
