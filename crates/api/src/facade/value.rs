//! Scalar facade - typed reads and writes of single values
//!
//! ## Desugaring
//!
//! | Facade | Transport |
//! |--------|-----------|
//! | `get::<T>(key)` | `get(key)` then `decode::<T>` |
//! | `set(key, v)` | `set(key, encode(v))` |
//! | `set_with_expiry(key, v, ttl)` | `set_ex(key, encode(v), ttl)` |
//! | `set_if_absent(key, v)` | `set_nx(key, encode(v), None)` |
//! | `increment(key, n)` | `incr_by(key, n)` |
//! | `get_and_set(key, v)` | `get_set(key, encode(v))` |
//! | `batch_set_if_all_absent(entries)` | `mset_nx(entries)` |
//!
//! Every method is a single transport call, so conditional writes and
//! increments keep the store's atomicity.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use typedkv_core::codec::{decode_each, decode_opt, encode};
use typedkv_core::{Error, Result, StringCommands, Transport};

/// Typed access to scalar values
#[derive(Clone)]
pub struct ValueFacade {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ValueFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFacade").finish_non_exhaustive()
    }
}

impl ValueFacade {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Read and decode a value
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.get(key)?)
    }

    /// Overwrite a value, clearing any expiry
    pub fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        self.transport.set(key, &encode(value)?)
    }

    /// Overwrite a value with an expiry
    ///
    /// A zero `ttl` skips the write entirely.
    pub fn set_with_expiry<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl: Duration,
    ) -> Result<()> {
        if ttl.is_zero() {
            debug!(target: "typedkv::facade", key, "Skipping write with zero expiry");
            return Ok(());
        }
        self.transport.set_ex(key, &encode(value)?, ttl)
    }

    /// Write only if the key is absent
    ///
    /// Returns `true` if the value was written.
    pub fn set_if_absent<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<bool> {
        self.transport.set_nx(key, &encode(value)?, None)
    }

    /// Write with an expiry only if the key is absent
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError` if `ttl` is zero.
    pub fn set_if_absent_with_expiry<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl: Duration,
    ) -> Result<bool> {
        if ttl.is_zero() {
            return Err(Error::precondition(format!(
                "expiry for conditional set on '{}' must be positive",
                key
            )));
        }
        self.transport.set_nx(key, &encode(value)?, Some(ttl))
    }

    /// Append text to a value, returning the new length
    pub fn append(&self, key: &str, suffix: &str) -> Result<u64> {
        self.transport.append(key, suffix)
    }

    /// Integer increment; a missing key starts at 0
    pub fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.transport.incr_by(key, delta)
    }

    /// Float increment; a missing key starts at 0
    pub fn increment_float(&self, key: &str, delta: f64) -> Result<f64> {
        self.transport.incr_by_float(key, delta)
    }

    /// Integer decrement; a missing key starts at 0
    pub fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        let negated = delta.checked_neg().ok_or_else(|| {
            Error::precondition(format!("cannot decrement '{}' by {}", key, delta))
        })?;
        self.transport.incr_by(key, negated)
    }

    /// Swap in a new value, returning the previous one
    pub fn get_and_set<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<Option<T>> {
        decode_opt(self.transport.get_set(key, &encode(value)?)?)
    }

    /// Delete a value, returning it
    pub fn get_and_delete<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.get_del(key)?)
    }

    /// Write many values
    pub fn batch_set<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let encoded = encode_entries(entries)?;
        if encoded.is_empty() {
            return Ok(());
        }
        self.transport.mset(&encoded)
    }

    /// Write many values only if none of the keys exist
    ///
    /// All or nothing: returns `false` and writes nothing when any key
    /// exists. An empty batch trivially succeeds.
    pub fn batch_set_if_all_absent<I, K, V>(&self, entries: I) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let encoded = encode_entries(entries)?;
        if encoded.is_empty() {
            return Ok(true);
        }
        self.transport.mset_nx(&encoded)
    }

    /// Read many values, aligned with `keys`
    pub fn batch_get<T, I>(&self, keys: I) -> Result<Vec<Option<T>>>
    where
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        decode_each(self.transport.mget(&keys)?)
    }
}

fn encode_entries<I, K, V>(entries: I) -> Result<Vec<(String, String)>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Serialize,
{
    entries
        .into_iter()
        .map(|(k, v)| Ok((k.as_ref().to_string(), encode(&v)?)))
        .collect()
}
