//! List facade - typed double-ended sequences
//!
//! ## Desugaring
//!
//! | Facade | Transport |
//! |--------|-----------|
//! | `index_of(key, v)` | `lpos(key, encode(v), rank 1)` |
//! | `last_index_of(key, v)` | `lpos(key, encode(v), rank -1)` |
//! | `range_all(key)` | `lrange(key, 0, -1)` |
//! | `remove_first(key, v)` | `lrem(key, 1, encode(v))` |
//! | `left_push_all(key, vs)` | `lpush(key, encode_all(vs))` |
//! | `left_pop_blocking(key, wait)` | `blpop(key, wait)` |
//! | `pop_and_requeue(src, dst)` | `rpoplpush(src, dst)` |
//!
//! ## Blocking pops
//!
//! Blocking pops are the only calls that suspend the calling thread. A
//! `MaxWait::Bounded` wait that elapses returns `None`. `MaxWait::Unbounded`
//! is refused unless `FacadeConfig::allow_unbounded_blocking` is set.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use typedkv_core::codec::{decode_all, decode_opt, encode, encode_all};
use typedkv_core::{Error, ListCommands, MaxWait, Result, Transport};

use crate::config::FacadeConfig;

/// Typed access to lists
#[derive(Clone)]
pub struct ListFacade {
    transport: Arc<dyn Transport>,
    config: Arc<FacadeConfig>,
}

impl fmt::Debug for ListFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListFacade")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ListFacade {
    pub(crate) fn new(transport: Arc<dyn Transport>, config: Arc<FacadeConfig>) -> Self {
        Self { transport, config }
    }

    /// Resolve a wait bound into the transport timeout
    fn timeout(&self, key: &str, wait: MaxWait) -> Result<Option<std::time::Duration>> {
        if wait == MaxWait::Unbounded && !self.config.allow_unbounded_blocking {
            return Err(Error::precondition(format!(
                "unbounded blocking pop on '{}' is disabled; set allow_unbounded_blocking",
                key
            )));
        }
        Ok(wait.as_duration())
    }

    fn log_timeout<T>(key: &str, popped: &Option<T>) {
        if popped.is_none() {
            debug!(target: "typedkv::facade", key, "Blocking pop elapsed without a value");
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Length of the list
    pub fn size(&self, key: &str) -> Result<u64> {
        self.transport.llen(key)
    }

    /// Element at an index; negative indexes count from the tail
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, index: i64) -> Result<Option<T>> {
        decode_opt(self.transport.lindex(key, index)?)
    }

    /// Index of the first element equal to `value`
    pub fn index_of<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<Option<u64>> {
        self.transport.lpos(key, &encode(value)?, 1)
    }

    /// Index of the last element equal to `value`
    pub fn last_index_of<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
    ) -> Result<Option<u64>> {
        self.transport.lpos(key, &encode(value)?, -1)
    }

    /// Elements between two inclusive indexes
    pub fn range<T: DeserializeOwned>(&self, key: &str, start: i64, end: i64) -> Result<Vec<T>> {
        decode_all(self.transport.lrange(key, start, end)?)
    }

    /// Every element
    pub fn range_all<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        self.range(key, 0, -1)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Keep only the elements between two inclusive indexes
    ///
    /// A range that selects nothing (such as `end < start`) clears the list.
    pub fn trim(&self, key: &str, start: i64, end: i64) -> Result<()> {
        self.transport.ltrim(key, start, end)
    }

    /// Remove elements equal to `value`
    ///
    /// `count` > 0 removes from head to tail, `count` < 0 from tail to head,
    /// and 0 removes every match. Returns how many were removed.
    pub fn remove<V: Serialize + ?Sized>(&self, key: &str, value: &V, count: i64) -> Result<u64> {
        self.transport.lrem(key, count, &encode(value)?)
    }

    /// Remove the first element equal to `value`
    pub fn remove_first<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<u64> {
        self.remove(key, value, 1)
    }

    /// Overwrite the element at `index`
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError` if `index` is out of range.
    pub fn set_at<V: Serialize + ?Sized>(&self, key: &str, index: i64, value: &V) -> Result<()> {
        self.transport.lset(key, index, &encode(value)?)
    }

    // ========================================================================
    // Pushes
    // ========================================================================

    /// Push one value to the head, returning the new length
    pub fn left_push<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<u64> {
        self.transport.lpush(key, &[encode(value)?])
    }

    /// Push one value to the tail, returning the new length
    pub fn right_push<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<u64> {
        self.transport.rpush(key, &[encode(value)?])
    }

    /// Push values to the head in order, so the last one ends up first
    ///
    /// Returns the new length; an empty input leaves the list untouched and
    /// returns its current length.
    pub fn left_push_all<I>(&self, key: &str, values: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let values = encode_all(values)?;
        if values.is_empty() {
            return self.size(key);
        }
        self.transport.lpush(key, &values)
    }

    /// Push values to the tail in order
    ///
    /// Returns the new length; an empty input leaves the list untouched and
    /// returns its current length.
    pub fn right_push_all<I>(&self, key: &str, values: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let values = encode_all(values)?;
        if values.is_empty() {
            return self.size(key);
        }
        self.transport.rpush(key, &values)
    }

    /// Push to the head only if the list exists; returns 0 otherwise
    pub fn left_push_if_exists<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<u64> {
        self.transport.lpushx(key, &[encode(value)?])
    }

    /// Push to the tail only if the list exists; returns 0 otherwise
    pub fn right_push_if_exists<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
    ) -> Result<u64> {
        self.transport.rpushx(key, &[encode(value)?])
    }

    // ========================================================================
    // Pops
    // ========================================================================

    /// Pop from the head
    pub fn left_pop<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.lpop(key)?)
    }

    /// Pop from the tail
    pub fn right_pop<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        decode_opt(self.transport.rpop(key)?)
    }

    /// Pop from the head, waiting up to `wait` for a value
    pub fn left_pop_blocking<T: DeserializeOwned>(
        &self,
        key: &str,
        wait: impl Into<MaxWait>,
    ) -> Result<Option<T>> {
        let timeout = self.timeout(key, wait.into())?;
        let popped = self.transport.blpop(key, timeout)?;
        Self::log_timeout(key, &popped);
        decode_opt(popped)
    }

    /// Pop from the tail, waiting up to `wait` for a value
    pub fn right_pop_blocking<T: DeserializeOwned>(
        &self,
        key: &str,
        wait: impl Into<MaxWait>,
    ) -> Result<Option<T>> {
        let timeout = self.timeout(key, wait.into())?;
        let popped = self.transport.brpop(key, timeout)?;
        Self::log_timeout(key, &popped);
        decode_opt(popped)
    }

    /// Pop up to `count` values from the head
    pub fn left_pop_count<T: DeserializeOwned>(&self, key: &str, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        decode_all(self.transport.lpop_count(key, count)?)
    }

    /// Pop up to `count` values from the tail
    pub fn right_pop_count<T: DeserializeOwned>(&self, key: &str, count: usize) -> Result<Vec<T>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        decode_all(self.transport.rpop_count(key, count)?)
    }

    /// Atomically move the tail of `source` to the head of `destination`
    ///
    /// With `source == destination` this rotates the list by one.
    pub fn pop_and_requeue<T: DeserializeOwned>(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Option<T>> {
        decode_opt(self.transport.rpoplpush(source, destination)?)
    }

    /// Blocking [`ListFacade::pop_and_requeue`]
    pub fn pop_and_requeue_blocking<T: DeserializeOwned>(
        &self,
        source: &str,
        destination: &str,
        wait: impl Into<MaxWait>,
    ) -> Result<Option<T>> {
        let timeout = self.timeout(source, wait.into())?;
        let moved = self.transport.brpoplpush(source, destination, timeout)?;
        Self::log_timeout(source, &moved);
        decode_opt(moved)
    }
}
