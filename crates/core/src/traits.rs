//! Transport command traits
//!
//! These traits describe what a Redis-style store must provide for the
//! facades to work. They are text-in/text-out: encoding and decoding is the
//! facade's job, never the transport's.
//!
//! Method names follow the store's command names (`hget`, `lpush`, `zadd`)
//! so that every trait can be implemented on one type without collisions.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync).
//!
//! ## Atomicity
//!
//! Every method is one store round trip. Conditional writes (`set_nx`,
//! `mset_nx`, `hset_nx`), increments, `rpoplpush`, `smove` and the
//! `*store` set-algebra commands must be atomic on the store side.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{KeyType, LexRange, ScanOptions, Ttl};

/// Server-side scan cursor
///
/// Yields items lazily. The holder must call [`ScanCursor::close`] once it
/// is done, whether or not the cursor was exhausted; `close` is idempotent.
pub trait ScanCursor<T>: Iterator<Item = Result<T>> + Send {
    /// Store-assigned cursor id
    fn id(&self) -> u64;

    /// Release the server-side cursor
    fn close(&mut self) -> Result<()>;

    /// Whether `close` has been called
    fn is_closed(&self) -> bool;
}

/// Key-level commands
pub trait KeyCommands: Send + Sync {
    /// Whether the key exists
    fn exists(&self, key: &str) -> Result<bool>;

    /// Delete keys, returning how many existed
    fn del(&self, keys: &[String]) -> Result<u64>;

    /// Rename a key, overwriting `new_key`
    ///
    /// Fails with `TransportError::NoSuchKey` when `key` is absent.
    fn rename(&self, key: &str, new_key: &str) -> Result<()>;

    /// Set a relative expiry; returns false when the key is absent
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Set an absolute expiry; returns false when the key is absent
    fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool>;

    /// Remove an expiry; returns false when there was none
    fn persist(&self, key: &str) -> Result<bool>;

    /// Remaining time-to-live
    fn ttl(&self, key: &str) -> Result<Ttl>;

    /// Collection type stored at the key
    fn key_type(&self, key: &str) -> Result<KeyType>;

    /// Open a cursor over key names
    fn scan(&self, options: &ScanOptions) -> Result<Box<dyn ScanCursor<String>>>;
}

/// Scalar (string) commands
pub trait StringCommands: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a value, clearing any expiry
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Overwrite a value with an expiry
    fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Create-only write with an optional expiry; false when the key exists
    fn set_nx(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<bool>;

    /// Append to a value, returning the new length
    fn append(&self, key: &str, value: &str) -> Result<u64>;

    /// Integer increment; a missing key counts as 0
    ///
    /// Stored text that does not parse exactly, including the empty string,
    /// fails with `NotNumeric` and leaves the key untouched.
    fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Float increment; a missing key counts as 0
    ///
    /// A result that is not finite fails with `NotNumeric` and writes nothing.
    fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64>;

    /// Swap in a new value, returning the old one
    fn get_set(&self, key: &str, value: &str) -> Result<Option<String>>;

    /// Delete a value, returning it
    fn get_del(&self, key: &str) -> Result<Option<String>>;

    /// Write many values
    fn mset(&self, entries: &[(String, String)]) -> Result<()>;

    /// Write many values only if none of the keys exist
    fn mset_nx(&self, entries: &[(String, String)]) -> Result<bool>;

    /// Read many values, aligned with `keys`
    fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>>;
}

/// Hash commands
pub trait HashCommands: Send + Sync {
    /// Number of fields
    fn hlen(&self, key: &str) -> Result<u64>;

    /// Whether a field exists
    fn hexists(&self, key: &str, field: &str) -> Result<bool>;

    /// Open a cursor over field/value pairs
    fn hscan(
        &self,
        key: &str,
        options: &ScanOptions,
    ) -> Result<Box<dyn ScanCursor<(String, String)>>>;

    /// All field names
    fn hkeys(&self, key: &str) -> Result<Vec<String>>;

    /// Read a field
    fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Read many fields, aligned with `fields`
    fn hmget(&self, key: &str, fields: &[String]) -> Result<Vec<Option<String>>>;

    /// All field/value pairs
    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// All values
    fn hvals(&self, key: &str) -> Result<Vec<String>>;

    /// Write a field; true when the field is new
    fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// Write many fields
    fn hset_all(&self, key: &str, entries: &[(String, String)]) -> Result<()>;

    /// Write a field only if absent
    fn hset_nx(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// Integer increment of a field; same parse rule as `incr_by`
    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64>;

    /// Float increment of a field; same parse rule as `incr_by_float`
    fn hincr_by_float(&self, key: &str, field: &str, delta: f64) -> Result<f64>;

    /// Random field names
    ///
    /// Positive `count` returns distinct fields capped at the hash size;
    /// negative `count` returns exactly `|count|` fields and may repeat.
    fn hrand_fields(&self, key: &str, count: i64) -> Result<Vec<String>>;

    /// Random field/value pairs, with the same `count` semantics
    fn hrand_entries(&self, key: &str, count: i64) -> Result<Vec<(String, String)>>;

    /// Delete fields, returning how many existed
    fn hdel(&self, key: &str, fields: &[String]) -> Result<u64>;
}

/// List commands
pub trait ListCommands: Send + Sync {
    /// Length of the list
    fn llen(&self, key: &str) -> Result<u64>;

    /// Element at an index (negative counts from the tail)
    fn lindex(&self, key: &str, index: i64) -> Result<Option<String>>;

    /// Position of a matching element
    ///
    /// `rank` 1 finds the first match from the head, -1 the first match
    /// from the tail. The returned index is always counted from the head.
    fn lpos(&self, key: &str, value: &str, rank: i64) -> Result<Option<u64>>;

    /// Elements between two inclusive indexes
    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Keep only the elements between two inclusive indexes
    fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<()>;

    /// Remove matching elements
    ///
    /// `count` > 0 removes head to tail, < 0 tail to head, 0 removes all.
    fn lrem(&self, key: &str, count: i64, value: &str) -> Result<u64>;

    /// Overwrite an element
    ///
    /// Fails with `TransportError::NoSuchKey` when the list is absent and
    /// with `Error::PreconditionError` when `index` is out of range.
    fn lset(&self, key: &str, index: i64, value: &str) -> Result<()>;

    /// Push to the head, returning the new length
    fn lpush(&self, key: &str, values: &[String]) -> Result<u64>;

    /// Push to the tail, returning the new length
    fn rpush(&self, key: &str, values: &[String]) -> Result<u64>;

    /// Push to the head only if the list exists
    fn lpushx(&self, key: &str, values: &[String]) -> Result<u64>;

    /// Push to the tail only if the list exists
    fn rpushx(&self, key: &str, values: &[String]) -> Result<u64>;

    /// Pop from the head
    fn lpop(&self, key: &str) -> Result<Option<String>>;

    /// Pop from the tail
    fn rpop(&self, key: &str) -> Result<Option<String>>;

    /// Pop up to `count` elements from the head
    fn lpop_count(&self, key: &str, count: usize) -> Result<Vec<String>>;

    /// Pop up to `count` elements from the tail
    fn rpop_count(&self, key: &str, count: usize) -> Result<Vec<String>>;

    /// Blocking pop from the head; `None` timeout waits forever
    fn blpop(&self, key: &str, timeout: Option<Duration>) -> Result<Option<String>>;

    /// Blocking pop from the tail; `None` timeout waits forever
    fn brpop(&self, key: &str, timeout: Option<Duration>) -> Result<Option<String>>;

    /// Move the tail of `source` to the head of `destination`
    fn rpoplpush(&self, source: &str, destination: &str) -> Result<Option<String>>;

    /// Blocking `rpoplpush`; `None` timeout waits forever
    fn brpoplpush(
        &self,
        source: &str,
        destination: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<String>>;
}

/// Set commands
pub trait SetCommands: Send + Sync {
    /// Cardinality
    fn scard(&self, key: &str) -> Result<u64>;

    /// Membership test
    fn sismember(&self, key: &str, member: &str) -> Result<bool>;

    /// Open a cursor over members
    fn sscan(&self, key: &str, options: &ScanOptions) -> Result<Box<dyn ScanCursor<String>>>;

    /// Add members, returning how many were new
    fn sadd(&self, key: &str, members: &[String]) -> Result<u64>;

    /// Remove members, returning how many existed
    fn srem(&self, key: &str, members: &[String]) -> Result<u64>;

    /// First set minus all others
    fn sdiff(&self, keys: &[String]) -> Result<HashSet<String>>;

    /// Intersection of all sets
    fn sinter(&self, keys: &[String]) -> Result<HashSet<String>>;

    /// Union of all sets
    fn sunion(&self, keys: &[String]) -> Result<HashSet<String>>;

    /// Store `sdiff` at `destination`, returning its cardinality
    fn sdiff_store(&self, destination: &str, keys: &[String]) -> Result<u64>;

    /// Store `sinter` at `destination`, returning its cardinality
    fn sinter_store(&self, destination: &str, keys: &[String]) -> Result<u64>;

    /// Store `sunion` at `destination`, returning its cardinality
    fn sunion_store(&self, destination: &str, keys: &[String]) -> Result<u64>;

    /// Remove and return a random member
    fn spop(&self, key: &str) -> Result<Option<String>>;

    /// Remove and return up to `count` random members
    fn spop_count(&self, key: &str, count: usize) -> Result<Vec<String>>;

    /// A random member
    fn srandmember(&self, key: &str) -> Result<Option<String>>;

    /// Random members
    ///
    /// Positive `count` returns distinct members capped at the set size;
    /// negative `count` returns exactly `|count|` members and may repeat.
    fn srandmembers(&self, key: &str, count: i64) -> Result<Vec<String>>;

    /// All members
    fn smembers(&self, key: &str) -> Result<HashSet<String>>;

    /// Move a member between sets; false when absent from `source`
    fn smove(&self, source: &str, destination: &str, member: &str) -> Result<bool>;
}

/// Sorted-set commands
pub trait SortedSetCommands: Send + Sync {
    /// Cardinality
    fn zcard(&self, key: &str) -> Result<u64>;

    /// Remove members, returning how many existed
    fn zrem(&self, key: &str, members: &[String]) -> Result<u64>;

    /// Members with `min <= score <= max`
    fn zcount(&self, key: &str, min: f64, max: f64) -> Result<u64>;

    /// Members inside a lexical range
    fn zlexcount(&self, key: &str, range: &LexRange) -> Result<u64>;

    /// Members between two inclusive ranks, lowest score first
    fn zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Like `zrange`, with scores
    fn zrange_with_scores(&self, key: &str, start: i64, stop: i64)
        -> Result<Vec<(String, f64)>>;

    /// 0-based rank, lowest score first
    fn zrank(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// 0-based rank, highest score first
    fn zrevrank(&self, key: &str, member: &str) -> Result<Option<u64>>;

    /// Score of a member
    fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>>;

    /// Add or update members, returning how many were new
    fn zadd(&self, key: &str, members: &[(String, f64)]) -> Result<u64>;

    /// Add members that are absent, returning how many were added
    fn zadd_nx(&self, key: &str, members: &[(String, f64)]) -> Result<u64>;

    /// Increment a member's score, returning the new score
    fn zincr_by(&self, key: &str, member: &str, delta: f64) -> Result<f64>;
}

/// Every command set, as one object-safe handle
///
/// Implemented automatically for any type that implements all command
/// traits.
pub trait Transport:
    KeyCommands + StringCommands + HashCommands + ListCommands + SetCommands + SortedSetCommands
{
}

impl<T> Transport for T where
    T: KeyCommands
        + StringCommands
        + HashCommands
        + ListCommands
        + SetCommands
        + SortedSetCommands
{
}
