//! In-memory Redis-style store
//!
//! `MemoryStore` implements every transport command trait against a single
//! keyspace guarded by one `parking_lot::Mutex`. Holding one lock per
//! command makes every command atomic, including the multi-key ones
//! (`mset_nx`, `rpoplpush`, `smove`, the `*store` set algebra).
//!
//! # Design
//!
//! - FxHashMap: O(1) key lookups, fast non-crypto hash
//! - Lazy expiry: an expired entry is purged the first time a command
//!   touches it; nothing runs in the background
//! - Empty aggregates (list, hash, set, sorted set) are removed as soon as
//!   a command empties them, so `exists` reports false afterwards
//! - Blocking pops park on a `Condvar` that every push notifies
//! - Scans return paged cursors that re-read the keyspace per page
//!
//! # Closing
//!
//! After [`MemoryStore::close`] every command fails with
//! `TransportError::Unavailable` and blocked callers are woken.

mod hashes;
mod keys;
mod lists;
mod sets;
mod sorted_sets;
mod strings;

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};
use typedkv_core::{Result, TransportError};

use crate::entry::{Data, Entry};
use crate::sorted_set::SortedSet;

// ============================================================================
// Keyspace
// ============================================================================

/// All keys and their entries
#[derive(Debug, Default)]
pub(crate) struct Keyspace {
    entries: FxHashMap<String, Entry>,
}

/// Generates the typed accessors for one collection kind
///
/// - `$get`: the live collection, `None` when the key is absent
/// - `$create`: the live collection, inserting an empty one when absent
///
/// Both fail with `WrongType` when the key holds another kind.
macro_rules! typed_access {
    ($get:ident, $create:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $get(&mut self, key: &str) -> Result<Option<&mut $ty>> {
            match self.live_mut(key) {
                None => Ok(None),
                Some(Entry {
                    data: Data::$variant(inner),
                    ..
                }) => Ok(Some(inner)),
                Some(_) => Err(TransportError::wrong_type(key).into()),
            }
        }

        pub(crate) fn $create(&mut self, key: &str) -> Result<&mut $ty> {
            self.purge_if_expired(key);
            let entry = self
                .entries
                .entry(key.to_string())
                .or_insert_with(|| Entry::new(Data::$variant(Default::default())));
            match &mut entry.data {
                Data::$variant(inner) => Ok(inner),
                _ => Err(TransportError::wrong_type(key).into()),
            }
        }
    };
}

impl Keyspace {
    /// Remove `key` if its deadline has passed
    fn purge_if_expired(&mut self, key: &str) {
        let now = Instant::now();
        if self
            .entries
            .get(key)
            .map_or(false, |entry| entry.is_expired(now))
        {
            self.entries.remove(key);
            trace!(target: "typedkv::store", key, "purged expired key");
        }
    }

    /// The live entry at `key`
    pub(crate) fn live_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.purge_if_expired(key);
        self.entries.get_mut(key)
    }

    /// Whether `key` holds a live entry
    pub(crate) fn contains(&mut self, key: &str) -> bool {
        self.live_mut(key).is_some()
    }

    /// Remove and return the live entry at `key`
    pub(crate) fn take(&mut self, key: &str) -> Option<Entry> {
        self.purge_if_expired(key);
        self.entries.remove(key)
    }

    /// Insert an entry, replacing whatever was there
    pub(crate) fn put(&mut self, key: &str, entry: Entry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Remove `key` when it holds an empty aggregate
    pub(crate) fn drop_if_empty(&mut self, key: &str) {
        if self
            .entries
            .get(key)
            .map_or(false, |entry| entry.data.is_empty_aggregate())
        {
            self.entries.remove(key);
        }
    }

    /// Fail with `WrongType` when `key` holds a kind other than `expected`
    pub(crate) fn ensure_kind(
        &mut self,
        key: &str,
        expected: fn(&Data) -> bool,
    ) -> Result<()> {
        match self.live_mut(key) {
            Some(entry) if !expected(&entry.data) => Err(TransportError::wrong_type(key).into()),
            _ => Ok(()),
        }
    }

    /// Names of all live keys, unordered
    pub(crate) fn live_keys(&self) -> impl Iterator<Item = &String> + '_ {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(move |(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key)
    }

    /// Drop every key
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    typed_access!(string_mut, string_or_insert, Str, String);
    typed_access!(list_mut, list_or_insert, List, VecDeque<String>);
    typed_access!(hash_mut, hash_or_insert, Hash, HashMap<String, String>);
    typed_access!(set_mut, set_or_insert, Set, HashSet<String>);
    typed_access!(zset_mut, zset_or_insert, ZSet, SortedSet);
}

// ============================================================================
// Shared state
// ============================================================================

/// State shared between the store handle and its open cursors
#[derive(Debug, Default)]
pub(crate) struct Inner {
    keyspace: Mutex<Keyspace>,
    /// Notified whenever a list receives elements or the store closes
    pushed: Condvar,
    closed: AtomicBool,
    pub(crate) open_cursors: AtomicUsize,
    pub(crate) next_cursor_id: AtomicU64,
}

impl Inner {
    /// Lock the keyspace, failing once the store is closed
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Keyspace>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Unavailable("store is closed".to_string()).into());
        }
        Ok(self.keyspace.lock())
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory transport
///
/// Cheap to clone: clones share the same keyspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.keyspace.lock().live_keys().count()
    }

    /// Whether the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every key
    pub fn flush(&self) -> Result<()> {
        self.inner.lock()?.clear();
        debug!(target: "typedkv::store", "flushed keyspace");
        Ok(())
    }

    /// Number of cursors opened and not yet closed
    pub fn open_cursors(&self) -> usize {
        self.inner.open_cursors.load(Ordering::Acquire)
    }

    /// Refuse further commands and wake blocked callers
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            // Take the lock so no waiter misses the notification
            let _guard = self.inner.keyspace.lock();
            self.inner.pushed.notify_all();
            info!(target: "typedkv::store", "store closed");
        }
    }

    /// Whether [`MemoryStore::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Keyspace>> {
        self.inner.lock()
    }

    pub(crate) fn shared(&self) -> Arc<Inner> {
        Arc::clone(&self.inner)
    }

    /// Wake callers blocked on a list pop
    pub(crate) fn notify_pushed(&self) {
        self.inner.pushed.notify_all();
    }

    /// Run `attempt` under the lock until it yields a value or the wait ends
    ///
    /// `timeout` of `None` waits until a value arrives or the store closes.
    pub(crate) fn blocking<R>(
        &self,
        timeout: Option<Duration>,
        mut attempt: impl FnMut(&mut Keyspace) -> Result<Option<R>>,
    ) -> Result<Option<R>> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut keyspace = self.lock()?;
        loop {
            if let Some(value) = attempt(&mut *keyspace)? {
                return Ok(Some(value));
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        trace!(target: "typedkv::store", "blocking pop timed out");
                        return Ok(None);
                    }
                    self.inner.pushed.wait_until(&mut keyspace, deadline);
                }
                None => self.inner.pushed.wait(&mut keyspace),
            }
            if self.is_closed() {
                return Err(TransportError::Unavailable("store is closed".to_string()).into());
            }
        }
    }
}

// ============================================================================
// Index helpers
// ============================================================================

/// Resolve an inclusive `[start, stop]` range against a collection length
///
/// Negative indexes count from the end. Returns `None` for an empty range.
pub(crate) fn resolve_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

/// Resolve a single index; `None` when out of range
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let index = if index < 0 { index + len } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

/// Text form of a stored float, as the store would report it
pub(crate) fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// Base of an integer increment
///
/// Only a missing value counts as 0. Stored text, including the empty
/// string, must parse exactly.
pub(crate) fn parse_int_base(key: &str, stored: Option<&str>) -> Result<i64> {
    match stored {
        None => Ok(0),
        Some(text) => text
            .parse()
            .map_err(|_| TransportError::not_numeric(key).into()),
    }
}

/// Base of a float increment, with the same rule as [`parse_int_base`]
pub(crate) fn parse_float_base(key: &str, stored: Option<&str>) -> Result<f64> {
    match stored {
        None => Ok(0.0),
        Some(text) => match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(TransportError::not_numeric(key).into()),
        },
    }
}

/// Apply a float increment, rejecting results that are not finite
pub(crate) fn float_step(key: &str, base: f64, delta: f64) -> Result<f64> {
    let next = base + delta;
    if next.is_finite() {
        Ok(next)
    } else {
        Err(TransportError::not_numeric(key).into())
    }
}
