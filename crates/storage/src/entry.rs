//! Stored entries
//!
//! An `Entry` is what the keyspace holds per key: the collection payload
//! plus an optional expiry deadline. Expiry is a storage concern only; it
//! is never handed to callers except through `ttl`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use typedkv_core::KeyType;

use crate::sorted_set::SortedSet;

/// Collection payload of a key
#[derive(Debug, Clone)]
pub(crate) enum Data {
    /// Scalar text
    Str(String),
    /// Double-ended list
    List(VecDeque<String>),
    /// Field/value map
    Hash(HashMap<String, String>),
    /// Unordered unique members
    Set(HashSet<String>),
    /// Score-ordered unique members
    ZSet(SortedSet),
}

impl Data {
    pub(crate) fn key_type(&self) -> KeyType {
        match self {
            Data::Str(_) => KeyType::String,
            Data::List(_) => KeyType::List,
            Data::Hash(_) => KeyType::Hash,
            Data::Set(_) => KeyType::Set,
            Data::ZSet(_) => KeyType::ZSet,
        }
    }

    /// Aggregates are removed from the keyspace once they become empty
    pub(crate) fn is_empty_aggregate(&self) -> bool {
        match self {
            Data::Str(_) => false,
            Data::List(l) => l.is_empty(),
            Data::Hash(h) => h.is_empty(),
            Data::Set(s) => s.is_empty(),
            Data::ZSet(z) => z.is_empty(),
        }
    }
}

/// A key's payload and expiry
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) data: Data,
    pub(crate) expires_at: Option<Instant>,
}

impl Entry {
    pub(crate) fn new(data: Data) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    pub(crate) fn with_expiry(data: Data, expires_at: Instant) -> Self {
        Self {
            data,
            expires_at: Some(expires_at),
        }
    }

    #[inline]
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |deadline| now >= deadline)
    }
}
