//! Shared value types
//!
//! Small types that travel between facades and transports:
//! - `KeyType`: collection type stored at a key
//! - `Ttl`: remaining time-to-live of a key
//! - `TypedTuple`: (value, score) pair for sorted sets
//! - `LexRange` / `LexBound`: lexical ranges over sorted-set members
//! - `ScanOptions`: pattern and page hint for cursor scans
//! - `MaxWait`: upper bound for blocking list pops

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

// =============================================================================
// KeyType
// =============================================================================

/// Collection type held by a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Key does not exist
    None,
    /// Scalar text value
    String,
    /// Double-ended list
    List,
    /// Unordered set
    Set,
    /// Score-ordered set
    ZSet,
    /// Field-keyed map
    Hash,
}

impl KeyType {
    /// Store-native name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::None => "none",
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::Hash => "hash",
        }
    }

    /// Parse a store-native type name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "none" => Some(KeyType::None),
            "string" => Some(KeyType::String),
            "list" => Some(KeyType::List),
            "set" => Some(KeyType::Set),
            "zset" => Some(KeyType::ZSet),
            "hash" => Some(KeyType::Hash),
            _ => None,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Ttl
// =============================================================================

/// Remaining time-to-live of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Key does not exist
    Missing,
    /// Key exists without an expiry
    Persistent,
    /// Key expires after the given duration
    Expires(Duration),
}

impl Ttl {
    /// Remaining duration, if the key has an expiry
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Ttl::Expires(d) => Some(*d),
            _ => None,
        }
    }

    /// Whether the key exists
    pub fn exists(&self) -> bool {
        !matches!(self, Ttl::Missing)
    }
}

// =============================================================================
// TypedTuple
// =============================================================================

/// A sorted-set member paired with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedTuple<T> {
    /// Member value
    pub value: T,
    /// Ordering score
    pub score: f64,
}

impl<T> TypedTuple<T> {
    /// Create a new tuple
    pub fn new(value: T, score: f64) -> Self {
        Self { value, score }
    }

    /// Map the value, keeping the score
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TypedTuple<U> {
        TypedTuple {
            value: f(self.value),
            score: self.score,
        }
    }
}

impl<T> From<(T, f64)> for TypedTuple<T> {
    fn from((value, score): (T, f64)) -> Self {
        Self { value, score }
    }
}

// =============================================================================
// Lexical ranges
// =============================================================================

/// One end of a lexical range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexBound {
    /// No bound (`-` or `+`)
    Unbounded,
    /// Inclusive bound (`[value`)
    Inclusive(String),
    /// Exclusive bound (`(value`)
    Exclusive(String),
}

impl LexBound {
    /// Parse a bound from `[a`, `(b`, `-` or `+`
    pub fn parse(s: &str) -> Option<Self> {
        if s == "-" || s == "+" {
            Some(LexBound::Unbounded)
        } else if let Some(rest) = s.strip_prefix('[') {
            Some(LexBound::Inclusive(rest.to_string()))
        } else {
            s.strip_prefix('(')
                .map(|rest| LexBound::Exclusive(rest.to_string()))
        }
    }

    fn admits(&self, member: &str, is_min: bool) -> bool {
        match self {
            LexBound::Unbounded => true,
            LexBound::Inclusive(bound) => {
                if is_min {
                    member >= bound.as_str()
                } else {
                    member <= bound.as_str()
                }
            }
            LexBound::Exclusive(bound) => {
                if is_min {
                    member > bound.as_str()
                } else {
                    member < bound.as_str()
                }
            }
        }
    }
}

/// Lexical range over encoded sorted-set members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexRange {
    /// Lower bound
    pub min: LexBound,
    /// Upper bound
    pub max: LexBound,
}

impl LexRange {
    /// Range covering every member
    pub fn all() -> Self {
        Self {
            min: LexBound::Unbounded,
            max: LexBound::Unbounded,
        }
    }

    /// Inclusive range `[min, max]`
    pub fn closed(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: LexBound::Inclusive(min.into()),
            max: LexBound::Inclusive(max.into()),
        }
    }

    /// Parse both ends in store syntax, e.g. `("[a", "(c")`
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        let parse = |s: &str| {
            LexBound::parse(s)
                .ok_or_else(|| Error::precondition(format!("invalid lexical bound '{}'", s)))
        };
        Ok(Self {
            min: parse(min)?,
            max: parse(max)?,
        })
    }

    /// Whether `member` falls inside the range
    pub fn contains(&self, member: &str) -> bool {
        self.min.admits(member, true) && self.max.admits(member, false)
    }
}

// =============================================================================
// ScanOptions
// =============================================================================

/// Options for cursor scans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Match expression; `None` matches everything
    pub pattern: Option<String>,
    /// Page size hint
    pub count: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            pattern: None,
            count: 10,
        }
    }
}

impl ScanOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set match expression
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set page size hint (at least 1)
    pub fn count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }
}

// =============================================================================
// MaxWait
// =============================================================================

/// Upper bound for blocking pops
///
/// `Bounded(Duration::ZERO)` returns immediately; it does not mean "forever".
/// Waiting forever must be requested explicitly with `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxWait {
    /// Give up after the duration elapses
    Bounded(Duration),
    /// Block until a value arrives
    Unbounded,
}

impl MaxWait {
    /// The bound, or `None` for an unbounded wait
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            MaxWait::Bounded(d) => Some(*d),
            MaxWait::Unbounded => None,
        }
    }
}

impl From<Duration> for MaxWait {
    fn from(d: Duration) -> Self {
        MaxWait::Bounded(d)
    }
}
