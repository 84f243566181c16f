//! typedkv - typed collection facades over a Redis-style key-value store
//!
//! typedkv stores structured values in a text-only key-value store. Writes
//! encode values through one canonical codec; reads decode into whatever
//! type the caller names. Five collection kinds are covered: scalar values,
//! hashes, lists, sets and sorted sets.
//!
//! # Quick Start
//!
//! ```
//! use typedkv::{Connection, MemoryStore};
//!
//! # fn main() -> typedkv::Result<()> {
//! let conn = Connection::from_store(MemoryStore::new());
//!
//! conn.values().set("visits", &41)?;
//! assert_eq!(conn.values().increment("visits", 1)?, 42);
//!
//! conn.lists().right_push_all("queue", ["a", "b"])?;
//! let head: Option<String> = conn.lists().left_pop("queue")?;
//! assert_eq!(head.as_deref(), Some("a"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `typedkv-core`: codec, errors, shared types, transport traits
//! - `typedkv-api`: [`Connection`] and the facades
//! - `typedkv-storage`: [`MemoryStore`], an in-process transport
//!
//! Any type implementing every command trait is a [`Transport`] and can back
//! a `Connection`.

pub use typedkv_api::*;
pub use typedkv_core::codec;
pub use typedkv_core::{
    Error, HashCommands, KeyCommands, KeyType, LexBound, LexRange, ListCommands, MaxWait,
    Result, ScanCursor, ScanOptions, SetCommands, SortedSetCommands, StringCommands, Transport,
    TransportError, Ttl, TypedTuple,
};
pub use typedkv_storage::MemoryStore;
