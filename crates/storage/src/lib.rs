//! In-memory transport for typedkv
//!
//! This crate implements every transport command trait on one type:
//! - MemoryStore: a single-lock, Redis-style keyspace with lazy expiry
//! - Paged scan cursors, tracked so leaked cursors are observable
//! - Blocking list pops with bounded and unbounded waits
//!
//! It is the store the facades are tested against, and a drop-in transport
//! for embedding typedkv without a server.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod cursor;
mod entry;
pub mod glob;
pub mod sorted_set;
mod store;

pub use store::MemoryStore;
