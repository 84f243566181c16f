//! Core types and traits for typedkv
//!
//! This crate defines the foundations shared by the facades and the
//! transports:
//! - Codec: canonical text encoding and type-driven decoding
//! - Error: error taxonomy (`Error`, `TransportError`)
//! - Types: `KeyType`, `Ttl`, `TypedTuple`, `LexRange`, `ScanOptions`, `MaxWait`
//! - Traits: transport command sets and the scan cursor contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result, TransportError};
pub use traits::{
    HashCommands, KeyCommands, ListCommands, ScanCursor, SetCommands, SortedSetCommands,
    StringCommands, Transport,
};
pub use types::{KeyType, LexBound, LexRange, MaxWait, ScanOptions, Ttl, TypedTuple};
