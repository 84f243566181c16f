//! Typed facades over a Redis-style transport
//!
//! This crate is the public surface of typedkv:
//! - **Connection**: owns the transport, hands out facades, key-level commands
//! - **Facades**: typed views per collection kind (values, hashes, lists,
//!   sets, sorted sets)
//! - **Config**: `typedkv.toml` settings shared by every facade
//!
//! ## Architectural Invariant
//!
//! Every facade call **desugars to exactly one transport call**, with codec
//! work on either side. No client-side check-then-act, no retries.
//!
//! ## Quick Start
//!
//! ```ignore
//! use typedkv_api::Connection;
//!
//! let conn = Connection::from_store(store);
//! conn.hashes().put("user:1", "name", "ada")?;
//! let name: Option<String> = conn.hashes().get("user:1", "name")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod facade;

pub use config::{FacadeConfig, CONFIG_FILE_NAME, DEFAULT_SCAN_COUNT};
pub use connection::Connection;
pub use facade::{HashFacade, ListFacade, SetFacade, SortedSetFacade, ValueFacade};
