//! Connection accessor
//!
//! A `Connection` owns the shared transport handle and hands out the five
//! facades. It is built once and is immutable afterwards; facades are bound
//! on first use and reused for the life of the connection.
//!
//! # Design
//!
//! - One `Arc<dyn Transport>` shared by every facade
//! - Facade handles are bound lazily through `OnceCell`
//! - Key-level commands (existence, deletion, expiry, scanning) live here
//!   rather than on any one facade
//!
//! A process-wide instance can be installed once with
//! [`Connection::install`] and fetched with [`Connection::global`]. Code
//! that prefers explicit wiring can pass a `Connection` around instead.
//!
//! # Example
//!
//! ```ignore
//! use typedkv_api::Connection;
//!
//! let conn = Connection::new(Arc::new(store));
//! conn.values().set("greeting", "hello")?;
//! let greeting: Option<String> = conn.values().get("greeting")?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tracing::{debug, info};
use typedkv_core::{Error, KeyCommands, KeyType, Result, Transport, Ttl};

use crate::config::FacadeConfig;
use crate::facade::cursor::CursorGuard;
use crate::facade::{HashFacade, ListFacade, SetFacade, SortedSetFacade, ValueFacade};

static GLOBAL: OnceCell<Connection> = OnceCell::new();

/// Entry point to the typed facades
pub struct Connection {
    transport: Arc<dyn Transport>,
    config: Arc<FacadeConfig>,
    values: OnceCell<ValueFacade>,
    hashes: OnceCell<HashFacade>,
    lists: OnceCell<ListFacade>,
    sets: OnceCell<SetFacade>,
    sorted_sets: OnceCell<SortedSetFacade>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Connection {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Connect with the default configuration
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::build(transport, FacadeConfig::default())
    }

    /// Connect with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn with_config(transport: Arc<dyn Transport>, config: FacadeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(transport, config))
    }

    /// Connect to a concrete transport value
    pub fn from_store<T: Transport + 'static>(store: T) -> Self {
        Self::new(Arc::new(store))
    }

    fn build(transport: Arc<dyn Transport>, config: FacadeConfig) -> Self {
        info!(
            target: "typedkv::connection",
            scan_count = config.scan_count,
            allow_unbounded_blocking = config.allow_unbounded_blocking,
            "Connection built"
        );
        Self {
            transport,
            config: Arc::new(config),
            values: OnceCell::new(),
            hashes: OnceCell::new(),
            lists: OnceCell::new(),
            sets: OnceCell::new(),
            sorted_sets: OnceCell::new(),
        }
    }

    /// Install `connection` as the process-wide instance
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError` if an instance is already installed.
    pub fn install(connection: Connection) -> Result<&'static Connection> {
        GLOBAL.set(connection).map_err(|_| {
            Error::precondition("a global connection is already installed")
        })?;
        info!(target: "typedkv::connection", "Global connection installed");
        GLOBAL
            .get()
            .ok_or_else(|| Error::precondition("global connection vanished after install"))
    }

    /// The process-wide instance
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError` if nothing has been installed.
    pub fn global() -> Result<&'static Connection> {
        GLOBAL.get().ok_or_else(|| {
            Error::precondition("no global connection installed; call Connection::install first")
        })
    }

    /// Configuration this connection was built with
    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// The shared transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    // ========================================================================
    // Facades
    // ========================================================================

    /// Scalar values
    pub fn values(&self) -> &ValueFacade {
        self.values
            .get_or_init(|| ValueFacade::new(Arc::clone(&self.transport)))
    }

    /// Hashes
    pub fn hashes(&self) -> &HashFacade {
        self.hashes.get_or_init(|| {
            HashFacade::new(Arc::clone(&self.transport), Arc::clone(&self.config))
        })
    }

    /// Lists
    pub fn lists(&self) -> &ListFacade {
        self.lists.get_or_init(|| {
            ListFacade::new(Arc::clone(&self.transport), Arc::clone(&self.config))
        })
    }

    /// Sets
    pub fn sets(&self) -> &SetFacade {
        self.sets
            .get_or_init(|| SetFacade::new(Arc::clone(&self.transport), Arc::clone(&self.config)))
    }

    /// Sorted sets
    pub fn sorted_sets(&self) -> &SortedSetFacade {
        self.sorted_sets
            .get_or_init(|| SortedSetFacade::new(Arc::clone(&self.transport)))
    }

    // ========================================================================
    // Key operations
    // ========================================================================

    /// Whether the key exists
    pub fn exists(&self, key: &str) -> Result<bool> {
        self.transport.exists(key)
    }

    /// Delete a key, returning whether it existed
    pub fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.transport.del(&[key.to_string()])? == 1)
    }

    /// Delete keys, returning how many existed
    pub fn delete_all<I>(&self, keys: I) -> Result<u64>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        if keys.is_empty() {
            return Ok(0);
        }
        self.transport.del(&keys)
    }

    /// Rename a key, overwriting `new_key`
    ///
    /// # Errors
    ///
    /// Returns a transport error if `key` does not exist.
    pub fn rename(&self, key: &str, new_key: &str) -> Result<()> {
        self.transport.rename(key, new_key)
    }

    /// Expire a key after `ttl`; a zero `ttl` expires it immediately
    ///
    /// Returns `false` if the key does not exist.
    pub fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.transport.expire(key, ttl)
    }

    /// Expire a key at an absolute time
    ///
    /// A time in the past is refused without touching the key and returns
    /// `false`.
    pub fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool> {
        if at <= Utc::now() {
            debug!(target: "typedkv::connection", key, %at, "Ignoring expiry in the past");
            return Ok(false);
        }
        self.transport.expire_at(key, at)
    }

    /// Remove a key's expiry, returning whether one was removed
    pub fn persist(&self, key: &str) -> Result<bool> {
        self.transport.persist(key)
    }

    /// Remaining time to live
    pub fn ttl(&self, key: &str) -> Result<Ttl> {
        self.transport.ttl(key)
    }

    /// Kind of value stored at a key
    pub fn key_type(&self, key: &str) -> Result<KeyType> {
        self.transport.key_type(key)
    }

    /// Keys matching `pattern`
    ///
    /// Walks the keyspace with a cursor, which is always released before
    /// returning.
    pub fn keys(&self, pattern: &str) -> Result<HashSet<String>> {
        let cursor = self.transport.scan(&self.config.scan_options(pattern))?;
        CursorGuard::new(cursor).drain_map(Ok)
    }
}
