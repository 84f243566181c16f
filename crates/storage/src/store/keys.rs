//! Key-level commands

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::debug;
use typedkv_core::{KeyCommands, KeyType, Result, ScanCursor, ScanOptions, TransportError, Ttl};

use super::MemoryStore;
use crate::cursor::{select_page, MemoryCursor, PageFn};
use crate::glob::glob_match;

impl KeyCommands for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.contains(key))
    }

    fn del(&self, keys: &[String]) -> Result<u64> {
        let mut keyspace = self.lock()?;
        let removed = keys
            .iter()
            .filter(|key| keyspace.take(key).is_some())
            .count();
        Ok(removed as u64)
    }

    fn rename(&self, key: &str, new_key: &str) -> Result<()> {
        let mut keyspace = self.lock()?;
        let entry = keyspace
            .take(key)
            .ok_or_else(|| TransportError::no_such_key(key))?;
        let is_list = matches!(entry.data, crate::entry::Data::List(_));
        keyspace.put(new_key, entry);
        drop(keyspace);
        if is_list {
            self.notify_pushed();
        }
        Ok(())
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut keyspace = self.lock()?;
        if ttl.is_zero() {
            return Ok(keyspace.take(key).is_some());
        }
        match keyspace.live_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool> {
        // A deadline that has already passed deletes the key
        match (at - Utc::now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => self.expire(key, remaining),
            _ => {
                let existed = self.lock()?.take(key).is_some();
                if existed {
                    debug!(target: "typedkv::store", key, "expire_at in the past removed key");
                }
                Ok(existed)
            }
        }
    }

    fn persist(&self, key: &str) -> Result<bool> {
        let mut keyspace = self.lock()?;
        match keyspace.live_mut(key) {
            Some(entry) => Ok(entry.expires_at.take().is_some()),
            None => Ok(false),
        }
    }

    fn ttl(&self, key: &str) -> Result<Ttl> {
        let mut keyspace = self.lock()?;
        let ttl = match keyspace.live_mut(key) {
            None => Ttl::Missing,
            Some(entry) => match entry.expires_at {
                None => Ttl::Persistent,
                Some(deadline) => {
                    Ttl::Expires(deadline.saturating_duration_since(Instant::now()))
                }
            },
        };
        Ok(ttl)
    }

    fn key_type(&self, key: &str) -> Result<KeyType> {
        let mut keyspace = self.lock()?;
        Ok(keyspace
            .live_mut(key)
            .map_or(KeyType::None, |entry| entry.data.key_type()))
    }

    fn scan(&self, options: &ScanOptions) -> Result<Box<dyn ScanCursor<String>>> {
        // Surface a closed store at open time rather than on first page
        drop(self.lock()?);
        let pattern = options.pattern.clone();
        let fetch: PageFn<String> = Box::new(move |keyspace, resume_after, page_size| {
            let candidates = keyspace
                .live_keys()
                .filter(|key| pattern.as_deref().map_or(true, |p| glob_match(p, key)))
                .map(|key| (key.clone(), key.clone()));
            Ok(select_page(candidates, resume_after, page_size))
        });
        Ok(Box::new(MemoryCursor::open(
            self.shared(),
            options.count,
            fetch,
        )))
    }
}
