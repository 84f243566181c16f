//! Paged scan cursors
//!
//! A `MemoryCursor` plays the part of a server-side scan cursor: it is
//! registered with the store when opened, fetches items one page at a
//! time, and stays registered until `close` is called. Dropping a cursor
//! without closing it leaves it counted in `MemoryStore::open_cursors`,
//! the same way an abandoned server cursor would linger.
//!
//! Each page is read under the keyspace lock, ordered by a sort key, and
//! resumes strictly after the last sort key of the previous page. Items
//! added or removed between pages may or may not be seen; an item present
//! for the whole scan is yielded exactly once.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::trace;
use typedkv_core::{Result, ScanCursor};

use crate::store::{Inner, Keyspace};

/// Fetch one page: `(keyspace, resume_after, page_size)` → `(sort_key, item)` pairs
pub(crate) type PageFn<T> =
    Box<dyn FnMut(&mut Keyspace, Option<&str>, usize) -> Result<Vec<(String, T)>> + Send>;

/// Lazily paged cursor over a store collection
pub struct MemoryCursor<T> {
    inner: Arc<Inner>,
    id: u64,
    fetch: PageFn<T>,
    page_size: usize,
    resume_after: Option<String>,
    buffer: VecDeque<T>,
    exhausted: bool,
    closed: bool,
}

impl<T> MemoryCursor<T> {
    pub(crate) fn open(inner: Arc<Inner>, page_size: usize, fetch: PageFn<T>) -> Self {
        let id = inner.next_cursor_id.fetch_add(1, Ordering::Relaxed) + 1;
        inner.open_cursors.fetch_add(1, Ordering::AcqRel);
        trace!(target: "typedkv::store", cursor = id, "opened scan cursor");
        Self {
            inner,
            id,
            fetch,
            page_size: page_size.max(1),
            resume_after: None,
            buffer: VecDeque::new(),
            exhausted: false,
            closed: false,
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = {
            let mut keyspace = self.inner.lock()?;
            (self.fetch)(&mut *keyspace, self.resume_after.as_deref(), self.page_size)?
        };
        if page.len() < self.page_size {
            self.exhausted = true;
        }
        if let Some((last, _)) = page.last() {
            self.resume_after = Some(last.clone());
        }
        self.buffer.extend(page.into_iter().map(|(_, item)| item));
        Ok(())
    }
}

impl<T: Send> Iterator for MemoryCursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted || self.closed {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

impl<T: Send> ScanCursor<T> for MemoryCursor<T> {
    fn id(&self) -> u64 {
        self.id
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.buffer.clear();
            self.inner.open_cursors.fetch_sub(1, Ordering::AcqRel);
            trace!(target: "typedkv::store", cursor = self.id, "closed scan cursor");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Select one page from `(sort_key, item)` candidates
///
/// Keeps candidates strictly after `resume_after`, orders them by sort key
/// and truncates to `page_size`.
pub(crate) fn select_page<T>(
    candidates: impl Iterator<Item = (String, T)>,
    resume_after: Option<&str>,
    page_size: usize,
) -> Vec<(String, T)> {
    let mut page: Vec<(String, T)> = candidates
        .filter(|(sort_key, _)| resume_after.map_or(true, |after| sort_key.as_str() > after))
        .collect();
    page.sort_by(|a, b| a.0.cmp(&b.0));
    page.truncate(page_size);
    page
}
