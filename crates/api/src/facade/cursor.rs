//! Scan cursor guard
//!
//! Every facade scan wraps the transport cursor in a `CursorGuard` the
//! moment it is opened. The guard drains the cursor and releases it; if
//! draining fails part way (a transport failure, or an item that does not
//! decode) the guard still releases the cursor when it is dropped.

use tracing::warn;
use typedkv_core::{Result, ScanCursor};

/// Owns an open cursor until it has been released
pub(crate) struct CursorGuard<T> {
    cursor: Box<dyn ScanCursor<T>>,
}

impl<T> CursorGuard<T> {
    pub(crate) fn new(cursor: Box<dyn ScanCursor<T>>) -> Self {
        Self { cursor }
    }

    /// Map every remaining item through `f`, collect, then release
    ///
    /// The first failure stops the scan; the cursor is released on the
    /// way out either way.
    pub(crate) fn drain_map<U, C, F>(mut self, mut f: F) -> Result<C>
    where
        F: FnMut(T) -> Result<U>,
        C: FromIterator<U>,
    {
        let collected: Result<C> = self
            .cursor
            .by_ref()
            .map(|item| item.and_then(&mut f))
            .collect();
        let collected = collected?;
        self.cursor.close()?;
        Ok(collected)
    }
}

impl<T> Drop for CursorGuard<T> {
    fn drop(&mut self) {
        if self.cursor.is_closed() {
            return;
        }
        if let Err(e) = self.cursor.close() {
            warn!(
                target: "typedkv::facade",
                cursor = self.cursor.id(),
                error = %e,
                "Failed to release scan cursor"
            );
        }
    }
}
