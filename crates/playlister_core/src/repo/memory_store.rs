//! In-process store for headless sessions and tests.

use crate::repo::{PlaylistRecord, PlaylistStore, StoreError, StoreResult};
use std::cell::{Cell, RefCell};

/// Keeps the last saved library in memory.
///
/// `set_available(false)` makes every call fail with
/// `StoreError::Unavailable`, which is how collaborator failures are
/// exercised without touching the filesystem.
#[derive(Debug)]
pub struct MemoryPlaylistStore {
    saved: RefCell<Option<Vec<PlaylistRecord>>>,
    available: Cell<bool>,
    save_count: Cell<usize>,
}

impl Default for MemoryPlaylistStore {
    fn default() -> Self {
        Self {
            saved: RefCell::new(None),
            available: Cell::new(true),
            save_count: Cell::new(0),
        }
    }
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `records`.
    pub fn with_records(records: Vec<PlaylistRecord>) -> Self {
        let store = Self::default();
        store.saved.replace(Some(records));
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    /// Snapshot of the last successfully saved library.
    pub fn saved(&self) -> Option<Vec<PlaylistRecord>> {
        self.saved.borrow().clone()
    }

    /// Number of successful `save_all` calls.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.get() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        }
    }
}

impl PlaylistStore for MemoryPlaylistStore {
    fn load_all(&self) -> StoreResult<Option<Vec<PlaylistRecord>>> {
        self.ensure_available()?;
        Ok(self.saved.borrow().clone())
    }

    fn save_all(&self, playlists: &[PlaylistRecord]) -> StoreResult<()> {
        self.ensure_available()?;
        self.saved.replace(Some(playlists.to_vec()));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
