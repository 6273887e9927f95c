//! Core of the Playlister playlist editor.
//! Owns the playlist model, reversible song edits, undo/redo history and
//! library persistence. Rendering lives outside this crate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transaction;

pub use config::SessionConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::builder::{BuilderError, PlaylistBuilder};
pub use model::playlist::{Playlist, PlaylistError, PlaylistId};
pub use model::song::Song;
pub use repo::json_store::{parse_seed_lists, JsonFilePlaylistStore, SeedPlaylist};
pub use repo::memory_store::MemoryPlaylistStore;
pub use repo::sqlite_store::SqlitePlaylistStore;
pub use repo::{PlaylistRecord, PlaylistStore, StoreError, StoreResult};
pub use service::observer::{NoopObserver, PlaylistSummary, SessionObserver, SessionState};
pub use service::session::{PlaylisterSession, SessionError, SessionResult};
pub use transaction::{Reversible, SongTransaction, StackError, TransactionStack};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
