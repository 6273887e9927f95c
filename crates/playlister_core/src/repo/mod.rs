//! Playlist library persistence.
//!
//! # Responsibility
//! - Define the `PlaylistStore` contract consumed by the editing session.
//! - Provide JSON file, SQLite and in-memory implementations.
//!
//! # Invariants
//! - Stores persist whole libraries; there is no partial write API.
//! - `load_all` distinguishes "never saved" (`Ok(None)`) from an empty
//!   library (`Ok(Some(vec![]))`).
//! - Stores never allocate playlist ids; they round-trip what they are given.

use crate::model::playlist::{Playlist, PlaylistId};
use crate::model::song::Song;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_store;
pub mod memory_store;
pub mod sqlite_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted shape of one playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: PlaylistId,
    pub name: String,
    pub songs: Vec<Song>,
}

impl From<&Playlist> for PlaylistRecord {
    fn from(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id(),
            name: playlist.name().to_string(),
            songs: playlist.songs().to_vec(),
        }
    }
}

/// Failure of a persistence collaborator.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Sqlite(rusqlite::Error),
    /// The database was migrated by a newer build than this one.
    SchemaTooNew {
        db_version: u32,
        latest_supported: u32,
    },
    /// Stored data could not be mapped back onto the model.
    InvalidData(String),
    /// Backend refused the operation (used by test doubles).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "playlist store io: {err}"),
            Self::Json(err) => write!(f, "playlist store json: {err}"),
            Self::Sqlite(err) => write!(f, "playlist store sqlite: {err}"),
            Self::SchemaTooNew {
                db_version,
                latest_supported,
            } => write!(
                f,
                "playlist database schema {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored playlist data: {message}"),
            Self::Unavailable(message) => write!(f, "playlist store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Whole-library load/save contract.
pub trait PlaylistStore {
    /// Returns every saved playlist in saved order, or `None` when nothing
    /// was ever saved.
    fn load_all(&self) -> StoreResult<Option<Vec<PlaylistRecord>>>;

    /// Replaces the saved library with `playlists`.
    fn save_all(&self, playlists: &[PlaylistRecord]) -> StoreResult<()>;
}

impl<S: PlaylistStore + ?Sized> PlaylistStore for &S {
    fn load_all(&self) -> StoreResult<Option<Vec<PlaylistRecord>>> {
        (**self).load_all()
    }

    fn save_all(&self, playlists: &[PlaylistRecord]) -> StoreResult<()> {
        (**self).save_all(playlists)
    }
}
