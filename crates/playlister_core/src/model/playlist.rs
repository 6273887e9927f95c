//! Playlist container model.
//!
//! # Responsibility
//! - Hold an ordered, named sequence of songs under a stable id.
//! - Provide the index-addressed mutations used by song transactions.
//!
//! # Invariants
//! - `id` is assigned once by `PlaylistBuilder` and never changes.
//! - Vector order is the only song ordering; there is no index field.
//! - Out-of-range indices are rejected, never clamped, and leave the
//!   playlist untouched.

use crate::model::song::Song;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable playlist identifier allocated by `PlaylistBuilder`.
pub type PlaylistId = u64;

/// Errors from index-addressed playlist operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistError {
    /// Index outside the valid range for the attempted operation.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for PlaylistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "song index {index} out of range for playlist of {len}")
            }
        }
    }
}

impl Error for PlaylistError {}

/// Named, ordered container of songs.
///
/// Construct through `PlaylistBuilder`; it is the only id allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    id: PlaylistId,
    name: String,
    songs: Vec<Song>,
}

impl Playlist {
    pub(crate) fn from_parts(id: PlaylistId, name: String, songs: Vec<Song>) -> Self {
        Self { id, name, songs }
    }

    pub fn id(&self) -> PlaylistId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the song at `index`.
    pub fn song_at(&self, index: usize) -> Result<&Song, PlaylistError> {
        self.songs.get(index).ok_or(PlaylistError::IndexOutOfRange {
            index,
            len: self.songs.len(),
        })
    }

    /// Replaces the song at `index` in place and returns the previous value.
    pub fn set_song_at(&mut self, index: usize, song: Song) -> Result<Song, PlaylistError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.songs[index], song))
    }

    /// Inserts `song` so that it ends up at `index`.
    ///
    /// Valid range is `[0, len]`; `index == len` appends.
    pub fn insert_song(&mut self, index: usize, song: Song) -> Result<(), PlaylistError> {
        if index > self.songs.len() {
            return Err(PlaylistError::IndexOutOfRange {
                index,
                len: self.songs.len(),
            });
        }
        self.songs.insert(index, song);
        Ok(())
    }

    /// Removes and returns the song at `index`.
    pub fn remove_song(&mut self, index: usize) -> Result<Song, PlaylistError> {
        self.check_index(index)?;
        Ok(self.songs.remove(index))
    }

    /// Moves the song at `from` so that it ends up at `to`.
    ///
    /// The song is first removed (leaving `len - 1` songs) and then inserted
    /// at `to` in the shortened sequence. With that convention
    /// `move_song(a, b)` followed by `move_song(b, a)` is the identity for
    /// every valid pair, which is what `MoveSong` inversion relies on.
    pub fn move_song(&mut self, from: usize, to: usize) -> Result<(), PlaylistError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let song = self.songs.remove(from);
        self.songs.insert(to, song);
        Ok(())
    }

    /// Replaces the whole song sequence.
    pub fn replace_songs(&mut self, songs: Vec<Song>) {
        self.songs = songs;
    }

    fn check_index(&self, index: usize) -> Result<(), PlaylistError> {
        if index >= self.songs.len() {
            return Err(PlaylistError::IndexOutOfRange {
                index,
                len: self.songs.len(),
            });
        }
        Ok(())
    }
}
