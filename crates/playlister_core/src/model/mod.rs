//! Playlist domain model.
//!
//! # Responsibility
//! - Define the song record and the playlist container.
//! - Own playlist construction and id allocation through `PlaylistBuilder`.
//!
//! # Invariants
//! - Every playlist is identified by a `PlaylistId` that is never reused.
//! - Songs are plain values; playlists own them exclusively.

pub mod builder;
pub mod playlist;
pub mod song;
