//! Change notification for rendering collaborators.
//!
//! # Invariants
//! - Observers receive read-only views; they cannot mutate session state.
//! - The session must work with `NoopObserver`.

use crate::model::playlist::{Playlist, PlaylistId};
use crate::model::song::Song;

/// One row of the playlist library as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaylistSummary<'a> {
    pub id: PlaylistId,
    pub name: &'a str,
    pub song_count: usize,
}

impl<'a> From<&'a Playlist> for PlaylistSummary<'a> {
    fn from(playlist: &'a Playlist) -> Self {
        Self {
            id: playlist.id(),
            name: playlist.name(),
            song_count: playlist.len(),
        }
    }
}

/// Session state published after every state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState<'a> {
    pub active_playlist_id: Option<PlaylistId>,
    pub active_name: Option<&'a str>,
    /// Songs of the active playlist, `None` when nothing is selected.
    pub songs: Option<&'a [Song]>,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Library in display order.
    pub playlists: Vec<PlaylistSummary<'a>>,
    /// Set while the session refuses edits after an integrity violation.
    pub poisoned: bool,
    /// Message of the most recent failed save, cleared by the next success.
    pub store_error: Option<&'a str>,
}

/// Receives session state after every change.
pub trait SessionObserver {
    fn state_changed(&mut self, state: &SessionState<'_>);
}

/// Observer for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn state_changed(&mut self, _state: &SessionState<'_>) {}
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionState<'_>),
{
    fn state_changed(&mut self, state: &SessionState<'_>) {
        self(state)
    }
}
