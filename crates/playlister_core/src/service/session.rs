//! Playlist editing session.
//!
//! # Responsibility
//! - Own the playlist library, the active playlist and its undo history.
//! - Turn user edits into `SongTransaction`s and submit them.
//! - Persist and publish state after every change.
//!
//! # Invariants
//! - At most one playlist is active; only it receives transactions.
//! - Selecting, closing or deleting the active playlist clears history.
//! - Usage errors leave playlist and history untouched.
//! - After an integrity violation the session refuses edits, undo and redo
//!   until the active playlist is closed or another one is selected.
//! - Store failures never roll back or block an in-memory edit.
//! - Nothing is saved while the session is halted; the library is written
//!   again once the untrusted playlist is closed or reselected.
//! - Exhausted playlist ids surface as `Integrity`, never as a reused id.

use crate::config::SessionConfig;
use crate::model::builder::{BuilderError, PlaylistBuilder};
use crate::model::playlist::{Playlist, PlaylistError, PlaylistId};
use crate::model::song::Song;
use crate::repo::json_store::parse_seed_lists;
use crate::repo::{PlaylistRecord, PlaylistStore, StoreError};
use crate::service::observer::{PlaylistSummary, SessionObserver, SessionState};
use crate::transaction::{Reversible, SongTransaction, StackError, TransactionStack};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Operation needs an active playlist and none is selected.
    NoActiveList,
    /// No playlist with this id exists in the library.
    PlaylistNotFound(PlaylistId),
    NothingToUndo,
    NothingToRedo,
    /// Index-addressed edit outside the active playlist.
    Playlist(PlaylistError),
    /// Broken invariant detected; the session stops trusting its history.
    Integrity(String),
    /// Refused because an earlier integrity violation is unresolved.
    Poisoned(String),
    /// Persistence collaborator failed while loading.
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveList => write!(f, "no playlist is selected"),
            Self::PlaylistNotFound(id) => write!(f, "playlist not found: {id}"),
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::Playlist(err) => write!(f, "{err}"),
            Self::Integrity(reason) => write!(f, "integrity violation: {reason}"),
            Self::Poisoned(reason) => write!(
                f,
                "session halted after integrity violation ({reason}); close or reselect the playlist"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Playlist(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlaylistError> for SessionError {
    fn from(value: PlaylistError) -> Self {
        Self::Playlist(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BuilderError> for SessionError {
    fn from(value: BuilderError) -> Self {
        error!(
            "event=integrity_violation module=session status=error reason=id_space_exhausted"
        );
        Self::Integrity(value.to_string())
    }
}

impl From<StackError<PlaylistError>> for SessionError {
    fn from(value: StackError<PlaylistError>) -> Self {
        match value {
            StackError::NothingToUndo => Self::NothingToUndo,
            StackError::NothingToRedo => Self::NothingToRedo,
            StackError::Rejected(err) => Self::Playlist(err),
            StackError::Corrupted { kind, reason } => {
                Self::Integrity(format!("{kind}: {reason}"))
            }
        }
    }
}

/// Editing session over a playlist library.
pub struct PlaylisterSession<S: PlaylistStore, O: SessionObserver> {
    config: SessionConfig,
    builder: PlaylistBuilder,
    /// Library kept sorted by case-insensitive name.
    playlists: Vec<Playlist>,
    current: Option<PlaylistId>,
    stack: TransactionStack<SongTransaction>,
    store: S,
    observer: O,
    poisoned: Option<String>,
    last_store_error: Option<String>,
}

impl<S: PlaylistStore, O: SessionObserver> PlaylisterSession<S, O> {
    /// Creates an empty session. Call `restore` or `load_or_seed` to fill it.
    pub fn new(store: S, observer: O, config: SessionConfig) -> Self {
        let stack = TransactionStack::new(config.verify_inversions);
        Self {
            config,
            builder: PlaylistBuilder::new(),
            playlists: Vec::new(),
            current: None,
            stack,
            store,
            observer,
            poisoned: None,
            last_store_error: None,
        }
    }

    /// Replaces the library with the store's saved playlists.
    ///
    /// Returns `false` when the store has never been saved; the session is
    /// left unchanged in that case.
    ///
    /// # Errors
    /// - `Store` when loading fails.
    /// - `Integrity` when two stored playlists share an id; nothing is loaded.
    pub fn restore(&mut self) -> SessionResult<bool> {
        let Some(records) = self.store.load_all()? else {
            return Ok(false);
        };

        let mut seen = HashSet::with_capacity(records.len());
        if let Some(duplicate) = records.iter().map(|r| r.id).find(|id| !seen.insert(*id)) {
            error!(
                "event=integrity_violation module=session status=error reason=duplicate_playlist_id playlist_id={}",
                duplicate
            );
            return Err(SessionError::Integrity(format!(
                "stored library contains playlist id {duplicate} more than once"
            )));
        }

        let mut playlists = Vec::with_capacity(records.len());
        for record in &records {
            playlists.push(PlaylistBuilder::build_playlist_with_id(
                record.id,
                record.name.as_str(),
                &record.songs,
            ));
            self.builder.ensure_next_id_after(record.id);
        }

        self.playlists = playlists;
        self.sort_lists();
        self.close_active();
        info!(
            "event=library_restore module=session status=ok playlists={} next_id={}",
            self.playlists.len(),
            self.builder
                .next_id()
                .map_or_else(|| "exhausted".to_string(), |id| id.to_string())
        );
        self.notify();
        Ok(true)
    }

    /// Restores from the store, or seeds the library from `seed_json` when
    /// the store has never been saved.
    pub fn load_or_seed(&mut self, seed_json: &str) -> SessionResult<()> {
        if self.restore()? {
            return Ok(());
        }

        let seeds = parse_seed_lists(seed_json)?;
        let mut seeded = Vec::with_capacity(seeds.len());
        for seed in &seeds {
            seeded.push(self.builder.build_playlist(seed.name.as_str(), &seed.songs)?);
        }
        self.playlists.extend(seeded);
        self.sort_lists();
        info!(
            "event=library_seed module=session status=ok playlists={}",
            seeds.len()
        );
        self.persist();
        self.notify();
        Ok(())
    }

    /// Adds a playlist under a freshly allocated id and returns that id.
    ///
    /// # Errors
    /// - `Integrity` when no playlist id is left; the library is unchanged.
    pub fn add_new_list(&mut self, name: &str, songs: &[Song]) -> SessionResult<PlaylistId> {
        let name = self.normalize_name(name);
        let playlist = self.builder.build_playlist(name, songs)?;
        let id = playlist.id();
        self.playlists.push(playlist);
        self.sort_lists();
        info!("event=list_add module=session status=ok playlist_id={}", id);
        self.persist();
        self.notify();
        Ok(id)
    }

    /// Adds an empty untitled playlist and selects it.
    pub fn create_and_select_new_list(&mut self) -> SessionResult<PlaylistId> {
        let name = self.config.untitled_name.clone();
        let id = self.add_new_list(&name, &[])?;
        self.select(id);
        Ok(id)
    }

    /// Copies playlist `id` (name plus copy suffix) under a new id.
    pub fn duplicate_list(&mut self, id: PlaylistId) -> SessionResult<PlaylistId> {
        let source = self.playlist(id).ok_or(SessionError::PlaylistNotFound(id))?;
        let name = format!("{}{}", source.name(), self.config.copy_suffix);
        let songs = source.songs().to_vec();
        self.add_new_list(&name, &songs)
    }

    /// Removes playlist `id`; closes it first when it is the active one.
    pub fn delete_list(&mut self, id: PlaylistId) -> SessionResult<()> {
        let position = self
            .playlists
            .iter()
            .position(|playlist| playlist.id() == id)
            .ok_or(SessionError::PlaylistNotFound(id))?;

        self.playlists.remove(position);
        if self.current == Some(id) {
            self.close_active();
        }
        info!("event=list_delete module=session status=ok playlist_id={}", id);
        self.persist();
        self.notify();
        Ok(())
    }

    /// Renames the active playlist; blank names become the untitled name.
    ///
    /// Renaming is not recorded in undo history. A halted session refuses
    /// to rename.
    pub fn rename_current_list(&mut self, name: &str) -> SessionResult<()> {
        self.ensure_trusted()?;
        let name = self.normalize_name(name);
        let index = self.active_index()?;
        self.playlists[index].rename(name);
        self.sort_lists();
        self.persist();
        self.notify();
        Ok(())
    }

    /// Makes playlist `id` the active one.
    ///
    /// Selecting the playlist that is already active keeps its history,
    /// unless the session is halted, in which case history is dropped.
    pub fn load_list(&mut self, id: PlaylistId) -> SessionResult<()> {
        if self.playlist(id).is_none() {
            return Err(SessionError::PlaylistNotFound(id));
        }
        if self.current == Some(id) && self.poisoned.is_none() {
            self.notify();
            return Ok(());
        }
        self.select(id);
        Ok(())
    }

    /// Closes the active playlist, if any, and drops its history.
    pub fn unselect_current_list(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.close_active();
        self.persist();
        self.notify();
    }

    /// Appends the configured default song to the active playlist.
    pub fn add_create_song(&mut self) -> SessionResult<usize> {
        let index = self.playlist_size()?;
        let song = self.config.default_song.clone();
        self.add_create_song_at(index, song)?;
        Ok(index)
    }

    /// Inserts `song` at `index` in the active playlist.
    pub fn add_create_song_at(&mut self, index: usize, song: Song) -> SessionResult<()> {
        self.submit(|_| Ok(SongTransaction::create_song(index, song)))
    }

    /// Removes the song at `index` from the active playlist.
    pub fn add_remove_song(&mut self, index: usize) -> SessionResult<()> {
        self.submit(|playlist| SongTransaction::remove_song(playlist, index))
    }

    /// Moves the song at `from` to `to` in the active playlist.
    pub fn add_move_song(&mut self, from: usize, to: usize) -> SessionResult<()> {
        self.submit(|_| Ok(SongTransaction::move_song(from, to)))
    }

    /// Replaces every field of the song at `index` with `new`.
    pub fn add_edit_song(&mut self, index: usize, new: Song) -> SessionResult<()> {
        self.submit(|playlist| SongTransaction::edit_song(playlist, index, new))
    }

    /// Reverts the most recent edit of the active playlist.
    pub fn undo(&mut self) -> SessionResult<()> {
        self.ensure_trusted()?;
        let index = self.active_index()?;
        let result = self.stack.undo(&mut self.playlists[index]);
        self.finish_history_step(result)
    }

    /// Re-applies the most recently undone edit.
    pub fn redo(&mut self) -> SessionResult<()> {
        self.ensure_trusted()?;
        let index = self.active_index()?;
        let result = self.stack.redo(&mut self.playlists[index]);
        self.finish_history_step(result)
    }

    pub fn can_undo(&self) -> bool {
        self.poisoned.is_none() && self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.poisoned.is_none() && self.stack.can_redo()
    }

    pub fn has_current_list(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_playlist_id(&self) -> Option<PlaylistId> {
        self.current
    }

    pub fn current_playlist(&self) -> Option<&Playlist> {
        self.current.and_then(|id| self.playlist(id))
    }

    /// Library in display order.
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|playlist| playlist.id() == id)
    }

    pub fn has_playlist_with_name(&self, name: &str) -> bool {
        self.playlists.iter().any(|playlist| playlist.name() == name)
    }

    /// Number of songs in the active playlist.
    pub fn playlist_size(&self) -> SessionResult<usize> {
        self.current_playlist()
            .map(Playlist::len)
            .ok_or(SessionError::NoActiveList)
    }

    /// Song at `index` in the active playlist.
    pub fn song(&self, index: usize) -> SessionResult<&Song> {
        let playlist = self.current_playlist().ok_or(SessionError::NoActiveList)?;
        Ok(playlist.song_at(index)?)
    }

    /// Id the next new playlist will receive, or `None` when ids ran out.
    pub fn next_playlist_id(&self) -> Option<PlaylistId> {
        self.builder.next_id()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Message of the most recent failed save, if it was not followed by a
    /// successful one.
    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    /// Writes the current library to the store.
    ///
    /// Edits already persist on their own; this is for callers that want to
    /// retry after a failure and see the outcome.
    ///
    /// # Errors
    /// - `Poisoned` while the session is halted.
    /// - `Store` when the store rejects the write.
    pub fn save(&mut self) -> SessionResult<()> {
        self.ensure_trusted()?;
        let records = self.records();
        let result = self.store.save_all(&records);
        self.last_store_error = result.as_ref().err().map(ToString::to_string);
        result.map_err(Into::into)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    fn submit(
        &mut self,
        build: impl FnOnce(&Playlist) -> Result<SongTransaction, PlaylistError>,
    ) -> SessionResult<()> {
        self.ensure_trusted()?;
        let index = self.active_index()?;
        let transaction = build(&self.playlists[index])?;
        let kind = transaction.kind();
        self.stack.submit(transaction, &mut self.playlists[index])?;
        debug!(
            "event=session_edit module=session status=ok kind={} playlist_id={}",
            kind,
            self.playlists[index].id()
        );
        self.persist();
        self.notify();
        Ok(())
    }

    fn finish_history_step(
        &mut self,
        result: Result<(), StackError<PlaylistError>>,
    ) -> SessionResult<()> {
        match result {
            Ok(()) => {
                self.persist();
                self.notify();
                Ok(())
            }
            Err(err @ StackError::Corrupted { .. }) => {
                let err = SessionError::from(err);
                self.poisoned = Some(err.to_string());
                error!(
                    "event=session_halt module=session status=error playlist_id={}",
                    self.current.map_or_else(|| "none".to_string(), |id| id.to_string())
                );
                self.notify();
                Err(err)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn ensure_trusted(&self) -> SessionResult<()> {
        match &self.poisoned {
            Some(reason) => Err(SessionError::Poisoned(reason.clone())),
            None => Ok(()),
        }
    }

    fn active_index(&self) -> SessionResult<usize> {
        let id = self.current.ok_or(SessionError::NoActiveList)?;
        self.playlists
            .iter()
            .position(|playlist| playlist.id() == id)
            .ok_or(SessionError::PlaylistNotFound(id))
    }

    fn select(&mut self, id: PlaylistId) {
        self.current = Some(id);
        self.stack.clear();
        self.poisoned = None;
        info!("event=list_select module=session status=ok playlist_id={}", id);
        self.persist();
        self.notify();
    }

    fn close_active(&mut self) {
        if let Some(id) = self.current.take() {
            info!("event=list_close module=session status=ok playlist_id={}", id);
        }
        self.stack.clear();
        self.poisoned = None;
    }

    fn normalize_name(&self, name: &str) -> String {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.config.untitled_name.clone()
        } else {
            trimmed.to_string()
        }
    }

    fn sort_lists(&mut self) {
        self.playlists
            .sort_by_cached_key(|playlist| playlist.name().to_uppercase());
    }

    fn records(&self) -> Vec<PlaylistRecord> {
        self.playlists.iter().map(PlaylistRecord::from).collect()
    }

    fn persist(&mut self) {
        if self.poisoned.is_some() {
            warn!("event=store_save module=session status=skipped reason=session_halted");
            return;
        }
        let records = self.records();
        match self.store.save_all(&records) {
            Ok(()) => self.last_store_error = None,
            Err(err) => {
                warn!(
                    "event=store_save module=session status=error playlists={} error={}",
                    records.len(),
                    err
                );
                self.last_store_error = Some(err.to_string());
            }
        }
    }

    fn notify(&mut self) {
        let active = self
            .current
            .and_then(|id| self.playlists.iter().find(|playlist| playlist.id() == id));
        let state = SessionState {
            active_playlist_id: self.current,
            active_name: active.map(Playlist::name),
            songs: active.map(Playlist::songs),
            can_undo: self.poisoned.is_none() && self.stack.can_undo(),
            can_redo: self.poisoned.is_none() && self.stack.can_redo(),
            playlists: self.playlists.iter().map(PlaylistSummary::from).collect(),
            poisoned: self.poisoned.is_some(),
            store_error: self.last_store_error.as_deref(),
        };
        self.observer.state_changed(&state);
    }
}
