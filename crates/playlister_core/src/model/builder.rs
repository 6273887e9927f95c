//! Playlist construction and id allocation.
//!
//! # Responsibility
//! - Allocate playlist ids from an owned monotonic counter.
//! - Build playlists from caller-provided song data without aliasing it.
//!
//! # Invariants
//! - Ids returned by `build_playlist` strictly increase for the lifetime of
//!   one builder and are never handed out twice.
//! - Once `PlaylistId::MAX` has been allocated or restored, allocation fails
//!   with `BuilderError::IdSpaceExhausted` instead of wrapping.
//! - Restore paths that use `build_playlist_with_id` must call
//!   `ensure_next_id_after` before the next `build_playlist`.

use crate::model::playlist::{Playlist, PlaylistId};
use crate::model::song::Song;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Id allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// Every id up to and including `PlaylistId::MAX` is taken.
    IdSpaceExhausted,
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdSpaceExhausted => write!(
                f,
                "playlist id space exhausted; id {} is already in use",
                PlaylistId::MAX
            ),
        }
    }
}

impl Error for BuilderError {}

/// Sole constructor of `Playlist` values.
///
/// One builder is owned by each session; there is no process-wide instance.
#[derive(Debug, Clone)]
pub struct PlaylistBuilder {
    /// `None` once `PlaylistId::MAX` is taken.
    next_id: Option<PlaylistId>,
}

impl Default for PlaylistBuilder {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl PlaylistBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose first allocated id is `next_id`.
    pub fn starting_at(next_id: PlaylistId) -> Self {
        Self {
            next_id: Some(next_id),
        }
    }

    /// Returns the id the next `build_playlist` call will assign, or `None`
    /// when no id is left.
    pub fn next_id(&self) -> Option<PlaylistId> {
        self.next_id
    }

    /// Builds an empty playlist under a fresh id.
    pub fn build_new_playlist(
        &mut self,
        name: impl Into<String>,
    ) -> Result<Playlist, BuilderError> {
        self.build_playlist(name, &[])
    }

    /// Builds a playlist under a fresh id, copying every input song.
    pub fn build_playlist(
        &mut self,
        name: impl Into<String>,
        songs: &[Song],
    ) -> Result<Playlist, BuilderError> {
        let id = self.next_id.ok_or(BuilderError::IdSpaceExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(Self::build_playlist_with_id(id, name, songs))
    }

    /// Builds a playlist under a caller-provided id.
    ///
    /// Does not touch the counter; see `ensure_next_id_after`.
    pub fn build_playlist_with_id(
        id: PlaylistId,
        name: impl Into<String>,
        songs: &[Song],
    ) -> Playlist {
        Playlist::from_parts(id, name.into(), songs.to_vec())
    }

    /// Moves the counter past `id` so restored ids cannot be handed out again.
    pub fn ensure_next_id_after(&mut self, id: PlaylistId) {
        self.next_id = match (self.next_id, id.checked_add(1)) {
            (Some(next), Some(after)) => Some(next.max(after)),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{BuilderError, PlaylistBuilder};
    use crate::model::playlist::PlaylistId;
    use crate::model::song::Song;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn build_copies_input_songs() {
        let mut builder = PlaylistBuilder::new();
        let mut input = vec![Song::new("a", "b", "c", "1990")];

        let playlist = builder.build_playlist("Mix", &input).unwrap();
        input[0].title = "changed".to_string();

        assert_eq!(playlist.songs()[0].title, "a");
    }

    #[test]
    fn ensure_next_id_after_never_moves_backwards() {
        let mut builder = PlaylistBuilder::starting_at(10);
        builder.ensure_next_id_after(3);
        assert_eq!(builder.next_id(), Some(10));

        builder.ensure_next_id_after(42);
        assert_eq!(builder.next_id(), Some(43));
        assert_eq!(builder.build_new_playlist("x").unwrap().id(), 43);
    }

    #[test]
    fn restoring_the_largest_id_exhausts_allocation() {
        let mut builder = PlaylistBuilder::new();
        builder.ensure_next_id_after(PlaylistId::MAX);

        assert_eq!(builder.next_id(), None);
        assert_eq!(
            builder.build_new_playlist("x").unwrap_err(),
            BuilderError::IdSpaceExhausted
        );
        builder.ensure_next_id_after(5);
        assert_eq!(builder.next_id(), None);
    }

    #[test]
    fn largest_id_is_handed_out_once() {
        let mut builder = PlaylistBuilder::starting_at(PlaylistId::MAX);

        assert_eq!(builder.build_new_playlist("last").unwrap().id(), PlaylistId::MAX);
        assert_eq!(
            builder.build_new_playlist("one too many").unwrap_err(),
            BuilderError::IdSpaceExhausted
        );
    }

    #[derive(Debug, Clone)]
    enum Step {
        Build(String, Vec<String>),
        Restore(PlaylistId),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            3 => (".{0,12}", prop::collection::vec("[a-z]{0,6}", 0..4))
                .prop_map(|(name, titles)| Step::Build(name, titles)),
            1 => (0u64..10_000).prop_map(Step::Restore),
        ]
    }

    proptest! {
        #[test]
        fn built_ids_strictly_increase_and_never_repeat(
            start in 0u64..1_000,
            steps in prop::collection::vec(step(), 1..60),
        ) {
            let mut builder = PlaylistBuilder::starting_at(start);
            let mut taken = HashSet::new();
            let mut last_built: Option<PlaylistId> = None;

            for step in steps {
                match step {
                    Step::Build(name, titles) => {
                        let songs: Vec<Song> = titles
                            .iter()
                            .map(|title| Song::new(title.as_str(), "artist", "yt", "2000"))
                            .collect();
                        let playlist = builder.build_playlist(name.as_str(), &songs).unwrap();
                        let id = playlist.id();

                        prop_assert!(last_built.map_or(true, |last| id > last));
                        prop_assert!(taken.insert(id));
                        prop_assert_eq!(playlist.name(), name.as_str());
                        prop_assert_eq!(playlist.songs(), songs.as_slice());
                        last_built = Some(id);
                    }
                    Step::Restore(id) => {
                        builder.ensure_next_id_after(id);
                        taken.insert(id);
                        prop_assert!(builder.next_id().unwrap() > id);
                    }
                }
            }
        }
    }
}
