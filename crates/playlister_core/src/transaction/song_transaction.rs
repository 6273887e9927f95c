//! Song-level edits on one playlist.
//!
//! # Responsibility
//! - Capture, at construction time, everything needed to invert an edit.
//! - Map each variant onto the playlist's index-addressed mutations.
//!
//! # Invariants
//! - `RemoveSong` and `EditSong` hold owned copies taken before apply, so
//!   later playlist mutations cannot alter what undo restores.
//! - `MoveSong` inverts by swapping its indices and nothing else.

use crate::model::playlist::{Playlist, PlaylistError};
use crate::model::song::Song;
use crate::transaction::Reversible;

/// Closed set of reversible playlist edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongTransaction {
    /// Insert `song` at `index`.
    CreateSong { index: usize, song: Song },
    /// Remove the song at `index`; `song` is the copy reinstated on undo.
    RemoveSong { index: usize, song: Song },
    /// Relocate the song at `from` to `to` (remove-then-insert).
    MoveSong { from: usize, to: usize },
    /// Replace the fields of the song at `index`.
    EditSong { index: usize, old: Song, new: Song },
}

impl SongTransaction {
    pub fn create_song(index: usize, song: Song) -> Self {
        Self::CreateSong { index, song }
    }

    /// Builds a removal, snapshotting the song currently at `index`.
    pub fn remove_song(playlist: &Playlist, index: usize) -> Result<Self, PlaylistError> {
        let song = playlist.song_at(index)?.clone();
        Ok(Self::RemoveSong { index, song })
    }

    pub fn move_song(from: usize, to: usize) -> Self {
        Self::MoveSong { from, to }
    }

    /// Builds an edit, snapshotting the current fields at `index` as `old`.
    pub fn edit_song(playlist: &Playlist, index: usize, new: Song) -> Result<Self, PlaylistError> {
        let old = playlist.song_at(index)?.clone();
        Ok(Self::EditSong { index, old, new })
    }

    /// Index of the song this edit addresses first.
    pub fn index(&self) -> usize {
        match self {
            Self::CreateSong { index, .. }
            | Self::RemoveSong { index, .. }
            | Self::EditSong { index, .. } => *index,
            Self::MoveSong { from, .. } => *from,
        }
    }
}

impl Reversible for SongTransaction {
    type Target = Playlist;
    type Checkpoint = Vec<Song>;
    type Error = PlaylistError;

    fn apply(&self, playlist: &mut Playlist) -> Result<(), PlaylistError> {
        match self {
            Self::CreateSong { index, song } => playlist.insert_song(*index, song.clone()),
            Self::RemoveSong { index, .. } => playlist.remove_song(*index).map(drop),
            Self::MoveSong { from, to } => playlist.move_song(*from, *to),
            Self::EditSong { index, new, .. } => {
                playlist.set_song_at(*index, new.clone()).map(drop)
            }
        }
    }

    fn invert(&self, playlist: &mut Playlist) -> Result<(), PlaylistError> {
        match self {
            Self::CreateSong { index, .. } => playlist.remove_song(*index).map(drop),
            Self::RemoveSong { index, song } => playlist.insert_song(*index, song.clone()),
            Self::MoveSong { from, to } => playlist.move_song(*to, *from),
            Self::EditSong { index, old, .. } => {
                playlist.set_song_at(*index, old.clone()).map(drop)
            }
        }
    }

    fn checkpoint(playlist: &Playlist) -> Vec<Song> {
        playlist.songs().to_vec()
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::CreateSong { .. } => "create_song",
            Self::RemoveSong { .. } => "remove_song",
            Self::MoveSong { .. } => "move_song",
            Self::EditSong { .. } => "edit_song",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SongTransaction;
    use crate::model::builder::PlaylistBuilder;
    use crate::model::playlist::{Playlist, PlaylistError};
    use crate::model::song::Song;
    use crate::transaction::Reversible;
    use proptest::prelude::*;

    fn song(title: &str) -> Song {
        Song::new(title, "artist", "yt", "1999")
    }

    fn playlist_of(len: usize) -> Playlist {
        let songs: Vec<Song> = (0..len).map(|i| song(&format!("s{i}"))).collect();
        PlaylistBuilder::build_playlist_with_id(0, "P", &songs)
    }

    fn assert_round_trip(playlist: &Playlist, txn: &SongTransaction) {
        let mut working = playlist.clone();
        txn.apply(&mut working).unwrap();
        txn.invert(&mut working).unwrap();
        assert_eq!(&working, playlist, "{} did not round-trip", txn.kind());
    }

    #[test]
    fn every_variant_round_trips() {
        let playlist = playlist_of(4);
        let variants = [
            SongTransaction::create_song(2, song("new")),
            SongTransaction::remove_song(&playlist, 1).unwrap(),
            SongTransaction::move_song(3, 0),
            SongTransaction::edit_song(&playlist, 0, song("edited")).unwrap(),
        ];

        for txn in &variants {
            // Exhaustive match keeps this list honest when variants change.
            match txn {
                SongTransaction::CreateSong { .. }
                | SongTransaction::RemoveSong { .. }
                | SongTransaction::MoveSong { .. }
                | SongTransaction::EditSong { .. } => assert_round_trip(&playlist, txn),
            }
        }
    }

    #[test]
    fn remove_snapshot_is_taken_at_construction() {
        let mut playlist = playlist_of(2);
        let txn = SongTransaction::remove_song(&playlist, 0).unwrap();

        playlist.set_song_at(0, song("mutated later")).unwrap();
        txn.apply(&mut playlist).unwrap();
        txn.invert(&mut playlist).unwrap();

        assert_eq!(playlist.songs()[0].title, "s0");
    }

    #[test]
    fn constructors_reject_missing_songs() {
        let playlist = playlist_of(1);
        assert_eq!(
            SongTransaction::remove_song(&playlist, 1).unwrap_err(),
            PlaylistError::IndexOutOfRange { index: 1, len: 1 }
        );
        assert!(SongTransaction::edit_song(&playlist, 3, song("x")).is_err());
    }

    #[test]
    fn failed_apply_leaves_playlist_untouched() {
        let mut playlist = playlist_of(3);
        let before = playlist.clone();

        let txn = SongTransaction::create_song(9, song("x"));
        assert!(txn.apply(&mut playlist).is_err());
        assert_eq!(playlist, before);
    }

    #[test]
    fn move_is_self_inverse_for_every_index_pair() {
        for len in 1..=7 {
            let playlist = playlist_of(len);
            for from in 0..len {
                for to in 0..len {
                    let mut working = playlist.clone();
                    working.move_song(from, to).unwrap();
                    working.move_song(to, from).unwrap();
                    assert_eq!(working, playlist, "len={len} from={from} to={to}");
                }
            }
        }
    }

    fn arb_song() -> impl Strategy<Value = Song> {
        ("[a-z]{0,8}", "[a-z]{0,8}", "[A-Za-z0-9]{0,11}", "[0-9]{0,4}")
            .prop_map(|(title, artist, id, year)| Song::new(title, artist, id, year))
    }

    proptest! {
        #[test]
        fn random_transactions_round_trip(
            songs in prop::collection::vec(arb_song(), 1..12),
            replacement in arb_song(),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
        ) {
            let playlist = PlaylistBuilder::build_playlist_with_id(1, "P", &songs);
            let i = a.index(songs.len());
            let j = b.index(songs.len());

            let txns = [
                SongTransaction::create_song(j, replacement.clone()),
                SongTransaction::remove_song(&playlist, i).unwrap(),
                SongTransaction::move_song(i, j),
                SongTransaction::edit_song(&playlist, i, replacement.clone()).unwrap(),
            ];
            for txn in &txns {
                let mut working = playlist.clone();
                txn.apply(&mut working).unwrap();
                txn.invert(&mut working).unwrap();
                prop_assert_eq!(&working, &playlist);
            }
        }
    }
}
