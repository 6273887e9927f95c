//! SQLite-backed playlist library.
//!
//! # Responsibility
//! - Persist playlists and their songs in normalized tables.
//! - Keep SQL details behind the `PlaylistStore` contract.
//!
//! # Invariants
//! - `save_all` replaces the whole library inside one SQLite transaction.
//! - `position` columns carry list order; reads sort by them.
//! - Reads reject rows that cannot map back onto the model.

use crate::model::song::Song;
use crate::repo::{PlaylistRecord, PlaylistStore, StoreError, StoreResult};
use log::info;
use rusqlite::{params, Connection};

const SAVED_MARKER_KEY: &str = "library_saved";

/// Store over a migrated connection from `db::open_db*`.
pub struct SqlitePlaylistStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaylistStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn was_saved(&self) -> StoreResult<bool> {
        let saved: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM store_meta WHERE key = ?1);",
            [SAVED_MARKER_KEY],
            |row| row.get(0),
        )?;
        Ok(saved == 1)
    }

    fn load_songs(&self, playlist_id: i64) -> StoreResult<Vec<Song>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, artist, youtube_id, year
             FROM songs
             WHERE playlist_id = ?1
             ORDER BY position ASC;",
        )?;
        let songs = stmt
            .query_map([playlist_id], |row| {
                Ok(Song {
                    title: row.get(0)?,
                    artist: row.get(1)?,
                    youtube_id: row.get(2)?,
                    year: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }
}

impl PlaylistStore for SqlitePlaylistStore<'_> {
    fn load_all(&self) -> StoreResult<Option<Vec<PlaylistRecord>>> {
        if !self.was_saved()? {
            info!("event=store_load module=repo status=ok backend=sqlite found=false");
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM playlists ORDER BY position ASC;")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (raw_id, name) in rows {
            let id = u64::try_from(raw_id).map_err(|_| {
                StoreError::InvalidData(format!("negative playlist id `{raw_id}` in playlists.id"))
            })?;
            records.push(PlaylistRecord {
                id,
                name,
                songs: self.load_songs(raw_id)?,
            });
        }

        info!(
            "event=store_load module=repo status=ok backend=sqlite found=true playlists={}",
            records.len()
        );
        Ok(Some(records))
    }

    fn save_all(&self, playlists: &[PlaylistRecord]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM songs;", [])?;
        tx.execute("DELETE FROM playlists;", [])?;

        for (position, playlist) in playlists.iter().enumerate() {
            let id = to_db_int(playlist.id, "playlist id")?;
            tx.execute(
                "INSERT INTO playlists (id, name, position) VALUES (?1, ?2, ?3);",
                params![id, playlist.name.as_str(), to_db_int(position, "position")?],
            )?;
            for (song_position, song) in playlist.songs.iter().enumerate() {
                tx.execute(
                    "INSERT INTO songs (playlist_id, position, title, artist, youtube_id, year)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![
                        id,
                        to_db_int(song_position, "song position")?,
                        song.title.as_str(),
                        song.artist.as_str(),
                        song.youtube_id.as_str(),
                        song.year.as_str(),
                    ],
                )?;
            }
        }

        tx.execute(
            "INSERT INTO store_meta (key, value) VALUES (?1, '1')
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            [SAVED_MARKER_KEY],
        )?;
        tx.commit()?;

        info!(
            "event=store_save module=repo status=ok backend=sqlite playlists={}",
            playlists.len()
        );
        Ok(())
    }
}

fn to_db_int<T>(value: T, what: &str) -> StoreResult<i64>
where
    T: TryInto<i64> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("{what} `{value}` exceeds sqlite integer range")))
}

#[cfg(test)]
mod tests {
    use super::SqlitePlaylistStore;
    use crate::db::open_db_in_memory;
    use crate::model::song::Song;
    use crate::repo::{PlaylistRecord, PlaylistStore, StoreError};

    fn record(id: u64, name: &str, titles: &[&str]) -> PlaylistRecord {
        PlaylistRecord {
            id,
            name: name.to_string(),
            songs: titles
                .iter()
                .map(|title| Song::new(*title, "artist", "yt", "2010"))
                .collect(),
        }
    }

    #[test]
    fn fresh_database_was_never_saved() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePlaylistStore::new(&conn);
        assert_eq!(store.load_all().unwrap(), None);
    }

    #[test]
    fn empty_library_is_distinct_from_never_saved() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePlaylistStore::new(&conn);
        store.save_all(&[]).unwrap();
        assert_eq!(store.load_all().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn save_replaces_previous_library() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePlaylistStore::new(&conn);

        store
            .save_all(&[record(3, "B", &["x", "y"]), record(9, "A", &[])])
            .unwrap();
        let second = vec![record(9, "A", &["z", "w", "v"])];
        store.save_all(&second).unwrap();

        assert_eq!(store.load_all().unwrap(), Some(second));
    }

    #[test]
    fn oversized_id_is_rejected_without_partial_write() {
        let conn = open_db_in_memory().unwrap();
        let store = SqlitePlaylistStore::new(&conn);
        let kept = vec![record(1, "Keep", &["a"])];
        store.save_all(&kept).unwrap();

        let err = store.save_all(&[record(u64::MAX, "Huge", &[])]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
        assert_eq!(store.load_all().unwrap(), Some(kept));
    }
}
