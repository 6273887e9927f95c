//! Human-diffable JSON persistence.
//!
//! # Responsibility
//! - Save and load the playlist library as one pretty-printed JSON file.
//! - Parse seed documents used when no library was ever saved.
//!
//! # Invariants
//! - Writes go to a sibling temp file first and are renamed into place, so
//!   a crash never leaves a half-written library behind.
//! - A missing library file means "never saved", not an error.

use crate::model::song::Song;
use crate::repo::{PlaylistRecord, PlaylistStore, StoreResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct LibraryDocumentRef<'a> {
    playlists: &'a [PlaylistRecord],
}

#[derive(Deserialize)]
struct LibraryDocument {
    playlists: Vec<PlaylistRecord>,
}

/// Playlist without an id, as found in seed documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedPlaylist {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

#[derive(Deserialize)]
struct SeedDocument {
    playlists: Vec<SeedPlaylist>,
}

/// Parses a `{ "playlists": [{ "name", "songs" }] }` seed document.
pub fn parse_seed_lists(json: &str) -> StoreResult<Vec<SeedPlaylist>> {
    let document: SeedDocument = serde_json::from_str(json)?;
    Ok(document.playlists)
}

/// Library stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePlaylistStore {
    path: PathBuf,
}

impl JsonFilePlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PlaylistStore for JsonFilePlaylistStore {
    fn load_all(&self) -> StoreResult<Option<Vec<PlaylistRecord>>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=store_load module=repo status=ok backend=json found=false");
                return Ok(None);
            }
            Err(err) => {
                warn!(
                    "event=store_load module=repo status=error backend=json error={}",
                    err
                );
                return Err(err.into());
            }
        };

        let document: LibraryDocument = serde_json::from_str(&text)?;
        info!(
            "event=store_load module=repo status=ok backend=json found=true playlists={}",
            document.playlists.len()
        );
        Ok(Some(document.playlists))
    }

    fn save_all(&self, playlists: &[PlaylistRecord]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut text = serde_json::to_string_pretty(&LibraryDocumentRef { playlists })?;
        text.push('\n');

        let temp = self.temp_path();
        std::fs::write(&temp, text)?;
        std::fs::rename(&temp, &self.path)?;
        info!(
            "event=store_save module=repo status=ok backend=json playlists={}",
            playlists.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_seed_lists, JsonFilePlaylistStore};
    use crate::model::song::Song;
    use crate::repo::{PlaylistRecord, PlaylistStore, StoreError};

    #[test]
    fn missing_file_loads_as_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePlaylistStore::new(dir.path().join("library.json"));
        assert_eq!(store.load_all().unwrap(), None);
    }

    #[test]
    fn save_then_load_preserves_order_and_uses_wire_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.json");
        let store = JsonFilePlaylistStore::new(&path);
        let records = vec![
            PlaylistRecord {
                id: 4,
                name: "Zed".to_string(),
                songs: vec![Song::new("t", "a", "yt1", "1988")],
            },
            PlaylistRecord {
                id: 1,
                name: "Alpha".to_string(),
                songs: Vec::new(),
            },
        ];

        store.save_all(&records).unwrap();
        assert_eq!(store.load_all().unwrap(), Some(records));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"youTubeId\": \"yt1\""));
        assert!(raw.contains('\n'));
        assert!(!path.with_file_name("library.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFilePlaylistStore::new(&path).load_all().unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn seed_lists_accept_numeric_years() {
        let seeds = parse_seed_lists(
            r#"{
                "playlists": [
                    {
                        "name": "Classics",
                        "songs": [
                            { "title": "So What", "artist": "Miles Davis", "youTubeId": "ylXk1LBvIqU", "year": 1959 }
                        ]
                    },
                    { "name": "Empty" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].songs[0].year, "1959");
        assert!(seeds[1].songs.is_empty());
    }
}
