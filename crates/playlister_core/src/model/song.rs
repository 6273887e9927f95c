//! Song value record.
//!
//! # Responsibility
//! - Define the record stored inside every playlist.
//! - Keep persisted field naming stable (`youTubeId`).
//!
//! # Invariants
//! - A `Song` has no identity beyond its position in a playlist.
//! - Every holder that must survive a playlist mutation owns its own copy;
//!   songs are never shared by reference across a mutation boundary.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter};

/// Title used for freshly created songs.
pub const DEFAULT_SONG_TITLE: &str = "Untitled";
/// Artist used for freshly created songs.
pub const DEFAULT_SONG_ARTIST: &str = "???";
/// YouTube id used for freshly created songs.
pub const DEFAULT_SONG_YOUTUBE_ID: &str = "dQw4w9WgXcQ";
/// Release year used for freshly created songs.
pub const DEFAULT_SONG_YEAR: &str = "2000";

/// One song in a playlist.
///
/// `Clone` is a deep copy: all fields are owned strings, so a clone shares
/// no storage with the original.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    /// Video id as it appears in a YouTube link.
    #[serde(rename = "youTubeId", default)]
    pub youtube_id: String,
    /// Free-form release year. Accepts JSON numbers on input.
    #[serde(default, deserialize_with = "year_from_str_or_int")]
    pub year: String,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        youtube_id: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            youtube_id: youtube_id.into(),
            year: year.into(),
        }
    }
}

impl Default for Song {
    fn default() -> Self {
        Self::new(
            DEFAULT_SONG_TITLE,
            DEFAULT_SONG_ARTIST,
            DEFAULT_SONG_YOUTUBE_ID,
            DEFAULT_SONG_YEAR,
        )
    }
}

fn year_from_str_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct YearVisitor;

    impl Visitor<'_> for YearVisitor {
        type Value = String;

        fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "a year as string or integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

#[cfg(test)]
mod tests {
    use super::Song;

    #[test]
    fn clone_is_field_wise_equal_and_independent() {
        let original = Song::new("Blue", "Joni Mitchell", "abc123", "1971");
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.title.push_str(" (live)");
        assert_eq!(original.title, "Blue");
        assert_ne!(copy, original);
    }

    #[test]
    fn year_accepts_integer_and_null() {
        let numeric: Song = serde_json::from_value(serde_json::json!({
            "title": "a",
            "artist": "b",
            "youTubeId": "c",
            "year": 1999
        }))
        .unwrap();
        assert_eq!(numeric.year, "1999");

        let missing: Song = serde_json::from_value(serde_json::json!({
            "title": "a",
            "artist": "b",
            "youTubeId": "c",
            "year": null
        }))
        .unwrap();
        assert_eq!(missing.year, "");
    }
}
