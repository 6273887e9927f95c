//! Editing session configuration.
//!
//! # Invariants
//! - Every field has a default; partial JSON documents are accepted.
//! - Unknown keys are rejected so typos surface instead of being ignored.

use crate::model::song::Song;
use serde::Deserialize;

/// Name given to new playlists and to playlists renamed to blank.
pub const DEFAULT_UNTITLED_NAME: &str = "Untitled";
/// Suffix appended to the name of a duplicated playlist.
pub const DEFAULT_COPY_SUFFIX: &str = " (Copy)";

/// Tunables for `PlaylisterSession`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Checkpoint songs before each edit and verify undo restores them.
    ///
    /// Each recorded edit then holds a full copy of the active playlist's
    /// songs, so history memory grows with playlist length times history
    /// depth. Turn off for very long playlists.
    pub verify_inversions: bool,
    /// Song appended by `add_create_song`.
    pub default_song: Song,
    pub untitled_name: String,
    pub copy_suffix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verify_inversions: true,
            default_song: Song::default(),
            untitled_name: DEFAULT_UNTITLED_NAME.to_string(),
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parses a (possibly partial) JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionConfig;

    #[test]
    fn partial_document_keeps_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "verify_inversions": false }"#).unwrap();
        assert!(!config.verify_inversions);
        assert_eq!(config.untitled_name, "Untitled");
        assert_eq!(config.default_song.youtube_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SessionConfig::from_json_str(r#"{ "verify": true }"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }
}
