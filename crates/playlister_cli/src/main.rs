//! Playlister command-line probe.
//!
//! # Responsibility
//! - Verify `playlister_core` linkage and print its version.
//! - Summarize a saved JSON library when given its path.

use playlister_core::{JsonFilePlaylistStore, PlaylistStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("playlister_core version={}", playlister_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match JsonFilePlaylistStore::new(&path).load_all() {
        Ok(Some(playlists)) => {
            for playlist in playlists {
                println!(
                    "id={} songs={} name={}",
                    playlist.id,
                    playlist.songs.len(),
                    playlist.name
                );
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("no library saved at {path}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to load {path}: {err}");
            ExitCode::FAILURE
        }
    }
}
