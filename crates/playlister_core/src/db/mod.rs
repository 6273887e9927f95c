//! SQLite bootstrap for the playlist store.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas the store needs.
//! - Run schema migrations before any playlist data is touched.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection is only handed out after migrations succeed.
//! - Failures surface as `StoreError`, the same type `SqlitePlaylistStore`
//!   reports, so opening and using the store share one error path.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
