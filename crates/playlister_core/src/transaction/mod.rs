//! Reversible transactions and the undo/redo history that drives them.
//!
//! # Responsibility
//! - Define the `Reversible` contract every history entry implements.
//! - Provide the closed set of song edits (`SongTransaction`).
//! - Provide the generic `TransactionStack` enforcing undo/redo discipline.
//!
//! # Invariants
//! - `invert` applied right after `apply` restores the target field-wise.
//! - A failed `apply` on submit leaves target and history untouched.
//! - New submissions discard the whole redo history.

pub mod song_transaction;
pub mod stack;

pub use song_transaction::SongTransaction;
pub use stack::{StackError, TransactionStack};

/// A unit of work that knows how to apply itself and exactly undo that.
///
/// Implementations hold only the payload needed for inversion. The target is
/// passed in on every call and is never owned by the transaction.
pub trait Reversible {
    /// State the transaction mutates.
    type Target;
    /// Comparable capture of the parts of `Target` this transaction touches.
    type Checkpoint: PartialEq;
    /// Failure raised by `apply` or `invert`.
    type Error;

    /// Performs the edit. Must leave `target` untouched when it fails.
    fn apply(&self, target: &mut Self::Target) -> Result<(), Self::Error>;

    /// Reverts a previous `apply`. Must leave `target` untouched when it fails.
    fn invert(&self, target: &mut Self::Target) -> Result<(), Self::Error>;

    /// Captures state used to verify that `invert` restored the target.
    fn checkpoint(target: &Self::Target) -> Self::Checkpoint;

    /// Stable, content-free name used in log events.
    fn kind(&self) -> &'static str;
}
