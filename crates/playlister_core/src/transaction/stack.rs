//! Undo/redo history for `Reversible` transactions.
//!
//! # Responsibility
//! - Apply submitted transactions and record them in `done`.
//! - Move transactions between `done` and `undone` on undo/redo.
//!
//! # Invariants
//! - `undone` only ever holds the most recently undone, not yet superseded
//!   suffix of history; any successful `submit` clears it.
//! - Rejected operations never push onto `done` or `undone`.
//! - `clear` drops both histories without calling `apply`/`invert`.
//! - With verification on, a failed or inexact inversion is reported as
//!   `StackError::Corrupted` and never silently repaired.

use crate::transaction::Reversible;
use log::{debug, error};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Errors from stack operations.
#[derive(Debug)]
pub enum StackError<E> {
    /// `undo` was called with an empty `done` history.
    NothingToUndo,
    /// `redo` was called with an empty `undone` history.
    NothingToRedo,
    /// The submitted transaction failed to apply; nothing was recorded.
    Rejected(E),
    /// A recorded transaction failed to invert/re-apply, or did not restore
    /// the state captured before it ran.
    Corrupted { kind: &'static str, reason: String },
}

impl<E: Display> Display for StackError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::Rejected(err) => write!(f, "transaction rejected: {err}"),
            Self::Corrupted { kind, reason } => {
                write!(f, "history corrupted by {kind} transaction: {reason}")
            }
        }
    }
}

impl<E: Error + 'static> Error for StackError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

struct Entry<T: Reversible> {
    transaction: T,
    /// State before the transaction was applied, when verification is on.
    before: Option<T::Checkpoint>,
}

/// LIFO history of applied (`done`) and undone (`undone`) transactions.
pub struct TransactionStack<T: Reversible> {
    done: Vec<Entry<T>>,
    undone: Vec<Entry<T>>,
    verify_inversions: bool,
}

impl<T> Default for TransactionStack<T>
where
    T: Reversible,
    T::Error: Display,
{
    fn default() -> Self {
        Self::new(true)
    }
}

impl<T> TransactionStack<T>
where
    T: Reversible,
    T::Error: Display,
{
    /// Creates an empty stack.
    ///
    /// When `verify_inversions` is set, every entry keeps a checkpoint of the
    /// target taken before apply, and undo/redo compare against it. Memory
    /// then grows with checkpoint size times history depth; for playlists
    /// that is one full copy of the song list per recorded edit.
    pub fn new(verify_inversions: bool) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            verify_inversions,
        }
    }

    /// Applies `transaction` to `target` and records it.
    ///
    /// # Errors
    /// - `Rejected` when apply fails; history (including redo) is unchanged.
    pub fn submit(
        &mut self,
        transaction: T,
        target: &mut T::Target,
    ) -> Result<(), StackError<T::Error>> {
        let before = self.verify_inversions.then(|| T::checkpoint(target));
        if let Err(err) = transaction.apply(target) {
            debug!(
                "event=txn_submit module=transaction status=rejected kind={}",
                transaction.kind()
            );
            return Err(StackError::Rejected(err));
        }

        let discarded = self.undone.len();
        self.undone.clear();
        debug!(
            "event=txn_submit module=transaction status=ok kind={} done={} discarded_redo={}",
            transaction.kind(),
            self.done.len() + 1,
            discarded
        );
        self.done.push(Entry {
            transaction,
            before,
        });
        Ok(())
    }

    /// Inverts the most recent applied transaction.
    ///
    /// # Errors
    /// - `NothingToUndo` when `done` is empty; nothing changes.
    /// - `Corrupted` when invert fails or does not restore the checkpoint.
    pub fn undo(&mut self, target: &mut T::Target) -> Result<(), StackError<T::Error>> {
        let Some(entry) = self.done.pop() else {
            return Err(StackError::NothingToUndo);
        };

        let kind = entry.transaction.kind();
        if let Err(err) = entry.transaction.invert(target) {
            let reason = format!("invert failed: {err}");
            self.done.push(entry);
            return Err(corrupted(kind, reason));
        }
        if let Some(before) = &entry.before {
            if *before != T::checkpoint(target) {
                self.done.push(entry);
                return Err(corrupted(kind, "undo did not restore prior state".to_string()));
            }
        }

        debug!(
            "event=txn_undo module=transaction status=ok kind={} done={} undone={}",
            kind,
            self.done.len(),
            self.undone.len() + 1
        );
        self.undone.push(entry);
        Ok(())
    }

    /// Re-applies the most recently undone transaction.
    ///
    /// # Errors
    /// - `NothingToRedo` when `undone` is empty; nothing changes.
    /// - `Corrupted` when the target drifted since undo or apply fails.
    pub fn redo(&mut self, target: &mut T::Target) -> Result<(), StackError<T::Error>> {
        let Some(entry) = self.undone.pop() else {
            return Err(StackError::NothingToRedo);
        };

        let kind = entry.transaction.kind();
        if let Some(before) = &entry.before {
            if *before != T::checkpoint(target) {
                self.undone.push(entry);
                return Err(corrupted(kind, "target changed since undo".to_string()));
            }
        }
        if let Err(err) = entry.transaction.apply(target) {
            let reason = format!("re-apply failed: {err}");
            self.undone.push(entry);
            return Err(corrupted(kind, reason));
        }

        debug!(
            "event=txn_redo module=transaction status=ok kind={} done={} undone={}",
            kind,
            self.done.len() + 1,
            self.undone.len()
        );
        self.done.push(entry);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Drops both histories without touching any target.
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    pub fn done_len(&self) -> usize {
        self.done.len()
    }

    pub fn undone_len(&self) -> usize {
        self.undone.len()
    }

    /// Transaction the next `undo` would invert.
    pub fn peek_undo(&self) -> Option<&T> {
        self.done.last().map(|entry| &entry.transaction)
    }

    /// Transaction the next `redo` would apply.
    pub fn peek_redo(&self) -> Option<&T> {
        self.undone.last().map(|entry| &entry.transaction)
    }
}

impl<T> Debug for TransactionStack<T>
where
    T: Reversible,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionStack")
            .field("done", &self.done.len())
            .field("undone", &self.undone.len())
            .field("verify_inversions", &self.verify_inversions)
            .finish()
    }
}

fn corrupted<E>(kind: &'static str, reason: String) -> StackError<E> {
    error!(
        "event=integrity_violation module=transaction status=error kind={} reason={}",
        kind, reason
    );
    StackError::Corrupted { kind, reason }
}
