//! Editing use cases.
//!
//! # Responsibility
//! - Orchestrate playlist library, transaction history and persistence.
//! - Publish state to rendering collaborators.

pub mod observer;
pub mod session;
