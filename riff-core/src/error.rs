//! Top-level error types for riff
//!
//! This module flattens the per-subsystem errors into the categories callers
//! actually branch on: a command that could not be parsed versus a policy
//! store that could not be read or written.

use thiserror::Error;

use crate::authorize::{DecomposeError, PatternStoreError};

/// Top-level error type for riff operations
///
/// - [`Error::Parse`] - the command under evaluation is not valid shell;
///   treat it as requiring interactive approval, never as approved
/// - [`Error::Store`] - the authorized-commands file could not be accessed
#[derive(Debug, Error)]
pub enum Error {
    /// The command could not be decomposed.
    #[error("command parse error: {0}")]
    Parse(#[from] DecomposeError),

    /// The pattern store failed.
    #[error("pattern store error: {0}")]
    Store(#[from] PatternStoreError),
}

impl Error {
    /// Returns true if this is a shell parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true if this is a storage error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result type for riff operations
pub type Result<T> = std::result::Result<T, Error>;
