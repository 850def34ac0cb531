//! Error types for Kiosksh
//!
//! Design goals, in order:
//! - Human-readable messages safe to echo back to the terminal operator
//! - No leakage of internal detail (host paths outside the session root,
//!   collaborator state, panic payloads)
//! - Clear categorization so the dispatch boundary can audit failures

use thiserror::Error;

use crate::parser::ParseError;

/// Result type alias using Kiosksh's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Kiosksh error types.
///
/// Every message is written for display to the shell operator. The engine
/// converts handler errors to `Error: <message>` replies at the dispatch
/// boundary; none of these abort the engine itself.
#[derive(Error, Debug)]
pub enum Error {
    /// The input line could not be tokenized (unbalanced quoting).
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A command name was registered twice (construction-time only).
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// An absolute path argument from a session without admin privileges.
    #[error("absolute paths require administrative privileges")]
    AbsolutePath,

    /// A path argument that resolves outside the session root.
    #[error("path escapes the session root: {0}")]
    OutsideRoot(String),

    /// A directory argument that does not exist.
    #[error("directory not found: {0}")]
    DirNotFound(String),

    /// A directory argument that names a non-directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A sandboxed command reported failure; carries its stderr.
    #[error("{0}")]
    Sandbox(String),

    /// I/O error from session setup (missing working directory, etc).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
