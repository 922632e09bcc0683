//! Error types for the indexing pipeline
//!
//! Storage and driver code returns `anyhow::Result`; the variants here
//! cover the failures callers need to recognize by kind rather than by
//! message.

use thiserror::Error;

/// Failures with a defined meaning at the indexing boundary
#[derive(Debug, Error)]
pub enum IndexError {
    /// No translation unit in the database transitively includes the file.
    #[error("no compilation command for file `{0}`")]
    NoCompileCommand(String),

    /// An include edge was requested between file names that were never
    /// registered in the database.
    #[error("cannot add inclusion for unknown files `{included}` and `{source_file}`")]
    UnknownFile { included: String, source_file: String },

    /// The parser could not produce a translation unit.
    #[error("could not parse `{file}`: {reason}")]
    ParseFailed { file: String, reason: String },
}
