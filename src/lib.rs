//! Crosstag: a persistent cross-reference index for C/C++ codebases
//!
//! Crosstag parses translation units with a C/C++ semantic parser,
//! extracts every occurrence of every named entity, and persists the
//! result to a SQLite tag database. Downstream tools query the database
//! by file and byte offset (jump to definition) or by unique symbol
//! identifier (find references).
//!
//! Indexing is incremental: include relationships between translation
//! units and headers are recorded during each parse, and a file is
//! reparsed exactly when something it transitively includes changed on
//! disk. A whole pass runs under one database transaction, so an
//! interrupted run leaves the index untouched.
//!
//! # Position Conventions
//!
//! All positions are macro-expansion locations:
//! - **Line positions**: 1-indexed (line 1 is the first line)
//! - **Column positions**: 1-indexed (libclang convention)
//! - **Byte offsets**: 0-indexed from file start
//!
//! # Feature Flags
//!
//! - **`libclang`**: the libclang-backed parser used by the `index` and
//!   `update` commands. The library is loaded dynamically at runtime;
//!   builds without the feature keep the full query surface but cannot
//!   parse.

pub mod compile_db;
pub mod error;
pub mod indexer;
pub mod parse;
pub mod source;
pub mod storage;
pub mod version;
pub mod visitor;

pub use compile_db::load_compile_commands;
pub use error::IndexError;
pub use indexer::{index, update, IndexOptions};
pub use parse::{Cursor, Location, Parser, TranslationUnit, Visit};
pub use source::TranslationUnitSource;
pub use storage::{
    CompileCommand, Definition, RefDef, Reference, Storage, Transaction, DB_FILE_NAME,
};
pub use visitor::TagExtractor;
