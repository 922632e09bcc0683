//! Persistence layer for the cross-reference index
//!
//! Wraps a single SQLite database and exposes the domain operations the
//! indexer and the query commands are built from: file registration,
//! compile commands, include edges, tags, options, and the two read
//! queries. All mutation happens inside a [`Transaction`] opened by the
//! caller; a single writer is assumed.

mod commands;
mod files;
mod includes;
mod options;
mod query;
mod schema;
mod tags;
mod transaction;

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

pub use commands::CompileCommand;
pub use query::{Definition, RefDef, Reference};
pub use transaction::Transaction;

/// Database file created in the working directory.
pub const DB_FILE_NAME: &str = ".ct.sqlite";

/// Tag database over one open SQLite connection
///
/// The connection lives for the lifetime of the process. Operations are
/// deterministic and idempotent where the contract says so (include
/// edges, tags); re-running an indexing pass over unchanged inputs
/// leaves the database unchanged.
pub struct Storage {
    pub(crate) conn: Connection,
}

impl Storage {
    /// Open (or create) a tag database at the given path
    ///
    /// The schema is applied with `CREATE ... IF NOT EXISTS`, so opening
    /// an existing database is a no-op with respect to its contents.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open the default database (`.ct.sqlite`) in the working directory
    pub fn open_default() -> Result<Self> {
        Self::open(DB_FILE_NAME)
    }
}
