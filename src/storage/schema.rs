//! SQLite schema for the tag database

use anyhow::Result;
use rusqlite::Connection;

/// Create all tables and indexes if they do not exist yet
///
/// Applied on every open; running against an existing database changes
/// nothing.
pub(crate) fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS files (
           id      INTEGER PRIMARY KEY,
           name    TEXT UNIQUE,
           indexed INTEGER
         );
         CREATE TABLE IF NOT EXISTS commands (
           fileId     INTEGER REFERENCES files(id),
           directory  TEXT,
           args       TEXT
         );
         CREATE TABLE IF NOT EXISTS includes (
           sourceId   INTEGER REFERENCES files(id),
           includedId INTEGER REFERENCES files(id)
         );
         CREATE TABLE IF NOT EXISTS tags (
           fileId   INTEGER REFERENCES files(id),
           usr      TEXT,
           kind     TEXT,
           spelling TEXT,
           line1    INTEGER,
           col1     INTEGER,
           offset1  INTEGER,
           line2    INTEGER,
           col2     INTEGER,
           offset2  INTEGER,
           isDecl   BOOLEAN,
           isDefn   BOOLEAN
         );
         CREATE TABLE IF NOT EXISTS options (
           name   TEXT,
           value  TEXT
         );
         CREATE INDEX IF NOT EXISTS idx_tags_spelling ON tags (spelling);
         CREATE INDEX IF NOT EXISTS idx_tags_usr ON tags (usr);",
    )?;
    Ok(())
}
