//! File registration and reindex scheduling
//!
//! A file row exists for every path the indexer has seen, either as a
//! translation unit or as a header pulled in by one. `indexed` holds the
//! filesystem mtime (seconds since epoch) captured when the file was
//! last parsed, 0 for never.

use std::fs;
use std::io;
use std::time::UNIX_EPOCH;

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::Storage;

/// Filesystem mtime in whole seconds since the epoch
pub(crate) fn mtime(path: &str) -> io::Result<i64> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0))
}

impl Storage {
    /// Look up a file id by exact name
    pub(crate) fn file_id(&self, file_name: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM files WHERE name = ?1",
                params![file_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Register a file if it is not known yet and return its id
    pub(crate) fn add_file(&self, file_name: &str) -> Result<i64> {
        if let Some(id) = self.file_id(file_name)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO files (id, name, indexed) VALUES (NULL, ?1, 0)",
            params![file_name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Start processing a file during an indexing pass
    ///
    /// Registers the file if new. If the on-disk mtime is newer than the
    /// recorded `indexed` timestamp, drops the file's tags and outgoing
    /// include edges, advances `indexed` to the mtime, and returns true:
    /// the caller should emit tags for this file during the current
    /// parse. Returns false when the stored data is still current.
    ///
    /// A file that cannot be stat'ed (e.g. deleted mid-parse) is treated
    /// as having mtime 0 and yields false.
    pub fn begin_file(&self, file_name: &str) -> Result<bool> {
        let file_id = self.add_file(file_name)?;

        let indexed: i64 = self.conn.query_row(
            "SELECT indexed FROM files WHERE id = ?1",
            params![file_id],
            |row| row.get(0),
        )?;

        let modified = mtime(file_name).unwrap_or(0);
        if modified <= indexed {
            return Ok(false);
        }

        self.conn
            .execute("DELETE FROM tags WHERE fileId = ?1", params![file_id])?;
        self.conn
            .execute("DELETE FROM includes WHERE sourceId = ?1", params![file_id])?;
        self.conn.execute(
            "UPDATE files SET indexed = ?1 WHERE id = ?2",
            params![modified, file_id],
        )?;
        Ok(true)
    }

    /// Return one translation unit that needs reparsing, or None when
    /// the pass is complete
    ///
    /// A source file is due when some file it includes (itself counts,
    /// via the self edge) has an on-disk mtime newer than its `indexed`
    /// timestamp. Candidates are examined in ascending include in-degree
    /// order, so a widely shared header is refreshed through the source
    /// that includes the fewest other stale files first.
    ///
    /// A candidate that can no longer be stat'ed is removed from the
    /// database (with a warning on stderr) and iteration continues. The
    /// driver calls this repeatedly; each call re-evaluates the include
    /// graph so completed reparses retire their candidates.
    pub fn next_file(&self) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT included.name, included.indexed, source.name,
                    COUNT(source.name) AS sourceCount
             FROM includes
             INNER JOIN files AS source ON source.id = includes.sourceId
             INNER JOIN files AS included ON included.id = includes.includedId
             GROUP BY included.id
             ORDER BY sourceCount",
        )?;
        let candidates: Vec<(String, i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<_, _>>()?;

        for (included, indexed, source) in candidates {
            let modified = match mtime(&included) {
                Ok(m) => m,
                Err(_) => {
                    eprintln!("Warning: could not stat() file `{}`", included);
                    eprintln!("  removing it from the index");
                    self.remove_file(&included)?;
                    continue;
                }
            };
            if modified > indexed {
                return Ok(Some(source));
            }
        }
        Ok(None)
    }

    /// Drop all tags and mark every file as never indexed
    ///
    /// Compile commands and include edges survive, so a subsequent
    /// update pass reparses everything from the recorded commands.
    pub fn clean_index(&self) -> Result<()> {
        self.conn.execute("DELETE FROM tags", [])?;
        self.conn.execute("UPDATE files SET indexed = 0", [])?;
        Ok(())
    }

    /// Remove a file and everything owned by it
    ///
    /// Cascades to its compile command, its tags, and include edges in
    /// both directions. Unknown names are a no-op.
    pub fn remove_file(&self, file_name: &str) -> Result<()> {
        let Some(file_id) = self.file_id(file_name)? else {
            return Ok(());
        };
        self.conn
            .execute("DELETE FROM commands WHERE fileId = ?1", params![file_id])?;
        self.conn
            .execute("DELETE FROM includes WHERE sourceId = ?1", params![file_id])?;
        self.conn.execute(
            "DELETE FROM includes WHERE includedId = ?1",
            params![file_id],
        )?;
        self.conn
            .execute("DELETE FROM tags WHERE fileId = ?1", params![file_id])?;
        self.conn
            .execute("DELETE FROM files WHERE id = ?1", params![file_id])?;
        Ok(())
    }

    /// Number of registered files
    pub fn count_files(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All registered file names, sorted
    pub fn file_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM files ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// The `indexed` timestamp recorded for a file, if registered
    pub fn last_indexed(&self, file_name: &str) -> Result<Option<i64>> {
        let indexed = self
            .conn
            .query_row(
                "SELECT indexed FROM files WHERE name = ?1",
                params![file_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(indexed)
    }
}
