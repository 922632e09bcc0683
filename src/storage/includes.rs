//! Include edges
//!
//! Directed (source, included) pairs recording that parsing a
//! translation unit touched a file. Every translation unit carries a
//! self edge. The edge set doubles as the lookup structure for
//! resolving a header's compile command.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::Storage;
use crate::error::IndexError;

impl Storage {
    /// Record that parsing `source_file` touched `included_file`
    ///
    /// Idempotent: at most one edge exists per ordered pair. Both names
    /// must already be registered; otherwise fails with
    /// [`IndexError::UnknownFile`].
    pub fn add_include(&self, included_file: &str, source_file: &str) -> Result<()> {
        let included_id = self.file_id(included_file)?;
        let source_id = self.file_id(source_file)?;
        match (included_id, source_id) {
            (Some(included_id), Some(source_id)) => self.add_include_ids(included_id, source_id),
            _ => Err(IndexError::UnknownFile {
                included: included_file.to_string(),
                source_file: source_file.to_string(),
            }
            .into()),
        }
    }

    /// Insert the edge if it is not present yet
    pub(crate) fn add_include_ids(&self, included_id: i64, source_id: i64) -> Result<()> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM includes WHERE sourceId = ?1 AND includedId = ?2",
                params![source_id, included_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            self.conn.execute(
                "INSERT INTO includes (sourceId, includedId) VALUES (?1, ?2)",
                params![source_id, included_id],
            )?;
        }
        Ok(())
    }

    /// Number of recorded include edges
    pub fn count_includes(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM includes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All (source, included) edges by name, sorted
    pub fn include_edges(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source.name, included.name
             FROM includes
             INNER JOIN files AS source ON source.id = includes.sourceId
             INNER JOIN files AS included ON included.id = includes.includedId
             ORDER BY source.name, included.name",
        )?;
        let edges = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }
}
