//! Tag rows: one occurrence of a named entity in one file

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::Storage;

impl Storage {
    /// Record one symbol occurrence
    ///
    /// The uniqueness key within a file is (usr, offset1, offset2); a
    /// row already matching it is left alone. An unregistered file name
    /// is silently ignored; a consistent caller registers files through
    /// [`Storage::begin_file`] before tagging them.
    #[allow(clippy::too_many_arguments)]
    pub fn add_tag(
        &self,
        usr: &str,
        kind: &str,
        spelling: &str,
        file_name: &str,
        line1: u32,
        col1: u32,
        offset1: u32,
        line2: u32,
        col2: u32,
        offset2: u32,
        is_declaration: bool,
        is_definition: bool,
    ) -> Result<()> {
        let Some(file_id) = self.file_id(file_name)? else {
            return Ok(());
        };

        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM tags
                 WHERE fileId = ?1 AND usr = ?2 AND offset1 = ?3 AND offset2 = ?4",
                params![file_id, usr, offset1, offset2],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(());
        }

        self.conn.execute(
            "INSERT INTO tags (fileId, usr, kind, spelling,
                               line1, col1, offset1, line2, col2, offset2,
                               isDecl, isDefn)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                file_id,
                usr,
                kind,
                spelling,
                line1,
                col1,
                offset1,
                line2,
                col2,
                offset2,
                is_declaration,
                is_definition
            ],
        )?;
        Ok(())
    }

    /// Number of recorded tags
    pub fn count_tags(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of tags recorded for one file
    pub fn count_tags_in(&self, file_name: &str) -> Result<usize> {
        let Some(file_id) = self.file_id(file_name)? else {
            return Ok(0);
        };
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE fileId = ?1",
            params![file_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
