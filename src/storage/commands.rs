//! Compile command storage and lookup
//!
//! Each translation unit carries the working directory and argument
//! vector it is parsed with. Headers have no command of their own; they
//! resolve to the command of some translation unit that includes them.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::Storage;
use crate::error::IndexError;

/// Working directory and argument vector for one translation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileCommand {
    pub directory: String,
    pub args: Vec<String>,
}

impl Storage {
    /// Register a translation unit and its compile command
    ///
    /// Creates the file row if needed, replaces any previous command,
    /// and ensures the self include edge exists. Returns the file id.
    pub fn set_compile_command(
        &self,
        file_name: &str,
        directory: &str,
        args: &[String],
    ) -> Result<i64> {
        let file_id = self.add_file(file_name)?;
        self.add_include_ids(file_id, file_id)?;

        self.conn
            .execute("DELETE FROM commands WHERE fileId = ?1", params![file_id])?;
        self.conn.execute(
            "INSERT INTO commands (fileId, directory, args) VALUES (?1, ?2, ?3)",
            params![file_id, directory, serde_json::to_string(args)?],
        )?;
        Ok(file_id)
    }

    /// Resolve the compile command for a file
    ///
    /// Follows the include graph: any translation unit with a recorded
    /// edge to the file supplies its command, so headers resolve to an
    /// arbitrary includer. Fails with
    /// [`IndexError::NoCompileCommand`] when no source includes the
    /// file.
    pub fn get_compile_command(&self, file_name: &str) -> Result<CompileCommand> {
        let file_id = self
            .file_id(file_name)?
            .ok_or_else(|| IndexError::NoCompileCommand(file_name.to_string()))?;

        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT commands.directory, commands.args
                 FROM includes
                 INNER JOIN commands ON includes.sourceId = commands.fileId
                 WHERE includes.includedId = ?1",
                params![file_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (directory, args) =
            row.ok_or_else(|| IndexError::NoCompileCommand(file_name.to_string()))?;
        Ok(CompileCommand {
            directory,
            args: serde_json::from_str(&args).unwrap_or_default(),
        })
    }
}
