//! Process-wide named options
//!
//! String values keyed by name, replace-on-set. Array values are stored
//! as compact JSON; a malformed stored value reads back as an empty
//! array rather than an error.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::Storage;

impl Storage {
    /// Set a string option, replacing any previous value
    pub fn set_option(&self, name: &str, value: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM options WHERE name = ?1", params![name])?;
        self.conn.execute(
            "INSERT INTO options (name, value) VALUES (?1, ?2)",
            params![name, value],
        )?;
        Ok(())
    }

    /// Set a string-array option, replacing any previous value
    pub fn set_option_list(&self, name: &str, values: &[String]) -> Result<()> {
        self.set_option(name, &serde_json::to_string(values)?)
    }

    /// Read a string option; unset names read as the empty string
    pub fn get_option(&self, name: &str) -> Result<String> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM options WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.unwrap_or_default())
    }

    /// Read a string-array option; unset or malformed values read as empty
    pub fn get_option_list(&self, name: &str) -> Result<Vec<String>> {
        let raw = self.get_option(name)?;
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }
}
