//! Compilation database loader
//!
//! Reads a `compile_commands.json` produced by a build system and
//! registers every entry's compile command, making its translation unit
//! visible to subsequent indexing passes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::storage::Storage;

/// One entry of a JSON compilation database
///
/// Build systems emit either the split `arguments` array or a single
/// `command` string; both forms are accepted.
#[derive(Debug, Deserialize)]
struct Entry {
    directory: String,
    file: String,
    #[serde(default)]
    arguments: Option<Vec<String>>,
    #[serde(default)]
    command: Option<String>,
}

impl Entry {
    fn args(&self) -> Option<Vec<String>> {
        match (&self.arguments, &self.command) {
            (Some(arguments), _) => Some(arguments.clone()),
            (None, Some(command)) => {
                Some(command.split_whitespace().map(String::from).collect())
            }
            (None, None) => None,
        }
    }

    /// File path with relative names resolved against the entry's
    /// directory
    fn resolved_file(&self) -> String {
        let path = Path::new(&self.file);
        if path.is_absolute() {
            self.file.clone()
        } else {
            Path::new(&self.directory)
                .join(path)
                .to_string_lossy()
                .into_owned()
        }
    }
}

/// Load a `compile_commands.json` into the database
///
/// Registers every usable entry under one transaction and returns how
/// many were loaded. Entries without a command are skipped with a
/// warning.
pub fn load_compile_commands<P: AsRef<Path>>(storage: &Storage, path: P) -> Result<usize> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&text)
        .with_context(|| format!("could not parse `{}`", path.display()))?;

    let tx = storage.begin_transaction()?;
    let mut loaded = 0;
    for entry in &entries {
        let Some(args) = entry.args() else {
            eprintln!("Warning: no command recorded for `{}`", entry.file);
            continue;
        };
        storage.set_compile_command(&entry.resolved_file(), &entry.directory, &args)?;
        loaded += 1;
    }
    tx.commit()?;
    Ok(loaded)
}
