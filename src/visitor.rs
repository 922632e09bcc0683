//! Tag extraction from a parsed translation unit
//!
//! Walks the cursor tree depth-first, pre-order, and records a tag for
//! every occurrence of a named entity, plus an include edge for every
//! file the parse touched. One extractor serves exactly one translation
//! unit; freshness decisions are delegated to
//! [`Storage::begin_file`](crate::storage::Storage::begin_file) and
//! cached per file for the duration of the walk.

use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;

use crate::parse::{Cursor, Visit};
use crate::storage::Storage;

/// Cursor-tree visitor emitting tags and include edges for one
/// translation unit
pub struct TagExtractor<'a, W: Write> {
    source_file: &'a str,
    exclude: &'a [String],
    storage: &'a Storage,
    /// Files seen during this walk, mapped to whether tags should be
    /// emitted for them. Not shared across translation units; the
    /// storage layer keeps the cross-unit answer consistent.
    needs_update: HashMap<String, bool>,
    out: &'a mut W,
}

impl<'a, W: Write> TagExtractor<'a, W> {
    /// Prepare an extractor for one translation unit
    ///
    /// Registers the source file and its self include edge up front.
    pub fn new(
        source_file: &'a str,
        exclude: &'a [String],
        storage: &'a Storage,
        out: &'a mut W,
    ) -> Result<Self> {
        let mut needs_update = HashMap::new();
        needs_update.insert(source_file.to_string(), storage.begin_file(source_file)?);
        storage.add_include(source_file, source_file)?;
        Ok(Self {
            source_file,
            exclude,
            storage,
            needs_update,
            out,
        })
    }

    /// Walk the whole tree under the translation unit's root cursor
    pub fn index<C: Cursor>(&mut self, root: &C) -> Result<()> {
        for child in root.children() {
            if !self.walk(&child)? {
                break;
            }
        }
        Ok(())
    }

    /// Depth-first, pre-order walk; returns false when aborted
    fn walk<C: Cursor>(&mut self, cursor: &C) -> Result<bool> {
        match self.visit(cursor)? {
            Visit::Break => Ok(false),
            Visit::Continue => Ok(true),
            Visit::Recurse => {
                for child in cursor.children() {
                    if !self.walk(&child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn visit<C: Cursor>(&mut self, cursor: &C) -> Result<Visit> {
        // Skip non-reference cursors
        let Some(referenced) = cursor.referenced() else {
            return Ok(Visit::Recurse);
        };

        let usr = referenced.usr();
        if usr.is_empty() {
            return Ok(Visit::Recurse);
        }

        let begin = cursor.location();
        let file_name = begin.file;

        // Built-ins have no file
        if file_name.is_empty() {
            return Ok(Visit::Continue);
        }

        // Skip excluded paths
        if self
            .exclude
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
        {
            return Ok(Visit::Continue);
        }

        if !self.needs_update.contains_key(&file_name) {
            writeln!(self.out, "    {}", file_name)?;
            let fresh = self.storage.begin_file(&file_name)?;
            self.needs_update.insert(file_name.clone(), fresh);
            self.storage.add_include(&file_name, self.source_file)?;
        }

        if self.needs_update.get(&file_name).copied().unwrap_or(false) {
            let end = cursor.end();
            self.storage.add_tag(
                &usr,
                &cursor.kind(),
                &cursor.spelling(),
                &file_name,
                begin.line,
                begin.column,
                begin.offset,
                end.line,
                end.column,
                end.offset,
                cursor.is_declaration(),
                cursor.is_definition(),
            )?;
        }

        Ok(Visit::Recurse)
    }
}
