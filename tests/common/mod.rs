//! Shared test fixtures: an in-memory parser driving the real pipeline
//!
//! The fake parser serves pre-built cursor trees keyed by file name and
//! records which translation units were requested, so tests can assert
//! exactly what a pass reparsed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{anyhow, Result};
use crosstag::{Cursor, Location, Parser, TranslationUnit};

/// A node of a hand-built cursor tree
#[derive(Debug, Clone, Default)]
pub struct FakeCursor {
    pub usr: String,
    pub kind: String,
    pub spelling: String,
    pub file: String,
    pub begin: (u32, u32, u32),
    pub end: (u32, u32, u32),
    pub is_decl: bool,
    pub is_defn: bool,
    pub references: bool,
    pub children: Vec<FakeCursor>,
}

impl Cursor for FakeCursor {
    fn referenced(&self) -> Option<Self> {
        if self.references {
            Some(self.clone())
        } else {
            None
        }
    }

    fn usr(&self) -> String {
        self.usr.clone()
    }

    fn kind(&self) -> String {
        self.kind.clone()
    }

    fn spelling(&self) -> String {
        self.spelling.clone()
    }

    fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.begin.0,
            column: self.begin.1,
            offset: self.begin.2,
        }
    }

    fn end(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.end.0,
            column: self.end.1,
            offset: self.end.2,
        }
    }

    fn is_declaration(&self) -> bool {
        self.is_decl
    }

    fn is_definition(&self) -> bool {
        self.is_defn
    }

    fn children(&self) -> Vec<Self> {
        self.children.clone()
    }
}

/// A declaration occurrence (declarations reference themselves)
pub fn decl(
    usr: &str,
    kind: &str,
    spelling: &str,
    file: &str,
    begin: (u32, u32, u32),
    end: (u32, u32, u32),
) -> FakeCursor {
    FakeCursor {
        usr: usr.to_string(),
        kind: kind.to_string(),
        spelling: spelling.to_string(),
        file: file.to_string(),
        begin,
        end,
        is_decl: true,
        is_defn: true,
        references: true,
        children: Vec::new(),
    }
}

/// A reference occurrence pointing at some declared entity
pub fn refr(
    usr: &str,
    kind: &str,
    spelling: &str,
    file: &str,
    begin: (u32, u32, u32),
    end: (u32, u32, u32),
) -> FakeCursor {
    FakeCursor {
        usr: usr.to_string(),
        kind: kind.to_string(),
        spelling: spelling.to_string(),
        file: file.to_string(),
        begin,
        end,
        is_decl: false,
        is_defn: false,
        references: true,
        children: Vec::new(),
    }
}

/// A pre-built translation unit
#[derive(Debug, Clone, Default)]
pub struct FakeUnit {
    root: FakeCursor,
    diagnostics: Vec<String>,
}

impl FakeUnit {
    pub fn new(cursors: Vec<FakeCursor>) -> Self {
        Self {
            root: FakeCursor {
                children: cursors,
                ..FakeCursor::default()
            },
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl TranslationUnit for FakeUnit {
    type Cursor<'u>
        = FakeCursor
    where
        Self: 'u;

    fn cursor(&self) -> FakeCursor {
        self.root.clone()
    }

    fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.clone()
    }
}

/// Parser serving canned units and logging every parse request
#[derive(Debug, Default)]
pub struct FakeParser {
    units: RefCell<HashMap<String, FakeUnit>>,
    parsed: RefCell<Vec<String>>,
}

impl FakeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unit(&self, file: &str, unit: FakeUnit) {
        self.units.borrow_mut().insert(file.to_string(), unit);
    }

    pub fn remove_unit(&self, file: &str) {
        self.units.borrow_mut().remove(file);
    }

    /// Files parsed so far, in request order
    pub fn parsed(&self) -> Vec<String> {
        self.parsed.borrow().clone()
    }

    pub fn clear_parsed(&self) {
        self.parsed.borrow_mut().clear();
    }
}

impl Parser for FakeParser {
    type Unit<'p>
        = FakeUnit
    where
        Self: 'p;

    fn parse(&self, file: &str, _directory: &str, _args: &[String]) -> Result<FakeUnit> {
        self.parsed.borrow_mut().push(file.to_string());
        self.units
            .borrow()
            .get(file)
            .cloned()
            .ok_or_else(|| anyhow!("no translation unit available for `{}`", file))
    }
}

/// Filesystem mtime in whole seconds, as the storage layer sees it
pub fn mtime_secs<P: AsRef<Path>>(path: P) -> i64 {
    std::fs::metadata(path)
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
