//! libclang-backed parser
//!
//! Adapts the `clang` crate to the boundary traits in [`crate::parse`].
//! libclang is loaded at runtime, so binaries built with this feature
//! still start on machines without it; parsing then fails with a clear
//! error instead.

use anyhow::{anyhow, Result};
use clang::{Clang, Entity, Index};

use super::{Cursor, Location, Parser, TranslationUnit};

/// Parser over a libclang index
///
/// One instance serves a whole indexing pass; translation units borrow
/// it for their lifetime.
pub struct ClangParser<'c> {
    index: Index<'c>,
}

impl<'c> ClangParser<'c> {
    pub fn new(clang: &'c Clang) -> Self {
        Self {
            index: Index::new(clang, false, false),
        }
    }
}

impl<'c> Parser for ClangParser<'c> {
    type Unit<'p>
        = ClangUnit<'p>
    where
        Self: 'p;

    fn parse(&self, file: &str, directory: &str, args: &[String]) -> Result<ClangUnit<'_>> {
        // The stored argument vector starts with the compiler
        // executable, which libclang does not expect.
        let mut arguments: Vec<String> = args.iter().skip(1).cloned().collect();
        arguments.push(format!("-working-directory={}", directory));

        let tu = self
            .index
            .parser(file)
            .arguments(&arguments)
            .parse()
            .map_err(|e| anyhow!("{}", e))?;
        Ok(ClangUnit { tu })
    }
}

/// A parsed translation unit borrowing the libclang index
pub struct ClangUnit<'p> {
    tu: clang::TranslationUnit<'p>,
}

impl TranslationUnit for ClangUnit<'_> {
    type Cursor<'u>
        = ClangCursor<'u>
    where
        Self: 'u;

    fn cursor(&self) -> ClangCursor<'_> {
        ClangCursor(self.tu.get_entity())
    }

    fn diagnostics(&self) -> Vec<String> {
        self.tu
            .get_diagnostics()
            .iter()
            .map(|d| format!("{}", d))
            .collect()
    }
}

/// A libclang entity exposed as a walkable cursor
#[derive(Clone)]
pub struct ClangCursor<'u>(Entity<'u>);

fn expansion_location(location: Option<clang::source::SourceLocation<'_>>) -> Location {
    match location {
        Some(location) => {
            let expansion = location.get_expansion_location();
            Location {
                file: expansion
                    .file
                    .map(|f| f.get_path().to_string_lossy().into_owned())
                    .unwrap_or_default(),
                line: expansion.line,
                column: expansion.column,
                offset: expansion.offset,
            }
        }
        None => Location::default(),
    }
}

impl Cursor for ClangCursor<'_> {
    fn referenced(&self) -> Option<Self> {
        self.0.get_reference().map(ClangCursor)
    }

    fn usr(&self) -> String {
        self.0.get_usr().map(|usr| usr.0).unwrap_or_default()
    }

    fn kind(&self) -> String {
        format!("{:?}", self.0.get_kind())
    }

    fn spelling(&self) -> String {
        self.0.get_name().unwrap_or_default()
    }

    fn location(&self) -> Location {
        expansion_location(self.0.get_location())
    }

    fn end(&self) -> Location {
        expansion_location(self.0.get_range().map(|r| r.get_end()))
    }

    fn is_declaration(&self) -> bool {
        // Mirrors libclang's clang_isDeclaration: the declaration kind
        // ranges of CXCursorKind.
        let kind = self.0.get_kind() as i32;
        (1..=39).contains(&kind) || (600..=603).contains(&kind)
    }

    fn is_definition(&self) -> bool {
        self.0.is_definition()
    }

    fn children(&self) -> Vec<Self> {
        self.0.get_children().into_iter().map(ClangCursor).collect()
    }
}
