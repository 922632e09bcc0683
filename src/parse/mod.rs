//! Parser boundary
//!
//! The indexer consumes a C/C++ semantic parser through the traits in
//! this module: a [`Parser`] produces a [`TranslationUnit`], which hands
//! out [`Cursor`]s into its semantic tree. The production implementation
//! sits on libclang (see [`libclang`], behind the `libclang` cargo
//! feature); tests drive the same traits with an in-memory tree.
//!
//! # Position Conventions
//!
//! All locations are macro-expansion locations: the place a macro was
//! expanded, not the place it was defined. Lines and columns are
//! 1-indexed, byte offsets are 0-indexed from the start of the file. A
//! location inside compiler built-ins has an empty `file`.

#[cfg(feature = "libclang")]
pub mod libclang;

use anyhow::Result;

/// A resolved source position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// File the position falls in; empty for compiler built-ins.
    pub file: String,
    pub line: u32,
    pub column: u32,
    /// Byte offset from the start of the file.
    pub offset: u32,
}

/// Per-cursor decision returned by a visit callback
///
/// The walker interprets the value; control flow never relies on
/// unwinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into this cursor's children.
    Recurse,
    /// Skip this subtree and continue with the next sibling.
    Continue,
    /// Abort the whole walk.
    Break,
}

/// A node in the parser's semantic tree
pub trait Cursor: Sized {
    /// The declaration this cursor refers to, if any. A declaration
    /// refers to itself.
    fn referenced(&self) -> Option<Self>;

    /// Unified Symbol Resolution string of the referenced entity; an
    /// opaque byte string compared only for equality. Empty when the
    /// entity has none.
    fn usr(&self) -> String;

    /// Parser-defined kind name, e.g. `FunctionDecl` or `DeclRefExpr`.
    fn kind(&self) -> String;

    /// Display name of the entity at this cursor.
    fn spelling(&self) -> String;

    /// Expansion location where this cursor's extent begins.
    fn location(&self) -> Location;

    /// Expansion location where this cursor's extent ends.
    fn end(&self) -> Location;

    fn is_declaration(&self) -> bool;

    fn is_definition(&self) -> bool;

    /// Direct children, in source order.
    fn children(&self) -> Vec<Self>;
}

/// One parse of a source file with a specific compile command
pub trait TranslationUnit {
    type Cursor<'u>: Cursor
    where
        Self: 'u;

    /// Root cursor of the semantic tree.
    fn cursor(&self) -> Self::Cursor<'_>;

    /// Parser diagnostics, pre-formatted for display.
    fn diagnostics(&self) -> Vec<String>;
}

/// Front end able to parse a translation unit from a compile command
pub trait Parser {
    type Unit<'p>: TranslationUnit
    where
        Self: 'p;

    /// Parse `file` with the given argument vector, resolving relative
    /// paths against `directory`.
    fn parse(&self, file: &str, directory: &str, args: &[String]) -> Result<Self::Unit<'_>>;
}
