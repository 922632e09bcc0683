//! Translation unit acquisition
//!
//! Bridges the tag database and the parser: a file name is resolved to
//! its compile command through the include graph, then handed to the
//! parser in the recorded working directory.

use anyhow::Result;

use crate::error::IndexError;
use crate::parse::Parser;
use crate::storage::Storage;

/// Produces parsed translation units for files known to the database
pub struct TranslationUnitSource<'a, P: Parser> {
    storage: &'a Storage,
    parser: &'a P,
}

impl<'a, P: Parser> TranslationUnitSource<'a, P> {
    pub fn new(storage: &'a Storage, parser: &'a P) -> Self {
        Self { storage, parser }
    }

    /// Parse the translation unit for `file_name`
    ///
    /// Headers resolve to the command of some translation unit that
    /// includes them. Lookup and parser failures both surface as
    /// [`IndexError::ParseFailed`] carrying the originating file.
    pub fn translation_unit(&self, file_name: &str) -> Result<P::Unit<'a>> {
        let command = self
            .storage
            .get_compile_command(file_name)
            .map_err(|e| IndexError::ParseFailed {
                file: file_name.to_string(),
                reason: e.to_string(),
            })?;

        self.parser
            .parse(file_name, &command.directory, &command.args)
            .map_err(|e| {
                IndexError::ParseFailed {
                    file: file_name.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }
}
