//! Indexing driver
//!
//! Orchestrates a full or targeted pass: one transaction, one parse and
//! cursor walk per selected translation unit, progress on the given
//! sink. Either every change from the pass commits or none does.

use std::io::Write;
use std::time::Instant;

use anyhow::Result;

use crate::parse::{Parser, TranslationUnit};
use crate::source::TranslationUnitSource;
use crate::storage::Storage;
use crate::visitor::TagExtractor;

/// Caller-facing knobs for one indexing pass
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Explicit translation units to (re)parse. Empty means: keep
    /// asking the database for stale sources until there are none.
    pub file_names: Vec<String>,
    /// Path prefixes whose files are not indexed.
    pub exclude: Vec<String>,
    /// Print parser diagnostics after each parse.
    pub diagnostics: bool,
}

/// Rebuild the index from scratch
///
/// Stores the exclude list as the `exclude` option, drops all tags,
/// resets every file to never-indexed, then runs an update pass.
pub fn index<P: Parser, W: Write>(
    storage: &Storage,
    parser: &P,
    options: &IndexOptions,
    out: &mut W,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "-- Indexing project")?;
    storage.set_option_list("exclude", &options.exclude)?;
    storage.clean_index()?;

    update_index(storage, parser, options, &options.exclude, out)
}

/// Bring the index up to date with the filesystem
///
/// The exclude list is read back from the `exclude` option; if the read
/// fails a warning is printed and an empty list is used.
pub fn update<P: Parser, W: Write>(
    storage: &Storage,
    parser: &P,
    options: &IndexOptions,
    out: &mut W,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "-- Updating index")?;
    let exclude = match storage.get_option_list("exclude") {
        Ok(values) => values,
        Err(err) => {
            eprintln!("Warning: {}", err);
            Vec::new()
        }
    };

    update_index(storage, parser, options, &exclude, out)
}

/// The update loop shared by both entry points
///
/// Runs entirely inside one transaction. With an explicit file list, a
/// file that fails to parse is reported and skipped; when iterating
/// stale sources from the database, a parse failure aborts (and rolls
/// back) the whole pass.
fn update_index<P: Parser, W: Write>(
    storage: &Storage,
    parser: &P,
    options: &IndexOptions,
    exclude: &[String],
    out: &mut W,
) -> Result<()> {
    let total = Instant::now();
    {
        let tx = storage.begin_transaction()?;
        let source = TranslationUnitSource::new(storage, parser);

        if options.file_names.is_empty() {
            while let Some(file_name) = storage.next_file()? {
                index_one(
                    storage,
                    &source,
                    &file_name,
                    exclude,
                    options.diagnostics,
                    out,
                )?;
            }
        } else {
            for file_name in &options.file_names {
                if let Err(err) = index_one(
                    storage,
                    &source,
                    file_name,
                    exclude,
                    options.diagnostics,
                    out,
                ) {
                    eprintln!("Error: {}", err);
                }
            }
        }

        tx.commit()?;
    }
    writeln!(out, "{:.2}s.", total.elapsed().as_secs_f64())?;
    Ok(())
}

/// Parse one translation unit and extract its tags
fn index_one<P: Parser, W: Write>(
    storage: &Storage,
    source: &TranslationUnitSource<'_, P>,
    file_name: &str,
    exclude: &[String],
    diagnostics: bool,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}:", file_name)?;
    write!(out, "  parsing...")?;
    out.flush()?;
    let timer = Instant::now();

    let tu = source.translation_unit(file_name)?;

    writeln!(out, "\t{:.2}s.", timer.elapsed().as_secs_f64())?;
    let timer = Instant::now();

    if diagnostics {
        for diagnostic in tu.diagnostics() {
            writeln!(out, "{}", diagnostic)?;
            writeln!(out)?;
        }
    }

    writeln!(out, "  indexing...")?;
    let mut extractor = TagExtractor::new(file_name, exclude, storage, out)?;
    extractor.index(&tu.cursor())?;
    writeln!(out, "  indexing...\t{:.2}s.", timer.elapsed().as_secs_f64())?;
    Ok(())
}
