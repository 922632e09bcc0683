//! Read-only queries over the tag database
//!
//! The two lookups editor integrations are built on: what does the
//! entity under the cursor resolve to, and where else is an entity
//! used. Results serialize directly to the JSON shape the CLI prints.

use anyhow::Result;
use serde::Serialize;

use super::Storage;

/// One occurrence of an entity, with its full source range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub file: String,
    pub line1: u32,
    pub line2: u32,
    pub col1: u32,
    pub col2: u32,
    pub offset1: u32,
    pub offset2: u32,
    pub kind: String,
    pub spelling: String,
}

/// A declaration site an occurrence resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub usr: String,
    pub file: String,
    pub line1: u32,
    pub line2: u32,
    pub col1: u32,
    pub col2: u32,
    pub kind: String,
    pub spelling: String,
}

/// A reference paired with a declaration of the same entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefDef {
    #[serde(rename = "ref")]
    pub reference: Reference,
    pub def: Definition,
}

impl Storage {
    /// Find the declarations for whatever covers a byte offset
    ///
    /// Every tag in `file_name` whose range covers `offset` is joined on
    /// USR with every declaration tag of the same entity, in any file.
    /// Pairs are ordered by ascending reference span width, so the
    /// innermost enclosing occurrence comes first.
    ///
    /// The join filters on `isDecl`, not `isDefn`: forward declarations
    /// are acceptable targets.
    pub fn find_definition(&self, file_name: &str, offset: u32) -> Result<Vec<RefDef>> {
        let Some(file_id) = self.file_id(file_name)? else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT ref.line1, ref.line2, ref.col1, ref.col2,
                    ref.offset1, ref.offset2, ref.kind, ref.spelling,
                    def.usr, defFile.name,
                    def.line1, def.line2, def.col1, def.col2,
                    def.kind, def.spelling
             FROM tags AS ref
             INNER JOIN tags AS def ON def.usr = ref.usr
             INNER JOIN files AS defFile ON def.fileId = defFile.id
             WHERE def.isDecl = 1
               AND ref.fileId = ?1
               AND ref.offset1 <= ?2
               AND ref.offset2 >= ?2
             ORDER BY (ref.offset2 - ref.offset1)",
        )?;

        let results = stmt
            .query_map(rusqlite::params![file_id, offset], |row| {
                Ok(RefDef {
                    reference: Reference {
                        file: file_name.to_string(),
                        line1: row.get(0)?,
                        line2: row.get(1)?,
                        col1: row.get(2)?,
                        col2: row.get(3)?,
                        offset1: row.get(4)?,
                        offset2: row.get(5)?,
                        kind: row.get(6)?,
                        spelling: row.get(7)?,
                    },
                    def: Definition {
                        usr: row.get(8)?,
                        file: row.get(9)?,
                        line1: row.get(10)?,
                        line2: row.get(11)?,
                        col1: row.get(12)?,
                        col2: row.get(13)?,
                        kind: row.get(14)?,
                        spelling: row.get(15)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    /// Every occurrence of an entity, in any file
    pub fn grep(&self, usr: &str) -> Result<Vec<Reference>> {
        let mut stmt = self.conn.prepare(
            "SELECT refFile.name, ref.line1, ref.line2, ref.col1, ref.col2,
                    ref.offset1, ref.offset2, ref.kind, ref.spelling
             FROM tags AS ref
             INNER JOIN files AS refFile ON ref.fileId = refFile.id
             WHERE ref.usr = ?1
             ORDER BY refFile.name, ref.offset1",
        )?;

        let references = stmt
            .query_map(rusqlite::params![usr], |row| {
                Ok(Reference {
                    file: row.get(0)?,
                    line1: row.get(1)?,
                    line2: row.get(2)?,
                    col1: row.get(3)?,
                    col2: row.get(4)?,
                    offset1: row.get(5)?,
                    offset2: row.get(6)?,
                    kind: row.get(7)?,
                    spelling: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(references)
    }
}
