//! Scoped write transactions
//!
//! An indexing pass wraps all of its writes in one transaction so the
//! database moves atomically from the pre-pass state to the post-pass
//! state. The guard commits only when asked; any other exit path rolls
//! back.

use anyhow::Result;
use rusqlite::Connection;

use super::Storage;

/// Exclusive write transaction on the tag database
///
/// Created by [`Storage::begin_transaction`]. Issues `BEGIN IMMEDIATE`
/// on creation. Dropping the guard without calling [`commit`] rolls the
/// transaction back, so an error propagating out of the scope discards
/// every write made under it.
///
/// [`commit`]: Transaction::commit
pub struct Transaction<'conn> {
    conn: &'conn Connection,
    committed: bool,
}

impl<'conn> Transaction<'conn> {
    fn begin(conn: &'conn Connection) -> Result<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            committed: false,
        })
    }

    /// Make all writes since `begin_transaction` durable
    pub fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // Rollback failure here is unreportable; the connection will
            // discard the transaction when it closes anyway.
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

impl Storage {
    /// Begin an exclusive write transaction
    ///
    /// The guard borrows the storage immutably, so domain operations
    /// remain callable while it is live. Writes become visible to other
    /// connections only at commit.
    pub fn begin_transaction(&self) -> Result<Transaction<'_>> {
        Transaction::begin(&self.conn)
    }
}
