//! Optimistic multi-document transactions.
//!
//! [`run`] executes a closure against a fresh [`TxnContext`] and commits. If the commit
//! reports a conflicting concurrent write, the whole closure is replayed on a new
//! transaction, re-reading everything, up to the configured attempt limit. An error
//! returned by the closure drops the transaction, discarding its writes.

use std::sync::Arc;

use rocksdb::{BoundColumnFamily, ErrorKind, MultiThreaded, OptimisticTransactionDB, Transaction};
use tracing::{debug, warn};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::merge::FieldIncrements;

/// The underlying database type.
pub(crate) type Db = OptimisticTransactionDB<MultiThreaded>;

/// Get a column family handle.
pub(crate) fn cf_handle<'a>(db: &'a Db, name: &str) -> Result<Arc<BoundColumnFamily<'a>>> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
}

/// Reads and writes belonging to one transaction attempt.
pub struct TxnContext<'db> {
    db: &'db Db,
    txn: Transaction<'db, Db>,
}

impl<'db> TxnContext<'db> {
    fn begin(db: &'db Db) -> Self {
        Self {
            db,
            txn: db.transaction(),
        }
    }

    /// Read a document without tracking it for conflicts.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or decoding fails.
    pub fn read<T: serde::de::DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let handle = cf_handle(self.db, cf)?;
        self.txn
            .get_cf(&handle, key)?
            .map(|data| codec::deserialize(&data))
            .transpose()
    }

    /// Read a document and fail the commit if anyone else writes it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read or decoding fails.
    pub fn read_for_update<T: serde::de::DeserializeOwned>(
        &self,
        cf: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let handle = cf_handle(self.db, cf)?;
        self.txn
            .get_for_update_cf(&handle, key, true)?
            .map(|data| codec::deserialize(&data))
            .transpose()
    }

    /// Write a whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn put<T: serde::Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let handle = cf_handle(self.db, cf)?;
        self.txn.put_cf(&handle, key, codec::serialize(value)?)?;
        Ok(())
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&self, cf: &str, key: &[u8]) -> Result<()> {
        let handle = cf_handle(self.db, cf)?;
        self.txn.delete_cf(&handle, key)?;
        Ok(())
    }

    /// Add `delta` to an integer field of a stored document.
    ///
    /// The document must exist and `cf` must be registered with the increment operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the merge write fails.
    pub fn increment(&self, cf: &str, key: &[u8], field: &str, delta: i64) -> Result<()> {
        let handle = cf_handle(self.db, cf)?;
        let operand = FieldIncrements::single(field, delta).encode()?;
        self.txn.merge_cf(&handle, key, operand)?;
        Ok(())
    }

    fn commit(self) -> std::result::Result<(), rocksdb::Error> {
        self.txn.commit()
    }
}

fn is_conflict(e: &rocksdb::Error) -> bool {
    matches!(e.kind(), ErrorKind::Busy | ErrorKind::TryAgain)
}

/// Run `body` in an optimistic transaction, replaying it on commit conflicts.
///
/// # Errors
///
/// Returns the first error produced by `body`, a database error from the commit, or
/// [`StoreError::Conflict`] once `max_attempts` attempts have all conflicted.
pub(crate) fn run<T, F>(db: &Db, max_attempts: u32, operation: &'static str, mut body: F) -> Result<T>
where
    F: FnMut(&TxnContext<'_>) -> Result<T>,
{
    let attempts = max_attempts.max(1);

    for attempt in 1..=attempts {
        let ctx = TxnContext::begin(db);
        let value = body(&ctx)?;

        match ctx.commit() {
            Ok(()) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Transaction committed after retry");
                }
                return Ok(value);
            }
            Err(e) if is_conflict(&e) => {
                debug!(operation, attempt, error = %e, "Transaction conflict, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!(operation, attempts, "Transaction retries exhausted");
    Err(StoreError::Conflict { attempts })
}
