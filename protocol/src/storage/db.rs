//! # LedgerDb: Persistent State
//!
//! Durable committed state built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! Each contract module gets its own sled tree, which acts as that module's
//! private ledger. The three modules all key their cards under the `Card`
//! namespace with different attribute arities, so sharing a tree would let
//! their entries collide.
//!
//! | Tree      | Key                     | Value                     |
//! |-----------|-------------------------|---------------------------|
//! | `issue`   | counters, `Card/<id>`   | decimal ASCII integer     |
//! | `payment` | `Card/<card>/<company>` | decimal ASCII integer     |
//! | `travel`  | `Card/<card>`           | check-in location (UTF-8) |
//!
//! ## Atomicity
//!
//! A transaction's write set is applied as a single sled `Batch` and then
//! flushed. Either every write and delete of the invocation lands on disk or
//! none does.

use sled::{Batch, Db, Tree};
use std::path::Path;

use super::ledger::LedgerResult;
use super::state::{StateBackend, WriteSet};

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Handle on the sled database holding every module's ledger.
///
/// sled trees are safe to share across threads, and cloning a `LedgerDb`
/// is cheap (reference counted).
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
}

impl LedgerDb {
    /// Opens or creates a database at `path`.
    ///
    /// Every commit flushes its own batch, so sled's periodic background
    /// flusher is disabled. Dropping the last handle then releases the file
    /// lock immediately and the path can be reopened in the same process.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::Config::new()
            .path(path)
            .flush_every_ms(None)
            .open()?;
        Ok(Self { db })
    }

    /// Creates a throwaway database removed when the last handle drops.
    pub fn open_temporary() -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Opens the ledger partition of `module`, creating it if needed.
    pub fn backend(&self, module: &str) -> LedgerResult<SledBackend> {
        let tree = self.db.open_tree(module)?;
        Ok(SledBackend { tree })
    }

    /// Names of all partitions that exist on disk, excluding sled's default tree.
    pub fn modules(&self) -> Vec<String> {
        self.db
            .tree_names()
            .into_iter()
            .filter_map(|name| String::from_utf8(name.to_vec()).ok())
            .filter(|name| name != "__sled__default")
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SledBackend
// ---------------------------------------------------------------------------

/// Committed state of one module, stored in its own sled tree.
#[derive(Debug, Clone)]
pub struct SledBackend {
    tree: Tree,
}

impl SledBackend {
    /// Number of committed keys in this partition.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// `true` if the partition holds nothing.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl StateBackend for SledBackend {
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn apply(&self, writes: WriteSet) -> LedgerResult<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut batch = Batch::default();
        for (key, value) in writes {
            match value {
                Some(bytes) => batch.insert(key.as_bytes(), bytes),
                None => batch.remove(key.as_bytes()),
            }
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
