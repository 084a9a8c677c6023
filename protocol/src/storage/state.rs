//! # Transaction State
//!
//! A transaction reads through to a [`StateBackend`] but buffers every write
//! and delete in a [`WriteSet`]. Reads consult the write set first, which is
//! what gives contract code read-your-own-writes inside one invocation. The
//! write set is handed to the backend in one piece on commit, or dropped on
//! abort.
//!
//! ## Backends
//!
//! - [`MemoryBackend`]: a `BTreeMap` behind a lock. Used by tests and by
//!   anything that does not need durability.
//! - [`SledBackend`](super::db::SledBackend): one sled tree per module.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::ledger::{Ledger, LedgerEvent, LedgerResult};

// ---------------------------------------------------------------------------
// StateBackend
// ---------------------------------------------------------------------------

/// Committed key-value state that transactions read from and commit into.
pub trait StateBackend: Send + Sync {
    /// Returns the committed value under `key`.
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Applies every write and delete in `writes` atomically.
    fn apply(&self, writes: WriteSet) -> LedgerResult<()>;
}

// ---------------------------------------------------------------------------
// WriteSet
// ---------------------------------------------------------------------------

/// Pending mutations of one transaction. `None` marks a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    entries: BTreeMap<String, Option<Vec<u8>>>,
}

impl WriteSet {
    /// Creates an empty write set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a write. Replaces any earlier write or delete of `key`.
    pub fn put(&mut self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.to_string(), Some(value));
    }

    /// Records a delete. Replaces any earlier write of `key`.
    pub fn delete(&mut self, key: &str) {
        self.entries.insert(key.to_string(), None);
    }

    /// Looks up a pending mutation.
    ///
    /// The outer `Option` says whether `key` was touched at all; the inner
    /// one distinguishes a write from a delete.
    pub fn get(&self, key: &str) -> Option<Option<&[u8]>> {
        self.entries.get(key).map(|v| v.as_deref())
    }

    /// Number of touched keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the transaction touched nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over pending mutations in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<Vec<u8>>)> {
        self.entries.iter()
    }
}

impl IntoIterator for WriteSet {
    type Item = (String, Option<Vec<u8>>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Option<Vec<u8>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// The [`Ledger`] handed to contract code for the span of one invocation.
pub struct Transaction<'a> {
    backend: &'a dyn StateBackend,
    writes: WriteSet,
    events: Vec<LedgerEvent>,
}

impl<'a> Transaction<'a> {
    /// Opens a transaction over `backend`.
    pub fn new(backend: &'a dyn StateBackend) -> Self {
        Self {
            backend,
            writes: WriteSet::new(),
            events: Vec::new(),
        }
    }

    /// Events emitted so far, in emission order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Consumes the transaction, yielding its write set and events.
    pub fn into_parts(self) -> (WriteSet, Vec<LedgerEvent>) {
        (self.writes, self.events)
    }
}

impl Ledger for Transaction<'_> {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.map(<[u8]>::to_vec)),
            None => self.backend.read(key),
        }
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        self.writes.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> LedgerResult<()> {
        self.writes.delete(key);
        Ok(())
    }

    fn emit_event(&mut self, name: &str, payload: Vec<u8>) -> LedgerResult<()> {
        self.events.push(LedgerEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-memory committed state.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// `true` if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copies out all committed entries, in key order.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries.read().clone()
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn apply(&self, writes: WriteSet) -> LedgerResult<()> {
        let mut entries = self.entries.write();
        for (key, value) in writes {
            match value {
                Some(bytes) => {
                    entries.insert(key, bytes);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(pairs: &[(&str, &str)]) -> MemoryBackend {
        let backend = MemoryBackend::new();
        let mut writes = WriteSet::new();
        for (k, v) in pairs {
            writes.put(k, v.as_bytes().to_vec());
        }
        backend.apply(writes).unwrap();
        backend
    }

    #[test]
    fn reads_fall_through_to_backend() {
        let backend = seeded(&[("a", "1")]);
        let tx = Transaction::new(&backend);
        assert_eq!(tx.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(tx.get("b").unwrap(), None);
    }

    #[test]
    fn reads_observe_own_writes() {
        let backend = seeded(&[("a", "1")]);
        let mut tx = Transaction::new(&backend);
        tx.put("a", b"2".to_vec()).unwrap();
        tx.put("b", b"3".to_vec()).unwrap();
        assert_eq!(tx.get_string("a").unwrap().as_deref(), Some("2"));
        assert_eq!(tx.get_string("b").unwrap().as_deref(), Some("3"));
        // Not committed yet.
        assert_eq!(backend.read("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(backend.read("b").unwrap(), None);
    }

    #[test]
    fn reads_observe_own_deletes() {
        let backend = seeded(&[("a", "1")]);
        let mut tx = Transaction::new(&backend);
        tx.delete("a").unwrap();
        assert_eq!(tx.get("a").unwrap(), None);
    }

    #[test]
    fn put_after_delete_wins() {
        let backend = seeded(&[("a", "1")]);
        let mut tx = Transaction::new(&backend);
        tx.delete("a").unwrap();
        tx.put("a", b"9".to_vec()).unwrap();
        let (writes, _) = tx.into_parts();
        assert_eq!(writes.len(), 1);
        backend.apply(writes).unwrap();
        assert_eq!(backend.read("a").unwrap(), Some(b"9".to_vec()));
    }

    #[test]
    fn apply_commits_writes_and_deletes() {
        let backend = seeded(&[("a", "1"), ("b", "2")]);
        let mut tx = Transaction::new(&backend);
        tx.delete("a").unwrap();
        tx.put("c", b"3".to_vec()).unwrap();
        let (writes, _) = tx.into_parts();
        backend.apply(writes).unwrap();

        let snapshot = backend.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains_key("a"));
        assert_eq!(snapshot["c"], b"3".to_vec());
    }

    #[test]
    fn events_keep_emission_order() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        tx.emit_event("nsPay", b"40".to_vec()).unwrap();
        tx.emit_event("veoliaPay", b"60".to_vec()).unwrap();
        let names: Vec<_> = tx.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["nsPay", "veoliaPay"]);
        assert_eq!(tx.events()[1].payload_str(), Some("60"));
    }

    #[test]
    fn non_utf8_value_is_reported() {
        let backend = MemoryBackend::new();
        let mut writes = WriteSet::new();
        writes.put("bin", vec![0xff, 0xfe]);
        backend.apply(writes).unwrap();
        let tx = Transaction::new(&backend);
        assert!(tx.get_string("bin").is_err());
    }
}
