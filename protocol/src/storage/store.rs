//! # LedgerStore: Transaction Runner
//!
//! Runs one contract invocation as one transaction:
//!
//! 1. Take the store's commit lock.
//! 2. Open a [`Transaction`] over the committed state.
//! 3. Run the contract closure against it.
//! 4. On `Ok`, apply the write set atomically and release the events.
//!    On `Err`, drop the write set and the events.
//!
//! The commit lock is held across the whole read-modify-write window, so
//! invocations against the same store are serialized. That is the isolation
//! guarantee the contracts rely on: two swipes of one card can never both
//! observe it as checked out, and two issuances can never read the same
//! counter value. Contract code itself takes no locks.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ledger::{Ledger, LedgerError, LedgerEvent};
use super::state::{StateBackend, Transaction};

/// Outcome of a committed transaction.
#[derive(Debug, Clone)]
pub struct Receipt<T> {
    /// Identifier assigned when the transaction opened.
    pub tx_id: Uuid,
    /// When the write set was applied.
    pub committed_at: DateTime<Utc>,
    /// Value returned by the contract closure.
    pub value: T,
    /// Events emitted by the transaction, in emission order.
    pub events: Vec<LedgerEvent>,
}

/// Serializing transaction runner over one module's committed state.
pub struct LedgerStore<B: StateBackend> {
    backend: B,
    commit_lock: Mutex<()>,
}

impl<B: StateBackend> LedgerStore<B> {
    /// Wraps `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            commit_lock: Mutex::new(()),
        }
    }

    /// The committed state, for read-only inspection outside a transaction.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs `f` as one transaction and commits its writes if it succeeds.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or the backend's commit failure
    /// converted into `E`. In both cases nothing is written and no events
    /// are released.
    pub fn transact<T, E, F>(&self, f: F) -> Result<Receipt<T>, E>
    where
        F: FnOnce(&mut dyn Ledger) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let tx_id = Uuid::new_v4();
        let _guard = self.commit_lock.lock();

        let mut tx = Transaction::new(&self.backend);
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                debug!(%tx_id, "transaction aborted by contract");
                return Err(e);
            }
        };

        let (writes, events) = tx.into_parts();
        let touched = writes.len();
        if let Err(e) = self.backend.apply(writes) {
            warn!(%tx_id, error = %e, "commit failed, transaction discarded");
            return Err(e.into());
        }

        debug!(%tx_id, keys = touched, events = events.len(), "transaction committed");
        Ok(Receipt {
            tx_id,
            committed_at: Utc::now(),
            value,
            events,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
