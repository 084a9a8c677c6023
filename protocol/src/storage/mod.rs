//! # Storage Module
//!
//! Everything between the contracts and the bytes on disk.
//!
//! ## Architecture
//!
//! ```text
//! key.rs    — composite key codec (namespace + attributes → key)
//! ledger.rs — the Ledger trait contracts program against
//! state.rs  — transaction write sets, read-your-own-writes, memory backend
//! db.rs     — sled persistence, one tree per module
//! store.rs  — LedgerStore: one invocation = one serialized transaction
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! contract ──► Ledger (Transaction) ──► WriteSet ──► StateBackend::apply
//!                    │                                 │
//!                    └──── reads ◄── MemoryBackend / SledBackend
//! ```

pub mod db;
pub mod key;
pub mod ledger;
pub mod state;
pub mod store;

pub use db::{LedgerDb, SledBackend};
pub use key::KeyError;
pub use ledger::{Ledger, LedgerError, LedgerEvent, LedgerResult};
pub use state::{MemoryBackend, StateBackend, Transaction, WriteSet};
pub use store::{LedgerStore, Receipt};
