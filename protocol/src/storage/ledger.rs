//! # Ledger Accessor
//!
//! The only window contract code has onto persisted state. A [`Ledger`] is
//! scoped to one transaction: reads observe the transaction's own earlier
//! writes, and nothing becomes visible to other transactions until the
//! surrounding [`LedgerStore`](super::store::LedgerStore) commits.
//!
//! Implementations never retry. A failing call surfaces as a
//! [`LedgerError`] and the whole transaction is discarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the ledger backend.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store could not serve the request.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The embedded sled database reported an error.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Stored bytes for a key are not valid UTF-8 where text was expected.
    #[error("non-utf8 value under key {key:?}")]
    InvalidUtf8 {
        /// The key whose value could not be decoded.
        key: String,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// A named notification emitted by a transaction, delivered only if the
/// transaction commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Event name, e.g. `nsPay`.
    pub name: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl LedgerEvent {
    /// Returns the payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Transaction-scoped key-value access plus event emission.
pub trait Ledger {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Removes `key`. Deleting an absent key is not an error.
    fn delete(&mut self, key: &str) -> LedgerResult<()>;

    /// Queues an event for delivery on commit.
    fn emit_event(&mut self, name: &str, payload: Vec<u8>) -> LedgerResult<()>;

    /// Reads `key` as UTF-8 text.
    fn get_string(&self, key: &str) -> LedgerResult<Option<String>> {
        match self.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| LedgerError::InvalidUtf8 {
                    key: key.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Stores `value` under `key` as UTF-8 text.
    fn put_string(&mut self, key: &str, value: &str) -> LedgerResult<()> {
        self.put(key, value.as_bytes().to_vec())
    }
}
