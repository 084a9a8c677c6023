//! # Counters
//!
//! Monotonic identifier allocation backed by plain ledger cells. A counter is
//! a key holding a decimal ASCII integer. [`next`] reads it, adds one, writes
//! it back, and returns the new value.
//!
//! There is no locking here. Two concurrent allocations are kept apart by
//! the transaction isolation of the store running them. Burned values (an
//! allocation whose transaction later fails) are never handed out again on
//! a durable ledger, because the failed transaction's write is simply lost
//! along with everything else it did.

use thiserror::Error;

use crate::storage::{Ledger, LedgerError};

/// Errors raised by counter operations.
#[derive(Debug, Error)]
pub enum CounterError {
    /// The counter was never seeded.
    #[error("counter {0} is not initialized")]
    Missing(String),

    /// The stored value is not a non-negative integer, or would overflow.
    #[error("counter {name} holds corrupt value {value:?}")]
    Corrupt {
        /// Counter key.
        name: String,
        /// The raw stored value, lossily decoded.
        value: String,
    },

    /// The ledger failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Writes the initial value of counter `name`.
pub fn seed(ledger: &mut dyn Ledger, name: &str, value: u64) -> Result<(), CounterError> {
    ledger.put_string(name, &value.to_string())?;
    Ok(())
}

/// Seeds counter `name` with `value` unless it already exists. Returns
/// `true` if the counter was written.
pub fn seed_if_absent(
    ledger: &mut dyn Ledger,
    name: &str,
    value: u64,
) -> Result<bool, CounterError> {
    if ledger.get(name)?.is_some() {
        return Ok(false);
    }
    seed(ledger, name, value)?;
    Ok(true)
}

/// Returns the current value of counter `name` without advancing it.
pub fn current(ledger: &dyn Ledger, name: &str) -> Result<u64, CounterError> {
    let raw = ledger
        .get(name)?
        .ok_or_else(|| CounterError::Missing(name.to_string()))?;

    std::str::from_utf8(&raw)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| CounterError::Corrupt {
            name: name.to_string(),
            value: String::from_utf8_lossy(&raw).into_owned(),
        })
}

/// Advances counter `name` by one and returns the new value.
pub fn next(ledger: &mut dyn Ledger, name: &str) -> Result<u64, CounterError> {
    let current = current(ledger, name)?;
    let next = current.checked_add(1).ok_or_else(|| CounterError::Corrupt {
        name: name.to_string(),
        value: current.to_string(),
    })?;
    ledger.put_string(name, &next.to_string())?;
    Ok(next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryBackend, Transaction};

    #[test]
    fn seed_if_absent_keeps_existing_value() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        assert!(seed_if_absent(&mut tx, "cardCounter", 0).unwrap());
        next(&mut tx, "cardCounter").unwrap();

        assert!(!seed_if_absent(&mut tx, "cardCounter", 0).unwrap());
        assert_eq!(current(&tx, "cardCounter").unwrap(), 1);
    }

    #[test]
    fn next_is_strictly_increasing() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        seed(&mut tx, "cardCounter", 0).unwrap();

        let values: Vec<u64> = (0..5).map(|_| next(&mut tx, "cardCounter").unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(current(&tx, "cardCounter").unwrap(), 5);
    }

    #[test]
    fn seed_value_is_respected() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        seed(&mut tx, "accountCounter", 1000).unwrap();
        assert_eq!(next(&mut tx, "accountCounter").unwrap(), 1001);
    }

    #[test]
    fn missing_counter_rejected() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        assert!(matches!(
            next(&mut tx, "cardCounter"),
            Err(CounterError::Missing(_))
        ));
    }

    #[test]
    fn corrupt_counter_rejected() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        for bad in ["", "-1", "12a", "1.5"] {
            tx.put_string("cardCounter", bad).unwrap();
            assert!(
                matches!(next(&mut tx, "cardCounter"), Err(CounterError::Corrupt { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn overflow_is_corruption() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        seed(&mut tx, "cardCounter", u64::MAX).unwrap();
        assert!(matches!(
            next(&mut tx, "cardCounter"),
            Err(CounterError::Corrupt { .. })
        ));
    }

    #[test]
    fn failed_next_leaves_value_untouched() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::new(&backend);
        tx.put_string("cardCounter", "oops").unwrap();
        let _ = next(&mut tx, "cardCounter");
        assert_eq!(tx.get_string("cardCounter").unwrap().as_deref(), Some("oops"));
    }
}
