//! Contract errors and their classification.
//!
//! Every failure of a contract invocation is a [`ContractError`]. Callers
//! mostly care about its [`ErrorKind`], which decides the response status
//! and whether the caller can fix the problem by changing the request.

use thiserror::Error;

use transit_protocol::config::{
    STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, STATUS_NOT_FOUND, STATUS_UNAUTHORIZED,
};
use transit_protocol::counter::CounterError;
use transit_protocol::identity::IdentityError;
use transit_protocol::storage::{KeyError, LedgerError};

/// Errors that can occur during a contract invocation.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The function name is not one the module understands.
    #[error("invalid invoke function name {function:?} for module {module}")]
    UnknownFunction {
        /// Module that received the invocation.
        module: &'static str,
        /// The function name the caller asked for.
        function: String,
    },

    /// Wrong number of arguments for the function.
    #[error("incorrect number of arguments for {function}: expected {expected}, got {got}")]
    Arity {
        /// The function invoked.
        function: &'static str,
        /// Arguments the function takes.
        expected: usize,
        /// Arguments supplied.
        got: usize,
    },

    /// An argument is present but unusable.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// An argument cannot be encoded into a composite key.
    #[error("invalid key attribute: {0}")]
    Key(#[from] KeyError),

    /// The queried entity has no ledger entry.
    #[error("entity not found: {0}")]
    NotFound(String),

    /// The caller's credential could not be resolved.
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] IdentityError),

    /// The ledger failed.
    #[error("ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    /// A counter is missing or corrupt.
    #[error("counter failure: {0}")]
    Counter(CounterError),

    /// A stored value cannot be interpreted.
    #[error("corrupt ledger value under {key}: {value:?}")]
    CorruptState {
        /// Key holding the value (rendered for humans).
        key: String,
        /// The raw value.
        value: String,
    },
}

impl From<CounterError> for ContractError {
    fn from(err: CounterError) -> Self {
        match err {
            CounterError::Ledger(e) => ContractError::Ledger(e),
            other => ContractError::Counter(other),
        }
    }
}

/// Coarse classification of a [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong. Fixable by the caller.
    Client,
    /// The request was fine but names an entity with no entry.
    NotFound,
    /// The ledger failed or holds state the contract cannot read.
    LedgerFailure,
    /// The caller's identity could not be established.
    InvalidCredential,
}

impl ContractError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::UnknownFunction { .. }
            | ContractError::Arity { .. }
            | ContractError::InvalidArgument { .. }
            | ContractError::Key(_) => ErrorKind::Client,
            ContractError::NotFound(_) => ErrorKind::NotFound,
            ContractError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            ContractError::Ledger(_)
            | ContractError::Counter(_)
            | ContractError::CorruptState { .. } => ErrorKind::LedgerFailure,
        }
    }

    /// Response status for this error.
    pub fn status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Client => STATUS_BAD_REQUEST,
            ErrorKind::NotFound => STATUS_NOT_FOUND,
            ErrorKind::InvalidCredential => STATUS_UNAUTHORIZED,
            ErrorKind::LedgerFailure => STATUS_INTERNAL_ERROR,
        }
    }
}
