//! # Invocation Dispatch
//!
//! Turns a raw invocation (creator credential, function name, string
//! arguments) into a typed operation, runs it as one ledger transaction, and
//! folds the outcome into a status-coded [`Response`].
//!
//! ```text
//! creator bytes ──► resolve_caller ──► CallerIdentity
//! function, args ──► Contract::parse ──► Operation
//!                         │
//!                         ▼
//!          LedgerStore::transact(Contract::execute)
//!                         │
//!                         ▼
//!            Response { status, message, payload, events }
//! ```
//!
//! Each module declares its operations as a closed enum; [`Contract::parse`]
//! is the one place a function name is matched, and it checks arity there
//! too. An unknown name is a client error, never a fault.

use tracing::{debug, warn};

use transit_protocol::config::STATUS_OK;
use transit_protocol::identity::{resolve_caller, CallerIdentity};
use transit_protocol::storage::{Ledger, LedgerEvent, LedgerStore, Receipt, StateBackend};

use crate::error::ContractError;

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// A ledger module with a closed set of named operations.
pub trait Contract {
    /// Parsed, typed form of one invocation.
    type Operation: std::fmt::Debug;

    /// Module name, used in logs and error messages.
    const MODULE: &'static str;

    /// Parses a function name and its arguments.
    fn parse(function: &str, args: &[String]) -> Result<Self::Operation, ContractError>;

    /// Runs once at deployment. Does nothing unless overridden.
    fn init(&self, _ledger: &mut dyn Ledger) -> Result<(), ContractError> {
        Ok(())
    }

    /// Executes a parsed operation and returns the response payload.
    fn execute(
        &self,
        ledger: &mut dyn Ledger,
        caller: &CallerIdentity,
        operation: Self::Operation,
    ) -> Result<Vec<u8>, ContractError>;
}

/// Checks that `args` holds exactly `N` arguments and borrows them.
pub fn expect_args<'a, const N: usize>(
    function: &'static str,
    args: &'a [String],
) -> Result<[&'a str; N], ContractError> {
    if args.len() != N {
        return Err(ContractError::Arity {
            function,
            expected: N,
            got: args.len(),
        });
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Status-coded result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// 200 on success, otherwise the error's status.
    pub status: u16,
    /// Empty on success, otherwise the error message.
    pub message: String,
    /// Operation result; empty on error.
    pub payload: Vec<u8>,
    /// Events released by the committed transaction.
    pub events: Vec<LedgerEvent>,
}

impl Response {
    /// A successful response.
    pub fn success(payload: Vec<u8>, events: Vec<LedgerEvent>) -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            payload,
            events,
        }
    }

    /// `true` if the invocation committed.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

impl From<&ContractError> for Response {
    fn from(err: &ContractError) -> Self {
        Self {
            status: err.status(),
            message: err.to_string(),
            payload: Vec::new(),
            events: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ContractHost
// ---------------------------------------------------------------------------

/// Binds a contract to the ledger of its module.
pub struct ContractHost<C: Contract, B: StateBackend> {
    contract: C,
    store: LedgerStore<B>,
}

impl<C: Contract, B: StateBackend> ContractHost<C, B> {
    /// Hosts `contract` over `backend`.
    pub fn new(contract: C, backend: B) -> Self {
        Self {
            contract,
            store: LedgerStore::new(backend),
        }
    }

    /// The hosted contract.
    pub fn contract(&self) -> &C {
        &self.contract
    }

    /// The module's transactional store.
    pub fn store(&self) -> &LedgerStore<B> {
        &self.store
    }

    /// Runs the deployment hook.
    pub fn init(&self) -> Response {
        debug!(module = C::MODULE, "init");
        self.respond(
            self.store
                .transact(|ledger| self.contract.init(ledger).map(|()| Vec::new())),
        )
    }

    /// Full invocation path: resolve the creator, parse, execute.
    pub fn invoke(&self, creator: &[u8], function: &str, args: &[String]) -> Response {
        match resolve_caller(creator) {
            Ok(caller) => self.invoke_as(&caller, function, args),
            Err(e) => {
                let err = ContractError::from(e);
                warn!(module = C::MODULE, function, error = %err, "caller rejected");
                Response::from(&err)
            }
        }
    }

    /// Invocation path for an already resolved caller.
    pub fn invoke_as(&self, caller: &CallerIdentity, function: &str, args: &[String]) -> Response {
        debug!(module = C::MODULE, function, "transaction creator {caller}");

        let operation = match C::parse(function, args) {
            Ok(op) => op,
            Err(err) => {
                warn!(module = C::MODULE, function, error = %err, "invocation rejected");
                return Response::from(&err);
            }
        };
        debug!(module = C::MODULE, ?operation, "dispatching");

        self.respond(
            self.store
                .transact(|ledger| self.contract.execute(ledger, caller, operation)),
        )
    }

    fn respond(&self, outcome: Result<Receipt<Vec<u8>>, ContractError>) -> Response {
        match outcome {
            Ok(receipt) => Response::success(receipt.value, receipt.events),
            Err(err) => {
                warn!(module = C::MODULE, status = err.status(), error = %err, "invocation failed");
                Response::from(&err)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
