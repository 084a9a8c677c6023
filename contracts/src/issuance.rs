//! # Card Issuance Contract
//!
//! Issues transit cards. Each issuance allocates a fresh card id and a fresh
//! account id from two ledger counters and binds them:
//!
//! ```text
//! Card/<cardId>  →  <accountId>
//! ```
//!
//! The account has no record of its own; its id is the whole of it.
//!
//! ## Allocation Semantics
//!
//! Both counters advance before the binding is written, inside the same
//! transaction. If anything fails, the transaction is discarded and the
//! counters stay where they were. The contract never reuses an id on its
//! own, so an id allocated by a transaction that later fails to commit is
//! simply never seen.
//!
//! Deployment seeds only counters that do not exist yet, so running `init`
//! again against a live ledger leaves allocation where it was. A card key
//! that is already bound is never overwritten.

use tracing::{info, warn};

use transit_protocol::config::{
    ACCOUNT_COUNTER, ACCOUNT_COUNTER_SEED, CARD_COUNTER, CARD_COUNTER_SEED, CARD_NAMESPACE,
    MODULE_ISSUE,
};
use transit_protocol::counter;
use transit_protocol::identity::CallerIdentity;
use transit_protocol::storage::key;
use transit_protocol::storage::Ledger;

use crate::dispatch::{expect_args, Contract};
use crate::error::ContractError;

/// A card issued by [`IssuanceContract::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCard {
    /// The new card's number.
    pub card_id: u64,
    /// The account bound to it.
    pub account_id: u64,
    /// Composite key the binding is stored under.
    pub card_key: String,
}

/// Operations of the issuance module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOperation {
    /// `create()`: issue a new card.
    Create,
    /// `query(cardNumber)`: look up the account bound to a card.
    Query {
        /// Card number as presented.
        card_number: String,
    },
}

/// The card issuance contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssuanceContract;

impl IssuanceContract {
    /// Creates the contract.
    pub fn new() -> Self {
        Self
    }

    /// Issues a new card bound to a new account.
    pub fn create(
        &self,
        ledger: &mut dyn Ledger,
        caller: &CallerIdentity,
    ) -> Result<IssuedCard, ContractError> {
        let card_id = counter::next(ledger, CARD_COUNTER)?;
        let account_id = counter::next(ledger, ACCOUNT_COUNTER)?;

        let card_key = key::encode(CARD_NAMESPACE, &[card_id.to_string()])?;
        if let Some(bound) = ledger.get_string(&card_key)? {
            return Err(ContractError::CorruptState {
                key: key::display(&card_key),
                value: bound,
            });
        }
        ledger.put_string(&card_key, &account_id.to_string())?;

        info!(card_id, account_id, issued_by = %caller, "card issued");
        Ok(IssuedCard {
            card_id,
            account_id,
            card_key,
        })
    }

    /// Returns the account id bound to `card_number`.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] if the card was never issued.
    pub fn query(&self, ledger: &dyn Ledger, card_number: &str) -> Result<String, ContractError> {
        let card_key = key::encode(CARD_NAMESPACE, &[card_number])?;
        ledger
            .get_string(&card_key)?
            .ok_or_else(|| ContractError::NotFound(key::display(&card_key)))
    }
}

impl Contract for IssuanceContract {
    type Operation = IssuanceOperation;

    const MODULE: &'static str = MODULE_ISSUE;

    fn parse(function: &str, args: &[String]) -> Result<Self::Operation, ContractError> {
        match function {
            "create" => Ok(IssuanceOperation::Create),
            "query" => {
                let [card_number] = expect_args::<1>("query", args)?;
                Ok(IssuanceOperation::Query {
                    card_number: card_number.to_string(),
                })
            }
            other => Err(ContractError::UnknownFunction {
                module: Self::MODULE,
                function: other.to_string(),
            }),
        }
    }

    /// Seeds whichever counters are missing.
    fn init(&self, ledger: &mut dyn Ledger) -> Result<(), ContractError> {
        for (name, seed) in [
            (ACCOUNT_COUNTER, ACCOUNT_COUNTER_SEED),
            (CARD_COUNTER, CARD_COUNTER_SEED),
        ] {
            if counter::seed_if_absent(ledger, name, seed)? {
                info!(counter = name, seed, "counter seeded");
            } else {
                warn!(counter = name, "counter already present, left unchanged");
            }
        }
        Ok(())
    }

    fn execute(
        &self,
        ledger: &mut dyn Ledger,
        caller: &CallerIdentity,
        operation: Self::Operation,
    ) -> Result<Vec<u8>, ContractError> {
        match operation {
            IssuanceOperation::Create => {
                let issued = self.create(ledger, caller)?;
                Ok(issued.card_key.into_bytes())
            }
            IssuanceOperation::Query { card_number } => {
                Ok(self.query(ledger, &card_number)?.into_bytes())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
