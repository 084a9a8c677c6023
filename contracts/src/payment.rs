//! # Payment Contract
//!
//! Keeps a running balance per (card, counterparty) pair:
//!
//! ```text
//! Card/<cardNumber>/<counterpartyId>  →  <balance>
//! ```
//!
//! A payment request **adds** its amount to the pair's balance; it never
//! replaces it. The first request for a pair starts from zero. Balances of
//! different pairs never interact, whatever order the requests arrive in.

use tracing::info;

use transit_protocol::config::{CARD_NAMESPACE, MODULE_PAYMENT};
use transit_protocol::identity::CallerIdentity;
use transit_protocol::storage::key;
use transit_protocol::storage::Ledger;

use crate::dispatch::{expect_args, Contract};
use crate::error::ContractError;

/// Operations of the payment module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOperation {
    /// `request(cardNumber, counterpartyId, amount)`.
    Request {
        /// Card number.
        card_number: String,
        /// Company the amount is owed to.
        counterparty: String,
        /// Signed amount to add.
        amount: i64,
    },
    /// `query(cardNumber, counterpartyId)`.
    Query {
        /// Card number.
        card_number: String,
        /// Company the balance is owed to.
        counterparty: String,
    },
}

/// The payment contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentContract;

impl PaymentContract {
    /// Creates the contract.
    pub fn new() -> Self {
        Self
    }

    /// Adds `amount` to the balance of `(card_number, counterparty)` and
    /// returns the new balance.
    ///
    /// # Errors
    ///
    /// [`ContractError::InvalidArgument`] if the sum overflows,
    /// [`ContractError::CorruptState`] if the stored balance is unreadable.
    pub fn request(
        &self,
        ledger: &mut dyn Ledger,
        card_number: &str,
        counterparty: &str,
        amount: i64,
    ) -> Result<i64, ContractError> {
        let balance_key = key::encode(CARD_NAMESPACE, &[card_number, counterparty])?;

        let previous = match ledger.get_string(&balance_key)? {
            Some(raw) => raw.parse::<i64>().map_err(|_| ContractError::CorruptState {
                key: key::display(&balance_key),
                value: raw,
            })?,
            None => 0,
        };

        let balance = previous
            .checked_add(amount)
            .ok_or_else(|| ContractError::InvalidArgument {
                name: "amount",
                reason: format!("adding {amount} to balance {previous} overflows"),
            })?;

        ledger.put_string(&balance_key, &balance.to_string())?;
        info!(card = card_number, counterparty, amount, balance, "payment requested");
        Ok(balance)
    }

    /// Returns the stored balance of `(card_number, counterparty)` as written.
    ///
    /// # Errors
    ///
    /// [`ContractError::NotFound`] if no request was ever made for the pair.
    pub fn query(
        &self,
        ledger: &dyn Ledger,
        card_number: &str,
        counterparty: &str,
    ) -> Result<String, ContractError> {
        let balance_key = key::encode(CARD_NAMESPACE, &[card_number, counterparty])?;
        ledger
            .get_string(&balance_key)?
            .ok_or_else(|| ContractError::NotFound(key::display(&balance_key)))
    }
}

/// Parses a decimal signed amount.
pub fn parse_amount(raw: &str) -> Result<i64, ContractError> {
    raw.parse::<i64>().map_err(|e| ContractError::InvalidArgument {
        name: "amount",
        reason: format!("{raw:?} is not an integer: {e}"),
    })
}

impl Contract for PaymentContract {
    type Operation = PaymentOperation;

    const MODULE: &'static str = MODULE_PAYMENT;

    fn parse(function: &str, args: &[String]) -> Result<Self::Operation, ContractError> {
        match function {
            "request" => {
                let [card_number, counterparty, amount] = expect_args::<3>("request", args)?;
                Ok(PaymentOperation::Request {
                    card_number: card_number.to_string(),
                    counterparty: counterparty.to_string(),
                    amount: parse_amount(amount)?,
                })
            }
            "query" => {
                let [card_number, counterparty] = expect_args::<2>("query", args)?;
                Ok(PaymentOperation::Query {
                    card_number: card_number.to_string(),
                    counterparty: counterparty.to_string(),
                })
            }
            other => Err(ContractError::UnknownFunction {
                module: Self::MODULE,
                function: other.to_string(),
            }),
        }
    }

    fn execute(
        &self,
        ledger: &mut dyn Ledger,
        _caller: &CallerIdentity,
        operation: Self::Operation,
    ) -> Result<Vec<u8>, ContractError> {
        match operation {
            PaymentOperation::Request {
                card_number,
                counterparty,
                amount,
            } => {
                let balance = self.request(ledger, &card_number, &counterparty, amount)?;
                Ok(balance.to_string().into_bytes())
            }
            PaymentOperation::Query {
                card_number,
                counterparty,
            } => Ok(self.query(ledger, &card_number, &counterparty)?.into_bytes()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
