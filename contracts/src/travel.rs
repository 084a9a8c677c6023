//! # Travel Contract
//!
//! Tracks journeys. Every card is in one of two states:
//!
//! ```text
//!              swipe(location)
//!   CheckedOut ───────────────► CheckedIn(origin = location)
//!       ▲                              │
//!       └──────────────────────────────┘
//!        swipe(destination): settle the fare split, emit events
//! ```
//!
//! The state is persisted as the presence of `Card/<cardNumber>`: absent
//! means checked out, present means checked in at the stored location.
//! Cards are independent of each other.
//!
//! ## Settlement
//!
//! A checkout looks up `(origin, destination)` in the [`TariffTable`] and
//! emits one event per operator with a positive share: `nsPay` and
//! `veoliaPay`, payload the share as a decimal string. A journey between
//! locations the table does not cover settles nothing; the card is still
//! checked out and the gap is logged.
//!
//! ## Location
//!
//! Gate readers identify themselves by certificate, and the reader's common
//! name is the location code. The wire form of `swipe` therefore takes only
//! the card number.

use tracing::{info, warn};

use transit_protocol::config::{CARD_NAMESPACE, MODULE_TRAVEL};
use transit_protocol::identity::CallerIdentity;
use transit_protocol::storage::key;
use transit_protocol::storage::Ledger;

use crate::dispatch::{expect_args, Contract};
use crate::error::ContractError;
use crate::tariff::{FareSplit, Operator, TariffTable};

/// Journey state of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyState {
    /// Not travelling.
    CheckedOut,
    /// Travelling since checking in at `origin`.
    CheckedIn {
        /// Where the journey started.
        origin: String,
    },
}

impl JourneyState {
    /// Reads the state stored under `card_key`.
    pub fn load(ledger: &dyn Ledger, card_key: &str) -> Result<Self, ContractError> {
        Ok(match ledger.get_string(card_key)? {
            Some(origin) => JourneyState::CheckedIn { origin },
            None => JourneyState::CheckedOut,
        })
    }

    /// The check-in location, if travelling.
    pub fn location(&self) -> Option<&str> {
        match self {
            JourneyState::CheckedIn { origin } => Some(origin.as_str()),
            JourneyState::CheckedOut => None,
        }
    }
}

/// What a swipe did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// The card started a journey.
    CheckedIn {
        /// Where.
        location: String,
    },
    /// The card completed a journey.
    CheckedOut {
        /// Where the journey started.
        origin: String,
        /// Where it ended.
        destination: String,
        /// The tariff split, or `None` if no rule covered the journey.
        split: Option<FareSplit>,
    },
}

impl SwipeOutcome {
    /// Settlement owed for this swipe: empty for check-ins and unmatched
    /// journeys.
    pub fn settlements(&self) -> Vec<(Operator, u32)> {
        match self {
            SwipeOutcome::CheckedOut {
                split: Some(split), ..
            } => split.payable().collect(),
            _ => Vec::new(),
        }
    }
}

/// Operations of the travel module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelOperation {
    /// `swipe(cardNumber)` at the caller's location.
    Swipe {
        /// Card number.
        card_number: String,
    },
    /// `query(cardNumber)`: current check-in location or empty.
    Query {
        /// Card number.
        card_number: String,
    },
}

/// The travel contract.
#[derive(Debug, Clone, Default)]
pub struct TravelContract {
    tariff: TariffTable,
}

impl TravelContract {
    /// A contract settling with the standard tariff table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A contract settling with `tariff`.
    pub fn with_tariff(tariff: TariffTable) -> Self {
        Self { tariff }
    }

    /// The tariff table in use.
    pub fn tariff(&self) -> &TariffTable {
        &self.tariff
    }

    /// Checks `card_number` in or out at `location`.
    ///
    /// # Errors
    ///
    /// [`ContractError::InvalidArgument`] for an empty location, plus key
    /// and ledger errors.
    pub fn swipe(
        &self,
        ledger: &mut dyn Ledger,
        card_number: &str,
        location: &str,
    ) -> Result<SwipeOutcome, ContractError> {
        if location.is_empty() {
            return Err(ContractError::InvalidArgument {
                name: "location",
                reason: "swipe location must not be empty".to_string(),
            });
        }

        let card_key = key::encode(CARD_NAMESPACE, &[card_number])?;

        match JourneyState::load(ledger, &card_key)? {
            JourneyState::CheckedOut => {
                ledger.put_string(&card_key, location)?;
                info!(card = card_number, location, "checked in");
                Ok(SwipeOutcome::CheckedIn {
                    location: location.to_string(),
                })
            }
            JourneyState::CheckedIn { origin } => {
                let split = self.tariff.lookup(&origin, location);
                let outcome = SwipeOutcome::CheckedOut {
                    origin,
                    destination: location.to_string(),
                    split,
                };

                match split {
                    Some(split) => info!(
                        card = card_number,
                        ns = split.ns,
                        veolia = split.veolia,
                        "checked out"
                    ),
                    None => warn!(
                        card = card_number,
                        ?outcome,
                        "no tariff for journey, nothing settled"
                    ),
                }

                for (operator, share) in outcome.settlements() {
                    ledger.emit_event(operator.event_name(), share.to_string().into_bytes())?;
                    info!(card = card_number, %operator, share, "settlement announced");
                }

                ledger.delete(&card_key)?;
                Ok(outcome)
            }
        }
    }

    /// Current journey state of `card_number`. Never `NotFound`: a card with
    /// no entry is simply checked out.
    pub fn query(
        &self,
        ledger: &dyn Ledger,
        card_number: &str,
    ) -> Result<JourneyState, ContractError> {
        let card_key = key::encode(CARD_NAMESPACE, &[card_number])?;
        JourneyState::load(ledger, &card_key)
    }
}

impl Contract for TravelContract {
    type Operation = TravelOperation;

    const MODULE: &'static str = MODULE_TRAVEL;

    fn parse(function: &str, args: &[String]) -> Result<Self::Operation, ContractError> {
        match function {
            "swipe" => {
                let [card_number] = expect_args::<1>("swipe", args)?;
                Ok(TravelOperation::Swipe {
                    card_number: card_number.to_string(),
                })
            }
            "query" => {
                let [card_number] = expect_args::<1>("query", args)?;
                Ok(TravelOperation::Query {
                    card_number: card_number.to_string(),
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
        caller: &CallerIdentity,
        operation: Self::Operation,
    ) -> Result<Vec<u8>, ContractError> {
        match operation {
            TravelOperation::Swipe { card_number } => {
                self.swipe(ledger, &card_number, &caller.common_name)?;
                Ok(Vec::new())
            }
            TravelOperation::Query { card_number } => Ok(self
                .query(ledger, &card_number)?
                .location()
                .map(|l| l.as_bytes().to_vec())
                .unwrap_or_default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
