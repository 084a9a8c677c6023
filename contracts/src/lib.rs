//! # Transit Settlement Contracts
//!
//! Business logic of the transit-fare settlement scheme. Three modules, each
//! deployed against its own ledger:
//!
//! - **Issuance** — issues cards, binding each to a fresh account id.
//! - **Payment** — accumulates what a card owes each counterparty.
//! - **Travel** — checks cards in and out and announces how the fare of a
//!   completed journey splits between NS and Veolia.
//!
//! ## Design Principles
//!
//! 1. Contracts see the ledger only through `transit_protocol::storage::Ledger`
//!    and never cache state between invocations.
//! 2. Each module has a closed enum of operations; function names are matched
//!    in exactly one place.
//! 3. Journey state is an explicit enum, not a key-presence convention leaking
//!    into callers.
//! 4. All integer arithmetic on persisted values is checked.

pub mod dispatch;
pub mod error;
pub mod issuance;
pub mod payment;
pub mod tariff;
pub mod travel;

pub use dispatch::{Contract, ContractHost, Response};
pub use error::{ContractError, ErrorKind};
pub use issuance::{IssuanceContract, IssuedCard};
pub use payment::PaymentContract;
pub use tariff::{FareSplit, Operator, TariffRule, TariffTable};
pub use travel::{JourneyState, SwipeOutcome, TravelContract};
