//! # Ledger Constants
//!
//! Every well-known key, seed value, event name, and status code used by the
//! transit contracts lives here. These values are part of the persisted state
//! layout: renaming a counter or namespace after deployment orphans whatever
//! the ledger already holds under the old name.

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// Composite-key namespace shared by the card views of all three modules.
///
/// The issuance, payment, and travel modules each store cards under this
/// namespace with a different attribute arity. They must therefore run
/// against separate ledgers, see [`MODULE_ISSUE`] and friends.
pub const CARD_NAMESPACE: &str = "Card";

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Counter that allocates card identifiers.
pub const CARD_COUNTER: &str = "cardCounter";

/// Counter that allocates account identifiers.
pub const ACCOUNT_COUNTER: &str = "accountCounter";

/// Seed written to [`CARD_COUNTER`] at deployment. The first card is `1`.
pub const CARD_COUNTER_SEED: u64 = 0;

/// Seed written to [`ACCOUNT_COUNTER`] at deployment. The first account is `1001`.
pub const ACCOUNT_COUNTER_SEED: u64 = 1000;

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Event announcing the NS share of a completed journey.
pub const NS_PAY_EVENT: &str = "nsPay";

/// Event announcing the Veolia share of a completed journey.
pub const VEOLIA_PAY_EVENT: &str = "veoliaPay";

/// Location code for Amsterdam, as presented by gate readers.
pub const AMSTERDAM: &str = "amsterdam";

/// Location code for Rotterdam, as presented by gate readers.
pub const ROTTERDAM: &str = "rotterdam";

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// Ledger partition of the card issuance module.
pub const MODULE_ISSUE: &str = "issue";

/// Ledger partition of the payment module.
pub const MODULE_PAYMENT: &str = "payment";

/// Ledger partition of the travel module.
pub const MODULE_TRAVEL: &str = "travel";

/// All module partitions, in initialization order.
pub const MODULES: [&str; 3] = [MODULE_ISSUE, MODULE_PAYMENT, MODULE_TRAVEL];

// ---------------------------------------------------------------------------
// Response Status Codes
// ---------------------------------------------------------------------------

/// Invocation committed.
pub const STATUS_OK: u16 = 200;

/// Malformed invocation: unknown function, wrong arity, bad argument.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// The caller's credential could not be resolved to an identity.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// The queried entity has no ledger entry.
pub const STATUS_NOT_FOUND: u16 = 404;

/// The ledger failed or holds state the contract cannot interpret.
pub const STATUS_INTERNAL_ERROR: u16 = 500;
