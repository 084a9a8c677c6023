//! # Identity Module
//!
//! Recovers who is calling from the raw creator credential the ledger
//! platform attaches to every invocation. The credential is a PEM-encoded
//! X.509 certificate, possibly wrapped in platform framing bytes (the
//! serialized identity carries the MSP id ahead of the PEM block).
//!
//! Two facts are extracted:
//!
//! - the subject **common name**, which for gate readers is the location
//!   code (`amsterdam`, `rotterdam`) and for back-office users the user name;
//! - the issuer **organization**, shortened to its first dot-separated
//!   label (`ns.transport-chain.nl` becomes `ns`).

pub mod certificate;

pub use certificate::{resolve_caller, CallerIdentity, IdentityError};
