// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transit Protocol: Ledger Plumbing
//!
//! The shared layer under the transit settlement contracts. The contracts
//! themselves (card issuance, payment accumulation, journey tracking) live
//! in `transit-contracts`; this crate gives them a ledger to run against and
//! tells them who is calling.
//!
//! ## Architecture
//!
//! - **storage** — Composite keys, the `Ledger` trait, transactional state
//!   over memory or sled, and the store that serializes invocations.
//! - **counter** — Monotonic identifier allocation in ledger cells.
//! - **identity** — Caller resolution from X.509 creator certificates.
//! - **config** — Well-known keys, seeds, event names, status codes.
//!
//! ## Concurrency Contract
//!
//! Contract code is single-threaded and lock-free. All isolation comes from
//! [`storage::LedgerStore`], which serializes transactions against the same
//! module ledger. Nothing is cached between invocations.

pub mod config;
pub mod counter;
pub mod identity;
pub mod storage;
