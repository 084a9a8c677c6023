//! Integration tests for the card issuance contract.
//!
//! These drive the contract through `ContractHost`, the same path a
//! deployed invocation takes: parse, transact, respond.

use transit_contracts::{Contract, ContractHost, IssuanceContract};
use transit_protocol::identity::CallerIdentity;
use transit_protocol::storage::{key, LedgerDb, MemoryBackend, StateBackend};

/// Helper: a deployed issuance module over an in-memory ledger.
fn deployed() -> ContractHost<IssuanceContract, MemoryBackend> {
    let host = ContractHost::new(IssuanceContract::new(), MemoryBackend::new());
    assert!(host.init().is_success());
    host
}

fn service() -> CallerIdentity {
    CallerIdentity::new("service", "bank")
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Lifecycle Tests
// ---------------------------------------------------------------------------

#[test]
fn init_seeds_counters() {
    let host = deployed();
    let backend = host.store().backend();
    assert_eq!(backend.read("accountCounter").unwrap(), Some(b"1000".to_vec()));
    assert_eq!(backend.read("cardCounter").unwrap(), Some(b"0".to_vec()));
}

#[test]
fn create_returns_card_key_and_query_returns_account() {
    let host = deployed();

    let created = host.invoke_as(&service(), "create", &[]);
    assert!(created.is_success(), "{}", created.message);
    let card_key = created.payload_str().unwrap().to_string();
    let (namespace, attributes) = key::split(&card_key).unwrap();
    assert_eq!(namespace, "Card");
    assert_eq!(attributes, vec!["1"]);

    let queried = host.invoke_as(&service(), "query", &args(&["1"]));
    assert!(queried.is_success());
    assert_eq!(queried.payload_str(), Some("1001"));
}

#[test]
fn successive_issuances_allocate_fresh_ids() {
    let host = deployed();
    let contract = host.contract();

    let issued: Vec<_> = (0..3)
        .map(|_| {
            host.store()
                .transact(|ledger| contract.create(ledger, &service()))
                .unwrap()
                .value
        })
        .collect();

    let cards: Vec<u64> = issued.iter().map(|c| c.card_id).collect();
    let accounts: Vec<u64> = issued.iter().map(|c| c.account_id).collect();
    assert_eq!(cards, vec![1, 2, 3]);
    assert_eq!(accounts, vec![1001, 1002, 1003]);

    for card in &issued {
        let bound = host
            .store()
            .transact(|ledger| contract.query(ledger, &card.card_id.to_string()))
            .unwrap()
            .value;
        assert_eq!(bound, card.account_id.to_string());
    }
}

#[test]
fn repeated_init_keeps_allocation_going() {
    let host = deployed();
    let first = host.invoke_as(&service(), "create", &[]);
    assert_eq!(first.payload_str(), Some("\u{0}Card\u{0}1\u{0}"));

    assert!(host.init().is_success());
    let second = host.invoke_as(&service(), "create", &[]);
    assert_eq!(second.payload_str(), Some("\u{0}Card\u{0}2\u{0}"));

    let backend = host.store().backend();
    assert_eq!(backend.read("cardCounter").unwrap(), Some(b"2".to_vec()));
    assert_eq!(backend.read("accountCounter").unwrap(), Some(b"1002".to_vec()));
    assert_eq!(
        host.invoke_as(&service(), "query", &args(&["1"])).payload_str(),
        Some("1001")
    );
}

#[test]
fn create_before_init_fails_without_writing() {
    let host = ContractHost::new(IssuanceContract::new(), MemoryBackend::new());
    let response = host.invoke_as(&service(), "create", &[]);
    assert_eq!(response.status, 500);
    assert!(host.store().backend().is_empty());
}

// ---------------------------------------------------------------------------
// Rejection Tests
// ---------------------------------------------------------------------------

#[test]
fn query_unknown_card_is_404() {
    let host = deployed();
    let response = host.invoke_as(&service(), "query", &args(&["77"]));
    assert_eq!(response.status, 404);
}

#[test]
fn query_wrong_arity_is_400() {
    let host = deployed();
    assert_eq!(host.invoke_as(&service(), "query", &[]).status, 400);
    assert_eq!(
        host.invoke_as(&service(), "query", &args(&["1", "2"])).status,
        400
    );
}

#[test]
fn unknown_function_is_400() {
    let host = deployed();
    let response = host.invoke_as(&service(), "burn", &[]);
    assert_eq!(response.status, 400);
    assert!(response.message.contains("burn"));
}

#[test]
fn unreadable_creator_is_401() {
    let host = deployed();
    let response = host.invoke(b"no certificate here", "create", &[]);
    assert_eq!(response.status, 401);
    // Nothing was allocated.
    assert_eq!(
        host.store().backend().read("cardCounter").unwrap(),
        Some(b"0".to_vec())
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn counters_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = LedgerDb::open(dir.path()).unwrap();
        let host = ContractHost::new(IssuanceContract::new(), db.backend("issue").unwrap());
        assert!(host.init().is_success());
        assert!(host.invoke_as(&service(), "create", &[]).is_success());
    }

    // Redeploying against the durable ledger must not rewind the counters.
    let db = LedgerDb::open(dir.path()).unwrap();
    let host = ContractHost::new(IssuanceContract::new(), db.backend("issue").unwrap());
    assert!(host.init().is_success());
    let second = host
        .store()
        .transact(|ledger| host.contract().create(ledger, &service()))
        .unwrap()
        .value;
    assert_eq!(second.card_id, 2);
    assert_eq!(second.account_id, 1002);
}

#[test]
fn module_name_is_issue() {
    assert_eq!(IssuanceContract::MODULE, "issue");
}
