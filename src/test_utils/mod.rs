#![allow(missing_docs)]

pub(crate) mod http;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    db::initialize,
    pagination::PaginationConfig,
    timestamp,
    transaction::{
        NewTransaction, SQLiteTransactionStore, Transaction, TransactionFilter, TransactionPayload,
        TransactionQuery, TransactionService, TransactionStore, validate_transaction,
    },
};

pub(crate) use http::parse_json_body;

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize test database");

    connection
}

pub(crate) fn get_test_store() -> SQLiteTransactionStore {
    SQLiteTransactionStore::new(Arc::new(Mutex::new(get_test_connection())))
}

pub(crate) fn get_test_service() -> TransactionService {
    TransactionService::new(get_test_store())
}

pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(get_test_service(), PaginationConfig::default())
}

/// App state whose storage fails every operation.
pub(crate) fn get_failing_app_state() -> AppState {
    AppState::new(
        TransactionService::new(FailingStore),
        PaginationConfig::default(),
    )
}

/// A payload that passes validation.
pub(crate) fn valid_payload() -> TransactionPayload {
    TransactionPayload {
        name: Some("Groceries".to_owned()),
        description: Some("Weekly shop at the market".to_owned()),
        category: Some("Food".to_owned()),
        amount: Some(42.5),
        ..Default::default()
    }
}

#[track_caller]
pub(crate) fn new_transaction(category: &str) -> NewTransaction {
    new_transaction_with(|payload| payload.category = Some(category.to_owned()))
}

/// Validate [valid_payload] after applying `modify` to it.
#[track_caller]
pub(crate) fn new_transaction_with(modify: impl FnOnce(&mut TransactionPayload)) -> NewTransaction {
    let mut payload = valid_payload();
    modify(&mut payload);

    validate_transaction(payload, timestamp::now()).expect("Test payload should be valid")
}

/// A store where every operation fails as if the database lock was poisoned.
pub(crate) struct FailingStore;

impl TransactionStore for FailingStore {
    fn insert(&self, _: NewTransaction) -> Result<Transaction, Error> {
        Err(Error::DatabaseLockError)
    }

    fn get(&self, _: TransactionId) -> Result<Option<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn replace(&self, _: TransactionId, _: NewTransaction) -> Result<Option<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn delete(&self, _: TransactionId) -> Result<Option<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn query(&self, _: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        Err(Error::DatabaseLockError)
    }

    fn count(&self, _: &TransactionFilter) -> Result<u64, Error> {
        Err(Error::DatabaseLockError)
    }
}
