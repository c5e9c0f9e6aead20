//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    pagination::PaginationConfig,
    transaction::{SQLiteTransactionStore, TransactionService},
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The service that handlers use to read and write transactions.
    pub transaction_service: TransactionService,

    /// The config that controls the default page and page size of lists.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] from an already constructed service.
    pub fn new(transaction_service: TransactionService, pagination_config: PaginationConfig) -> Self {
        Self {
            transaction_service,
            pagination_config,
        }
    }

    /// Create a new [AppState] backed by a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn from_connection(
        db_connection: Connection,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let store = SQLiteTransactionStore::new(connection);

        Ok(Self::new(TransactionService::new(store), pagination_config))
    }
}

impl FromRef<AppState> for TransactionService {
    fn from_ref(state: &AppState) -> Self {
        state.transaction_service.clone()
    }
}

impl FromRef<AppState> for PaginationConfig {
    fn from_ref(state: &AppState) -> Self {
        state.pagination_config.clone()
    }
}
