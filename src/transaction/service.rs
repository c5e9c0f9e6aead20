//! The transaction service: the only code that talks to the transaction store.

use std::sync::Arc;

use crate::{
    Error,
    database_id::TransactionId,
    error::Action,
    pagination::{ListEnvelope, ListQuery, build_list_envelope},
    timestamp,
    transaction::{
        Transaction, TransactionFilter, TransactionPayload, TransactionQuery, TransactionStore,
        validate_transaction,
    },
};

/// Creates, reads, replaces and deletes transactions.
///
/// Every failure, including a payload that fails validation, is reported as
/// an [Error::Persistence] naming the operation that failed. A transaction
/// that does not exist is not an error, it is reported as `Ok(None)`.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
}

impl TransactionService {
    /// Create a service that persists transactions in `store`.
    pub fn new(store: impl TransactionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Validate `payload` and store it as a new transaction.
    pub fn create(&self, payload: TransactionPayload) -> Result<Transaction, Error> {
        let transaction = validate_transaction(payload, timestamp::now())
            .map_err(|error| Error::persistence(Action::Add, error))?;

        self.store
            .insert(transaction)
            .map_err(|error| Error::persistence(Action::Add, error))
    }

    /// Retrieve the transaction with the given `id`.
    pub fn get_by_id(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        self.store
            .get(id)
            .map_err(|error| Error::persistence(Action::Fetch, error))
    }

    /// Replace the transaction `id` with `payload`.
    ///
    /// The payload is validated the same way as for [TransactionService::create]
    /// and the transaction type is derived again from the category.
    pub fn update(
        &self,
        id: TransactionId,
        payload: TransactionPayload,
    ) -> Result<Option<Transaction>, Error> {
        let transaction = validate_transaction(payload, timestamp::now())
            .map_err(|error| Error::persistence(Action::Update, error))?;

        self.store
            .replace(id, transaction)
            .map_err(|error| Error::persistence(Action::Update, error))
    }

    /// Delete the transaction `id`, returning it so the caller can confirm
    /// what was removed.
    pub fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        self.store
            .delete(id)
            .map_err(|error| Error::persistence(Action::Delete, error))
    }

    /// Retrieve one page of the transactions matching `filter`.
    pub fn list(
        &self,
        filter: TransactionFilter,
        query: ListQuery,
    ) -> Result<ListEnvelope<Transaction>, Error> {
        let fetch_all = |error: Error| Error::persistence(Action::FetchAll, error);

        let total = self.store.count(&filter).map_err(fetch_all)?;
        let items = self
            .store
            .query(&TransactionQuery {
                filter,
                sort: query.sort,
                skip: query.skip,
                limit: query.limit,
            })
            .map_err(fetch_all)?;

        Ok(build_list_envelope(total, items, query.page, query.limit))
    }
}
