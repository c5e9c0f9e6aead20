//! An HTTP client for the transactions API that keeps a local copy of the
//! transactions it has fetched.
//!
//! Mutations update the local copy with what the server returned rather than
//! fetching the whole list again.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    TransactionId,
    endpoints::{self, format_endpoint},
    pagination::SortOrder,
    transaction::{
        MessageResponse, Transaction, TransactionListResponse, TransactionPayload,
        TransactionResponse, TransactionType,
    },
};

/// The errors a [TransactionsClient] request may fail with.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server responded with an error status.
    ///
    /// `message` is the message from the server's JSON body, or the status
    /// text if the body was not a message.
    #[error("{message}")]
    Server {
        /// The HTTP status code of the response.
        status: u16,
        /// Why the request failed.
        message: String,
    },
}

/// The query parameters sent when fetching the list of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListOptions {
    /// Only fetch income or only fetch expenses.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    /// The maximum number of transactions to fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// The 1-based page to fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// The name of the field to sort by, e.g. "date".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Only used when `sort` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

/// A client for the transactions API.
///
/// Failed requests never clear the local transactions; they record the
/// reason in [TransactionsClient::error] and return it.
#[derive(Debug, Clone)]
pub struct TransactionsClient {
    client: Client,
    base_url: String,
    options: ListOptions,
    transactions: Vec<Transaction>,
    loading: LoadingIndicator,
    error: Option<String>,
}

/// Shows whether a [TransactionsClient] has a fetch in flight.
///
/// Clones share the same flag, so another task can watch a fetch that holds
/// the client.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator(Arc<AtomicBool>);

impl LoadingIndicator {
    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn start(&self) -> LoadingGuard {
        self.0.store(true, Ordering::Release);
        LoadingGuard(self.0.clone())
    }
}

/// Clears the loading flag when the fetch finishes or is dropped.
struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TransactionsClient {
    /// Create a client for the API served at `base_url`, e.g.
    /// "http://127.0.0.1:800", that fetches the list with `options`.
    pub fn new(base_url: impl Into<String>, options: ListOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            options,
            transactions: Vec::new(),
            loading: LoadingIndicator::default(),
            error: None,
        }
    }

    /// The transactions from the last fetch, plus any local changes since.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// A handle for watching the loading state while a fetch holds the client.
    pub fn loading_indicator(&self) -> LoadingIndicator {
        self.loading.clone()
    }

    /// The reason the last request failed, cleared by the next successful
    /// request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch the list of transactions, replacing the local transactions.
    ///
    /// On success returns the total number of matching transactions on the
    /// server, which may be more than were fetched.
    pub async fn fetch(&mut self) -> Result<u64, ClientError> {
        let loading = self.loading.start();

        let result = async {
            let response = self
                .client
                .get(self.url(endpoints::TRANSACTIONS))
                .query(&self.options)
                .send()
                .await?;

            parse_response::<TransactionListResponse>(response).await
        }
        .await;

        drop(loading);

        let list = self.record(result)?;
        self.transactions = list.transactions;

        Ok(list.total)
    }

    /// Create a transaction and append it to the local transactions.
    pub async fn add_transaction(
        &mut self,
        payload: &TransactionPayload,
    ) -> Result<Transaction, ClientError> {
        let result = async {
            let response = self
                .client
                .post(self.url(endpoints::TRANSACTIONS))
                .json(payload)
                .send()
                .await?;

            parse_response::<TransactionResponse>(response).await
        }
        .await;

        let transaction = self.record(result)?.transaction;
        self.transactions.push(transaction.clone());

        Ok(transaction)
    }

    /// Replace the transaction `id` and the local copy of it.
    pub async fn update_transaction(
        &mut self,
        id: TransactionId,
        payload: &TransactionPayload,
    ) -> Result<Transaction, ClientError> {
        let result = async {
            let response = self
                .client
                .put(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
                .json(payload)
                .send()
                .await?;

            parse_response::<TransactionResponse>(response).await
        }
        .await;

        let transaction = self.record(result)?.transaction;
        if let Some(local) = self
            .transactions
            .iter_mut()
            .find(|local| local.id == transaction.id)
        {
            *local = transaction.clone();
        }

        Ok(transaction)
    }

    /// Delete the transaction `id` and remove it from the local transactions.
    pub async fn delete_transaction(
        &mut self,
        id: TransactionId,
    ) -> Result<Transaction, ClientError> {
        let result = async {
            let response = self
                .client
                .delete(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
                .send()
                .await?;

            parse_response::<TransactionResponse>(response).await
        }
        .await;

        let transaction = self.record(result)?.transaction;
        self.transactions.retain(|local| local.id != transaction.id);

        Ok(transaction)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Keep the error message of a failed request, or clear the previous one.
    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.error = None,
            Err(error) => {
                tracing::warn!("Transactions request failed: {error}");
                self.error = Some(error.to_string());
            }
        }

        result
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<MessageResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_owned(),
    };

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, time::Duration};

    use tokio::net::TcpListener;

    use crate::{
        build_router,
        pagination::SortOrder,
        test_utils::{get_test_app_state, valid_payload},
        transaction::{TransactionPayload, TransactionType},
    };

    use super::{ClientError, ListOptions, TransactionsClient};

    async fn spawn_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(get_test_app_state());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        addr
    }

    async fn new_client(options: ListOptions) -> TransactionsClient {
        let addr = spawn_server().await;

        TransactionsClient::new(format!("http://{addr}"), options)
    }

    #[tokio::test]
    async fn add_appends_and_fetch_replaces() {
        let mut client = new_client(ListOptions::default()).await;

        let added = client.add_transaction(&valid_payload()).await.unwrap();

        assert_eq!(client.transactions(), [added.clone()]);

        let total = client.fetch().await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(client.transactions(), [added]);
        assert!(!client.is_loading());
        assert_eq!(client.error(), None);
    }

    #[tokio::test]
    async fn fetch_sends_list_options() {
        let mut client = new_client(ListOptions {
            transaction_type: Some(TransactionType::Income),
            limit: Some(2),
            sort: Some("amount".to_owned()),
            order: Some(SortOrder::Ascending),
            ..Default::default()
        })
        .await;
        for (category, amount) in [
            ("Salary", 300.0),
            ("Food", 5.0),
            ("Investment", 100.0),
            ("Freelance", 200.0),
        ] {
            client
                .add_transaction(&TransactionPayload {
                    category: Some(category.to_owned()),
                    amount: Some(amount),
                    ..valid_payload()
                })
                .await
                .unwrap();
        }

        let total = client.fetch().await.unwrap();

        assert_eq!(total, 3);
        let amounts: Vec<f64> = client.transactions().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, [100.0, 200.0]);
    }

    #[tokio::test]
    async fn update_replaces_local_copy() {
        let mut client = new_client(ListOptions::default()).await;
        let added = client.add_transaction(&valid_payload()).await.unwrap();

        let updated = client
            .update_transaction(
                added.id,
                &TransactionPayload {
                    name: Some("Farmers market".to_owned()),
                    ..valid_payload()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Farmers market");
        assert_eq!(client.transactions(), [updated]);
    }

    #[tokio::test]
    async fn delete_removes_local_copy() {
        let mut client = new_client(ListOptions::default()).await;
        let added = client.add_transaction(&valid_payload()).await.unwrap();

        client.delete_transaction(added.id).await.unwrap();

        assert!(client.transactions().is_empty());
    }

    #[tokio::test]
    async fn failure_sets_error_and_keeps_local_state() {
        let mut client = new_client(ListOptions::default()).await;
        let added = client.add_transaction(&valid_payload()).await.unwrap();

        let error = client.delete_transaction(added.id + 1).await.unwrap_err();

        assert!(matches!(error, ClientError::Server { status: 404, .. }));
        assert_eq!(client.error(), Some("Transaction not found"));
        assert_eq!(client.transactions(), [added]);
    }

    #[tokio::test]
    async fn invalid_payload_reports_server_message() {
        let mut client = new_client(ListOptions::default()).await;

        let error = client
            .add_transaction(&TransactionPayload {
                amount: Some(-10.0),
                ..valid_payload()
            })
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Server error. Could not add transaction. \
            Transaction validation failed: amount: Amount cannot be negative"
        );
        assert!(client.transactions().is_empty());
    }

    #[tokio::test]
    async fn loading_is_visible_during_fetch_and_cleared_when_abandoned() {
        // Accepts connections but never responds.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = TransactionsClient::new(format!("http://{addr}"), ListOptions::default());
        let indicator = client.loading_indicator();

        let (fetch_result, seen_loading) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(200), client.fetch()),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                indicator.is_loading()
            }
        );

        assert!(fetch_result.is_err(), "fetch should have timed out");
        assert!(seen_loading);
        assert!(!client.is_loading());
        drop(listener);
    }

    #[tokio::test]
    async fn unreachable_server_sets_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let mut client = TransactionsClient::new(format!("http://{addr}"), ListOptions::default());

        let result = client.fetch().await;

        assert!(matches!(result, Err(ClientError::Request(_))));
        assert!(client.error().is_some());
        assert!(!client.is_loading());
    }
}
