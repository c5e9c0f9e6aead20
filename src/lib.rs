//! A REST API for recording personal finance transactions.
//!
//! Clients create, list, fetch, replace and delete income and expense
//! transactions over JSON. Each transaction's type (income or expense) is
//! derived from its category, and transactions are stored in SQLite.
//!
//! The [client] module provides a small HTTP client for the API, and the
//! [summary] module provides totals and search over fetched transactions.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
pub mod client;
mod database_id;
mod db;
pub mod endpoints;
mod error;
mod logging;
mod pagination;
mod routing;
pub mod summary;
mod timestamp;
mod transaction;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::{Action, Error};
pub use logging::{LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_SIZE_LIMIT, logging_middleware};
pub use pagination::{
    ListEnvelope, ListParams, ListQuery, PaginationConfig, SortField, SortOrder, SortSpec,
    build_list_envelope, resolve_list_query,
};
pub use routing::build_router;
pub use transaction::{
    Category, FieldError, MessageResponse, NewTransaction, ParseCategoryError,
    ParseTransactionTypeError, PaymentStatus, SQLiteTransactionStore, Transaction,
    TransactionFilter, TransactionListResponse, TransactionPayload, TransactionQuery,
    TransactionResponse, TransactionService, TransactionStore, TransactionType, ValidationError,
    validate_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

#[cfg(test)]
mod test_utils;
