//! The route handler for deleting a transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::transaction::{
    TransactionService,
    response::{
        DELETE_SUCCESS_MESSAGE, not_found_response, parse_transaction_id, transaction_response,
    },
};

/// A route handler for deleting a transaction, responds with the deleted
/// transaction on success.
pub async fn delete_transaction_endpoint(
    State(service): State<TransactionService>,
    Path(transaction_id): Path<String>,
) -> Response {
    let Some(transaction_id) = parse_transaction_id(&transaction_id) else {
        return not_found_response();
    };

    match service.delete(transaction_id) {
        Ok(Some(transaction)) => {
            tracing::info!("Deleted transaction {}", transaction.id);
            transaction_response(StatusCode::OK, DELETE_SUCCESS_MESSAGE, transaction)
        }
        Ok(None) => not_found_response(),
        Err(error) => error.into_response(),
    }
}
