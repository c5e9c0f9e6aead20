//! The JSON bodies sent by the transaction endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{database_id::TransactionId, pagination::ListEnvelope, transaction::Transaction};

pub(crate) const LIST_SUCCESS_MESSAGE: &str = "Transactions retrieved successfully";
pub(crate) const CREATE_SUCCESS_MESSAGE: &str = "Transaction added successfully!";
pub(crate) const GET_SUCCESS_MESSAGE: &str = "Transaction retrieved successfully";
pub(crate) const UPDATE_SUCCESS_MESSAGE: &str = "Transaction updated successfully";
pub(crate) const DELETE_SUCCESS_MESSAGE: &str = "Transaction deleted successfully";
pub(crate) const NOT_FOUND_MESSAGE: &str = "Transaction not found";

/// A response that only carries a message, used for errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A response carrying a single transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub message: String,
    pub transaction: Transaction,
}

/// A response carrying one page of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub message: String,
    pub transactions: Vec<Transaction>,
    /// The number of transactions matching the filter across all pages.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl From<ListEnvelope<Transaction>> for TransactionListResponse {
    fn from(envelope: ListEnvelope<Transaction>) -> Self {
        Self {
            message: LIST_SUCCESS_MESSAGE.to_owned(),
            transactions: envelope.items,
            total: envelope.total,
            page: envelope.page,
            limit: envelope.limit,
        }
    }
}

/// Respond with `status` and the `transaction` wrapped with `message`.
pub(crate) fn transaction_response(
    status: StatusCode,
    message: &str,
    transaction: Transaction,
) -> Response {
    (
        status,
        Json(TransactionResponse {
            message: message.to_owned(),
            transaction,
        }),
    )
        .into_response()
}

/// The response for an ID that does not match a stored transaction.
pub(crate) fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new(NOT_FOUND_MESSAGE)),
    )
        .into_response()
}

/// Parse the transaction ID from a request path.
///
/// IDs are always integers, so anything else cannot refer to a transaction.
pub(crate) fn parse_transaction_id(raw_id: &str) -> Option<TransactionId> {
    raw_id.trim().parse().ok()
}
