//! The route handler for creating a transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    error::Action,
    transaction::{
        TransactionPayload, TransactionService,
        response::{CREATE_SUCCESS_MESSAGE, transaction_response},
    },
};

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the stored transaction, or with 500 and the reason
/// the transaction could not be stored.
pub async fn create_transaction_endpoint(
    State(service): State<TransactionService>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return Error::persistence(Action::Add, Error::InvalidBody(rejection.body_text()))
                .into_response();
        }
    };

    match service.create(payload) {
        Ok(transaction) => {
            tracing::info!("Created transaction {}", transaction.id);
            transaction_response(StatusCode::CREATED, CREATE_SUCCESS_MESSAGE, transaction)
        }
        Err(error) => error.into_response(),
    }
}
