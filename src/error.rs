//! Defines the app level error type and its conversion to JSON responses.
use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::transaction::{MessageResponse, ValidationError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction payload broke one or more field constraints.
    ///
    /// The message lists every offending field.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request body could not be read as a transaction payload, e.g.
    /// because it is not JSON or a field has the wrong type.
    #[error("{0}")]
    InvalidBody(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An operation on stored transactions failed.
    ///
    /// This wraps the underlying cause, which may be a validation failure
    /// or a problem with the database, with the operation that failed.
    #[error("Server error. Could not {action}. {source}")]
    Persistence {
        /// The operation that failed.
        action: Action,
        /// Why it failed.
        source: Box<Error>,
    },
}

/// The transaction operations that can fail with [Error::Persistence].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Fetch,
    FetchAll,
    Update,
    Delete,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = match self {
            Action::Add => "add transaction",
            Action::Fetch => "fetch transaction",
            Action::FetchAll => "fetch transactions",
            Action::Update => "update transaction",
            Action::Delete => "delete transaction",
        };

        f.write_str(description)
    }
}

impl Error {
    /// Wrap `error` as the cause of a failed `action`.
    pub fn persistence(action: Action, error: impl Into<Error>) -> Self {
        Error::Persistence {
            action,
            source: Box::new(error.into()),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("An unexpected error occurred: {}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(MessageResponse::new(self.to_string())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        error::Action,
        test_utils::{parse_json_body, valid_payload},
        transaction::{MessageResponse, TransactionPayload, validate_transaction},
    };

    #[test]
    fn persistence_error_names_the_action_and_cause() {
        let error = Error::persistence(Action::Delete, Error::DatabaseLockError);

        assert_eq!(
            error.to_string(),
            "Server error. Could not delete transaction. could not acquire the database lock"
        );
    }

    #[test]
    fn validation_failures_keep_field_details() {
        let validation_error = validate_transaction(
            TransactionPayload {
                amount: Some(-1.0),
                ..valid_payload()
            },
            time::OffsetDateTime::now_utc(),
        )
        .unwrap_err();

        let error = Error::persistence(Action::Add, validation_error);

        assert_eq!(
            error.to_string(),
            "Server error. Could not add transaction. \
            Transaction validation failed: amount: Amount cannot be negative"
        );
    }

    #[tokio::test]
    async fn responds_with_500_and_message() {
        let error = Error::persistence(Action::FetchAll, Error::DatabaseLockError);
        let want_message = error.to_string();

        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: MessageResponse = parse_json_body(response).await;
        assert_eq!(body.message, want_message);
    }
}
