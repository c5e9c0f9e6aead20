//! The route handler for replacing a transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    error::Action,
    transaction::{
        TransactionPayload, TransactionService,
        response::{
            UPDATE_SUCCESS_MESSAGE, not_found_response, parse_transaction_id, transaction_response,
        },
    },
};

/// A route handler for replacing every editable field of a transaction.
///
/// The payload is validated like a new transaction, so it must be complete.
pub async fn update_transaction_endpoint(
    State(service): State<TransactionService>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response {
    let Some(transaction_id) = parse_transaction_id(&transaction_id) else {
        return not_found_response();
    };

    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return Error::persistence(Action::Update, Error::InvalidBody(rejection.body_text()))
                .into_response();
        }
    };

    match service.update(transaction_id, payload) {
        Ok(Some(transaction)) => {
            tracing::info!("Updated transaction {}", transaction.id);
            transaction_response(StatusCode::OK, UPDATE_SUCCESS_MESSAGE, transaction)
        }
        Ok(None) => not_found_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        build_router,
        endpoints::{self, format_endpoint},
        test_utils::{get_test_app_state, valid_payload},
        transaction::{
            MessageResponse, TransactionPayload, TransactionResponse, TransactionType,
        },
    };

    #[tokio::test]
    async fn replaces_transaction_and_rederives_type() {
        let state = get_test_app_state();
        let created = state.transaction_service.create(valid_payload()).unwrap();
        let server = TestServer::try_new(build_router(state)).unwrap();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, created.id))
            .json(&TransactionPayload {
                name: Some("Consulting".to_owned()),
                category: Some("Freelance".to_owned()),
                paid: Some(true),
                ..valid_payload()
            })
            .await;

        response.assert_status_ok();
        let body = response.json::<TransactionResponse>();
        assert_eq!(body.message, "Transaction updated successfully");
        assert_eq!(body.transaction.id, created.id);
        assert_eq!(body.transaction.name, "Consulting");
        assert_eq!(body.transaction.transaction_type, TransactionType::Income);
        assert!(body.transaction.paid);
        assert_eq!(body.transaction.created_at, created.created_at);
    }

    #[tokio::test]
    async fn missing_transaction_is_404() {
        let server = TestServer::try_new(build_router(get_test_app_state())).unwrap();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, 12))
            .json(&valid_payload())
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Transaction not found"
        );
    }

    #[tokio::test]
    async fn invalid_payload_is_500_and_leaves_transaction_unchanged() {
        let state = get_test_app_state();
        let service = state.transaction_service.clone();
        let created = service.create(valid_payload()).unwrap();
        let server = TestServer::try_new(build_router(state)).unwrap();

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, created.id))
            .json(&TransactionPayload {
                description: Some("tiny".to_owned()),
                ..valid_payload()
            })
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Server error. Could not update transaction. Transaction validation failed: \
            description: Description should be at least 5 characters long"
        );
        assert_eq!(service.get_by_id(created.id).unwrap(), Some(created));
    }
}
