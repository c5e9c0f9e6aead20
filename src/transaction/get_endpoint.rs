//! The route handler for fetching a single transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::transaction::{
    TransactionService,
    response::{
        GET_SUCCESS_MESSAGE, not_found_response, parse_transaction_id, transaction_response,
    },
};

/// A route handler for getting a transaction by its database ID.
///
/// This function will return the status code 404 if the requested resource
/// does not exist.
pub async fn get_transaction_endpoint(
    State(service): State<TransactionService>,
    Path(transaction_id): Path<String>,
) -> Response {
    let Some(transaction_id) = parse_transaction_id(&transaction_id) else {
        return not_found_response();
    };

    match service.get_by_id(transaction_id) {
        Ok(Some(transaction)) => {
            transaction_response(StatusCode::OK, GET_SUCCESS_MESSAGE, transaction)
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
        test_utils::{get_failing_app_state, get_test_app_state, valid_payload},
        transaction::{MessageResponse, TransactionResponse},
    };

    #[tokio::test]
    async fn gets_created_transaction() {
        let state = get_test_app_state();
        let created = state.transaction_service.create(valid_payload()).unwrap();
        let server = TestServer::try_new(build_router(state)).unwrap();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, created.id))
            .await;

        response.assert_status_ok();
        let body = response.json::<TransactionResponse>();
        assert_eq!(body.message, "Transaction retrieved successfully");
        assert_eq!(body.transaction, created);
    }

    #[tokio::test]
    async fn missing_transaction_is_404() {
        let server = TestServer::try_new(build_router(get_test_app_state())).unwrap();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, 404))
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Transaction not found"
        );
    }

    #[tokio::test]
    async fn non_numeric_id_is_404() {
        let server = TestServer::try_new(build_router(get_test_app_state())).unwrap();

        server
            .get(&format_endpoint(endpoints::TRANSACTION, "not-an-id"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let server = TestServer::try_new(build_router(get_failing_app_state())).unwrap();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, 1))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Server error. Could not fetch transaction. could not acquire the database lock"
        );
    }
}
