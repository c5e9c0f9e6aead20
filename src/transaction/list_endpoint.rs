//! The route handler for listing transactions a page at a time.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    pagination::{ListParams, PaginationConfig, resolve_list_query},
    transaction::{TransactionFilter, TransactionListResponse, TransactionService},
};

/// A route handler for listing transactions, optionally filtered by type.
///
/// Malformed, repeated or missing query parameters fall back to their own
/// defaults rather than failing the request.
pub async fn list_transactions_endpoint(
    State(service): State<TransactionService>,
    State(pagination_config): State<PaginationConfig>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(pairs)) => ListParams::from_pairs(pairs),
        Err(rejection) => {
            tracing::debug!("Ignoring malformed query string: {rejection}");
            ListParams::default()
        }
    };

    let list_query = resolve_list_query(&params, &pagination_config);
    let filter = TransactionFilter::from_type_param(params.transaction_type.as_deref());

    match service.list(filter, list_query) {
        Ok(envelope) => (
            StatusCode::OK,
            Json(TransactionListResponse::from(envelope)),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
