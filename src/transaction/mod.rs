//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its categories and the derived transaction type
//! - Validation of the payloads clients send to create or replace transactions
//! - The store trait and its SQLite implementation
//! - The service that the route handlers go through
//! - The JSON route handlers

mod core;
mod create_endpoint;
mod delete_endpoint;
mod get_endpoint;
mod list_endpoint;
mod response;
mod service;
mod store;
mod update_endpoint;
mod validation;

pub use core::{
    Category, ParseCategoryError, ParseTransactionTypeError, PaymentStatus, Transaction,
    TransactionType,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use response::{MessageResponse, TransactionListResponse, TransactionResponse};
pub use service::TransactionService;
pub use store::{
    SQLiteTransactionStore, TransactionFilter, TransactionQuery, TransactionStore,
    create_transaction_table,
};
pub use update_endpoint::update_transaction_endpoint;
pub use validation::{
    FieldError, NewTransaction, TransactionPayload, ValidationError, validate_transaction,
};
