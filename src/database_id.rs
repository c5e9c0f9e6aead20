//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The server-assigned identifier of a transaction.
pub type TransactionId = DatabaseId;
