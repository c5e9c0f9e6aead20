//! Defines the core data models for transactions and the rule that classifies
//! them as income or expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::database_id::TransactionId;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are only ever created by a
/// [TransactionStore](crate::transaction::TransactionStore), which assigns the
/// ID and timestamps. The `transaction_type` is always the one derived from
/// `category`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short name for the transaction, e.g. "Groceries".
    pub name: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// What the money was spent on or earned from.
    pub category: Category,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Whether the transaction has been settled.
    pub paid: bool,
    /// The `paid` flag as shown to clients.
    pub status: PaymentStatus,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction was first stored.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last replaced.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The fixed set of categories a transaction can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Entertainment,
    Utilities,
    Transportation,
    Health,
    Other,
    Salary,
    Freelance,
    Investment,
}

impl Category {
    /// Every category in the order they are listed to users.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Entertainment,
        Category::Utilities,
        Category::Transportation,
        Category::Health,
        Category::Other,
        Category::Salary,
        Category::Freelance,
        Category::Investment,
    ];

    /// The name of the category as stored and sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Transportation => "Transportation",
            Category::Health => "Health",
            Category::Other => "Other",
            Category::Salary => "Salary",
            Category::Freelance => "Freelance",
            Category::Investment => "Investment",
        }
    }

    /// Classify the category as income or an expense.
    ///
    /// Salary, Freelance and Investment are income, everything else is an
    /// expense.
    pub fn transaction_type(self) -> TransactionType {
        match self {
            Category::Salary | Category::Freelance | Category::Investment => {
                TransactionType::Income
            }
            Category::Food
            | Category::Entertainment
            | Category::Utilities
            | Category::Transportation
            | Category::Health
            | Category::Other => TransactionType::Expense,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name one of the [Category] variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid category")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The name of the type as stored and sent over the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string was neither "income" nor "expense".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid transaction type")]
pub struct ParseTransactionTypeError(pub String);

impl FromStr for TransactionType {
    type Err = ParseTransactionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ParseTransactionTypeError(other.to_owned())),
        }
    }
}

/// The client facing view of [Transaction::paid].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Due,
}

impl From<bool> for PaymentStatus {
    fn from(paid: bool) -> Self {
        if paid {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Due
        }
    }
}

impl PaymentStatus {
    /// Parse a status as sent by a client, ignoring case.
    pub fn parse(status: &str) -> Option<Self> {
        if status.eq_ignore_ascii_case("PAID") {
            Some(PaymentStatus::Paid)
        } else if status.eq_ignore_ascii_case("DUE") {
            Some(PaymentStatus::Due)
        } else {
            None
        }
    }

    /// Whether the status means the transaction has been paid.
    pub fn is_paid(self) -> bool {
        self == PaymentStatus::Paid
    }
}

// ============================================================================
// SQL CONVERSIONS
// ============================================================================

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
