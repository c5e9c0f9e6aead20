//! Defines the transaction store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, params_from_iter, types::Type, types::Value};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::TransactionId,
    pagination::{SortField, SortOrder, SortSpec},
    timestamp::{self, from_unix_millis, to_unix_millis},
    transaction::{NewTransaction, PaymentStatus, Transaction},
};

/// Handles the persistence of transactions.
///
/// Each method is a single operation on a single document, so implementers
/// only need to provide per-document atomicity. Methods that address a
/// transaction by ID return `Ok(None)` when no such transaction exists.
pub trait TransactionStore: Send + Sync {
    /// Store a new transaction, assigning its ID and timestamps.
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction by its ID.
    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, Error>;

    /// Replace every user-editable field of a transaction.
    ///
    /// The creation time is kept and the update time is refreshed.
    fn replace(
        &self,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<Option<Transaction>, Error>;

    /// Remove a transaction, returning the removed transaction.
    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, Error>;

    /// Retrieve a page of transactions in the way defined by `query`.
    fn query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Count the transactions that match `filter`, ignoring pagination.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;
}

/// Selects which transactions a query applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only include transactions whose type is exactly this value.
    ///
    /// The value is matched as-is, so a value that is not a valid type
    /// matches nothing.
    pub transaction_type: Option<String>,
}

impl TransactionFilter {
    /// Build a filter from the raw `type` query parameter, treating an empty
    /// value the same as a missing one.
    pub fn from_type_param(type_param: Option<&str>) -> Self {
        Self {
            transaction_type: type_param
                .filter(|value| !value.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Defines how transactions should be fetched from [TransactionStore::query].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Which transactions to include.
    pub filter: TransactionFilter,
    /// The order to return transactions in.
    pub sort: SortSpec,
    /// The number of matching transactions to skip.
    pub skip: u64,
    /// The maximum number of transactions to return.
    pub limit: u64,
}

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

const COLUMNS: &str =
    "id, name, description, category, amount, date, paid, \"type\", created_at, updated_at";

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The transaction table must already exist, see
    /// [initialize](crate::db::initialize).
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn insert(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let now = to_unix_millis(timestamp::now());
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\"
                    (name, description, category, amount, date, paid, \"type\", created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    transaction.name(),
                    transaction.description(),
                    transaction.category(),
                    transaction.amount(),
                    to_unix_millis(transaction.date()),
                    transaction.paid(),
                    transaction.transaction_type(),
                    now,
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn get(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {COLUMNS} FROM \"transaction\" WHERE id = :id"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)
            .optional()?;

        Ok(transaction)
    }

    fn replace(
        &self,
        id: TransactionId,
        transaction: NewTransaction,
    ) -> Result<Option<Transaction>, Error> {
        let now = to_unix_millis(timestamp::now());
        let connection = self.lock()?;

        let transaction = connection
            .prepare(&format!(
                "UPDATE \"transaction\"
                 SET name = ?1, description = ?2, category = ?3, amount = ?4, date = ?5,
                     paid = ?6, \"type\" = ?7, updated_at = ?8
                 WHERE id = ?9
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    transaction.name(),
                    transaction.description(),
                    transaction.category(),
                    transaction.amount(),
                    to_unix_millis(transaction.date()),
                    transaction.paid(),
                    transaction.transaction_type(),
                    now,
                    id,
                ),
                map_transaction_row,
            )
            .optional()?;

        Ok(transaction)
    }

    fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "DELETE FROM \"transaction\" WHERE id = :id RETURNING {COLUMNS}"
            ))?
            .query_row(&[(":id", &id)], map_transaction_row)
            .optional()?;

        Ok(transaction)
    }

    fn query(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM \"transaction\"")];
        let mut query_parameters = vec![];

        if let Some(transaction_type) = &query.filter.transaction_type {
            query_string_parts.push(format!("WHERE \"type\" = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(transaction_type.clone()));
        }

        let direction = match query.sort.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        query_string_parts.push(format!(
            "ORDER BY {} {direction}, id {direction}",
            sort_column(query.sort.field)
        ));

        query_string_parts.push(format!(
            "LIMIT ?{} OFFSET ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2
        ));
        query_parameters.push(Value::Integer(clamp_to_i64(query.limit)));
        query_parameters.push(Value::Integer(clamp_to_i64(query.skip)));

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.lock()?
            .prepare(&query_string)?
            .query_map(params, map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error> {
        let connection = self.lock()?;

        let count: i64 = match &filter.transaction_type {
            Some(transaction_type) => connection.query_row(
                "SELECT COUNT(id) FROM \"transaction\" WHERE \"type\" = ?1",
                [transaction_type],
                |row| row.get(0),
            )?,
            None => connection.query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| {
                row.get(0)
            })?,
        };

        Ok(count.max(0) as u64)
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                date INTEGER NOT NULL,
                paid INTEGER NOT NULL DEFAULT 0,
                \"type\" TEXT NOT NULL CHECK (\"type\" IN ('income', 'expense')),
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
                )",
        (),
    )?;

    // Used by the default list ordering and the type filter.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_type_created_at
         ON \"transaction\"(\"type\", created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the order they are listed in the
/// transaction table.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let name = row.get(1)?;
    let description = row.get(2)?;
    let category = row.get(3)?;
    let amount = row.get(4)?;
    let date = get_timestamp(row, 5)?;
    let paid = row.get(6)?;
    let transaction_type = row.get(7)?;
    let created_at = get_timestamp(row, 8)?;
    let updated_at = get_timestamp(row, 9)?;

    Ok(Transaction {
        id,
        name,
        description,
        category,
        amount,
        date,
        paid,
        status: PaymentStatus::from(paid),
        transaction_type,
        created_at,
        updated_at,
    })
}

fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let millis: i64 = row.get(index)?;

    from_unix_millis(millis).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "id",
        SortField::Name => "name",
        SortField::Description => "description",
        SortField::Category => "category",
        SortField::Amount => "amount",
        SortField::Date => "date",
        SortField::Paid => "paid",
        SortField::Type => "\"type\"",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
