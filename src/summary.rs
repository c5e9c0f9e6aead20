//! Totals, search and paging over transactions that have already been
//! fetched, for building dashboards and list views.

use time::Month;

use crate::transaction::{Transaction, TransactionType};

/// The transactions whose name, description or category contains `query`,
/// ignoring case.
///
/// The query is matched as given, so surrounding spaces must appear in the
/// text. An empty query matches every transaction.
pub fn search<'a>(transactions: &'a [Transaction], query: &str) -> Vec<&'a Transaction> {
    let query = query.to_lowercase();

    transactions
        .iter()
        .filter(|transaction| {
            query.is_empty()
                || transaction.name.to_lowercase().contains(&query)
                || transaction.description.to_lowercase().contains(&query)
                || transaction
                    .category
                    .as_str()
                    .to_lowercase()
                    .contains(&query)
        })
        .collect()
}

/// The sums of a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// The sum of the income transactions.
    pub income: f64,
    /// The sum of the expense transactions.
    pub expenses: f64,
    /// Income plus expenses.
    pub total: f64,
}

impl Totals {
    /// Sum `transactions` by type.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income, expenses) =
            transactions
                .into_iter()
                .fold((0.0, 0.0), |(income, expenses), transaction| {
                    match transaction.transaction_type {
                        TransactionType::Income => (income + transaction.amount, expenses),
                        TransactionType::Expense => (income, expenses + transaction.amount),
                    }
                });

        Self {
            income,
            expenses,
            total: income + expenses,
        }
    }
}

/// The income and expenses for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotals {
    pub month: Month,
    pub income: f64,
    pub expenses: f64,
}

/// Sum the transactions dated in `year` by month.
///
/// Always returns twelve entries, January first, including months without
/// any transactions.
pub fn monthly_totals(transactions: &[Transaction], year: i32) -> Vec<MonthlyTotals> {
    let mut month = Month::January;
    let mut buckets = Vec::with_capacity(12);
    for _ in 0..12 {
        buckets.push(MonthlyTotals {
            month,
            income: 0.0,
            expenses: 0.0,
        });
        month = month.next();
    }

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.date.year() == year)
    {
        let bucket = &mut buckets[usize::from(u8::from(transaction.date.month())) - 1];
        match transaction.transaction_type {
            TransactionType::Income => bucket.income += transaction.amount,
            TransactionType::Expense => bucket.expenses += transaction.amount,
        }
    }

    buckets
}

/// The items on the 1-based `page` when showing `per_page` items per page.
///
/// A page past the end, page zero or zero items per page gives an empty slice.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());

    &items[start..end]
}
