//! Validation and normalisation of transaction payloads sent by clients.
//!
//! [validate_transaction] is the only way to obtain a [NewTransaction], and it
//! is called by both the create and the full update paths, so the field
//! constraints and the derived transaction type cannot be bypassed.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    timestamp::truncate_to_millis,
    transaction::{Category, PaymentStatus, TransactionType},
};

const NAME_MIN_LENGTH: usize = 3;
const NAME_MAX_LENGTH: usize = 100;
const DESCRIPTION_MIN_LENGTH: usize = 5;
const DESCRIPTION_MAX_LENGTH: usize = 500;

/// The transaction fields a client may send when creating or replacing a
/// transaction.
///
/// Every field is optional here so that missing fields are reported as
/// validation errors rather than as a malformed request. Any `type` sent by
/// the client is ignored, the type is always derived from the category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// An RFC 3339 date-time or a `YYYY-MM-DD` date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    /// "PAID" or "DUE", only consulted when `paid` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A transaction that has passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    name: String,
    description: String,
    category: Category,
    amount: f64,
    date: OffsetDateTime,
    paid: bool,
    transaction_type: TransactionType,
}

impl NewTransaction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> OffsetDateTime {
        self.date
    }

    pub fn paid(&self) -> bool {
        self.paid
    }

    /// The type derived from the category.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The name of the offending field as sent by the client.
    pub field: &'static str,
    /// A human readable reason.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A payload failed one or more of the transaction field constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// The offending fields, in the order the fields are declared.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error message for `field`, if that field failed validation.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reasons = self
            .errors
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "Transaction validation failed: {reasons}")
    }
}

impl std::error::Error for ValidationError {}

/// Check `payload` against the transaction field constraints and normalise it.
///
/// Strings are trimmed before their lengths (in graphemes) are checked, a
/// missing date defaults to `now` and a missing paid flag defaults to unpaid.
/// The transaction type is always derived from the category.
///
/// # Errors
/// Returns a [ValidationError] listing every field that failed.
pub fn validate_transaction(
    payload: TransactionPayload,
    now: OffsetDateTime,
) -> Result<NewTransaction, ValidationError> {
    let mut errors = Vec::new();

    let name = check_text(
        &mut errors,
        "name",
        payload.name,
        TextRule {
            required: "Transaction name is required",
            min_length: NAME_MIN_LENGTH,
            too_short: "Name should be at least 3 characters long",
            max_length: NAME_MAX_LENGTH,
            too_long: "Name should not exceed 100 characters",
        },
    );

    let description = check_text(
        &mut errors,
        "description",
        payload.description,
        TextRule {
            required: "Description is required",
            min_length: DESCRIPTION_MIN_LENGTH,
            too_short: "Description should be at least 5 characters long",
            max_length: DESCRIPTION_MAX_LENGTH,
            too_long: "Description should not exceed 500 characters",
        },
    );

    let category = check_category(&mut errors, payload.category);
    let amount = check_amount(&mut errors, payload.amount);
    let date = check_date(&mut errors, payload.date, now);
    let paid = check_paid(&mut errors, payload.paid, payload.status);

    match (name, description, category, amount, date, paid) {
        (Some(name), Some(description), Some(category), Some(amount), Some(date), Some(paid))
            if errors.is_empty() =>
        {
            Ok(NewTransaction {
                name,
                description,
                category,
                amount,
                date,
                paid,
                transaction_type: category.transaction_type(),
            })
        }
        _ => Err(ValidationError { errors }),
    }
}

struct TextRule {
    required: &'static str,
    min_length: usize,
    too_short: &'static str,
    max_length: usize,
    too_long: &'static str,
}

fn check_text(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<String>,
    rule: TextRule,
) -> Option<String> {
    let value = value.map(|value| value.trim().to_owned()).unwrap_or_default();
    let length = value.graphemes(true).count();

    if length == 0 {
        errors.push(FieldError::new(field, rule.required));
        None
    } else if length < rule.min_length {
        errors.push(FieldError::new(field, rule.too_short));
        None
    } else if length > rule.max_length {
        errors.push(FieldError::new(field, rule.too_long));
        None
    } else {
        Some(value)
    }
}

fn check_category(errors: &mut Vec<FieldError>, value: Option<String>) -> Option<Category> {
    let value = value.map(|value| value.trim().to_owned()).unwrap_or_default();

    if value.is_empty() {
        errors.push(FieldError::new("category", "Category is required"));
        return None;
    }

    match value.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            let allowed = Category::ALL.map(Category::as_str).join(", ");
            errors.push(FieldError::new(
                "category",
                format!("Category must be one of the following: {allowed}"),
            ));
            None
        }
    }
}

fn check_amount(errors: &mut Vec<FieldError>, value: Option<f64>) -> Option<f64> {
    match value {
        None => {
            errors.push(FieldError::new("amount", "Amount is required"));
            None
        }
        Some(amount) if !amount.is_finite() => {
            errors.push(FieldError::new("amount", "Amount must be a finite number"));
            None
        }
        Some(amount) if amount < 0.0 => {
            errors.push(FieldError::new("amount", "Amount cannot be negative"));
            None
        }
        Some(amount) => Some(amount),
    }
}

fn check_date(
    errors: &mut Vec<FieldError>,
    value: Option<String>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let now = truncate_to_millis(now);
    let date = match value.as_deref().map(str::trim) {
        None | Some("") => now,
        Some(text) => match parse_date(text) {
            Some(date) => truncate_to_millis(date),
            None => {
                errors.push(FieldError::new("date", format!("\"{text}\" is not a valid date")));
                return None;
            }
        },
    };

    // Both sides are whole milliseconds, so a date earlier in the current
    // millisecond is not in the future.
    if date > now {
        errors.push(FieldError::new("date", "Date cannot be in the future"));
        return None;
    }

    Some(date)
}

/// Parse either an RFC 3339 date-time or a calendar date at midnight UTC.
fn parse_date(text: &str) -> Option<OffsetDateTime> {
    if let Ok(datetime) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(datetime);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

fn check_paid(
    errors: &mut Vec<FieldError>,
    paid: Option<bool>,
    status: Option<String>,
) -> Option<bool> {
    if let Some(paid) = paid {
        return Some(paid);
    }

    match status {
        None => Some(false),
        Some(status) => match PaymentStatus::parse(status.trim()) {
            Some(status) => Some(status.is_paid()),
            None => {
                errors.push(FieldError::new("status", "Status must be either PAID or DUE"));
                None
            }
        },
    }
}
