//! Defines the expense model, input validation and the store that persists
//! expenses to `expenses.json`.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use time::{
    Date, Month, OffsetDateTime, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    collection::{Collection, Record},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for expense IDs.
pub type ExpenseId = i64;

/// Money spent by a user on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense, unique among all expenses.
    pub id: ExpenseId,
    /// The user that created the expense.
    pub user_id: UserID,
    /// When the money was spent, formatted as yyyy-mm-dd.
    pub date: String,
    /// How much was spent, as a positive whole number.
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: String,
    /// What the money was spent on.
    pub description: String,
}

impl Record for Expense {
    fn record_id(&self) -> i64 {
        self.id
    }
}

/// An amount as sent by a client or found in an older data file, which may
/// hold either a string or a bare number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// The amount as text, e.g. "42".
    Text(String),
    /// The amount as a JSON number, e.g. 42.
    Number(serde_json::Number),
}

impl From<RawAmount> for String {
    fn from(value: RawAmount) -> Self {
        match value {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(deserializer).map(String::from)
}

/// The fields submitted when adding or editing an expense.
///
/// Every field is optional so that a missing field is reported as a
/// validation error rather than a rejected request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    /// The date of the expense, expected as yyyy-mm-dd.
    #[serde(default)]
    pub date: Option<String>,
    /// The amount spent.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    /// What the money was spent on.
    #[serde(default)]
    pub description: Option<String>,
}

/// The fields of an expense that have passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    /// A yyyy-mm-dd date.
    pub date: String,
    /// A positive whole number.
    pub amount: String,
    /// Letters, digits and whitespace, at most 100 characters.
    pub description: String,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// The maximum number of characters allowed in a description.
pub const DESCRIPTION_MAX_LENGTH: usize = 100;

/// Shown when a field is missing or empty.
pub const MISSING_FIELDS_MSG: &str = "All fields are required.";
/// Shown when the description is longer than [DESCRIPTION_MAX_LENGTH].
pub const DESCRIPTION_TOO_LONG_MSG: &str = "Description must be 100 characters or less.";
/// Shown when the description contains punctuation or symbols.
pub const DESCRIPTION_CHARACTERS_MSG: &str =
    "Description can only contain letters, numbers, and spaces.";
/// Shown when the amount is not a positive whole number.
pub const INVALID_AMOUNT_MSG: &str = "Amount must be a positive whole number.";
/// Shown when the date is malformed or too far in the future.
pub const INVALID_DATE_MSG: &str = "Date must be a valid date in the format yyyy-mm-dd.";

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// How many years past the current year an expense may be dated.
const MAX_YEARS_AHEAD: i32 = 100;

impl ExpenseForm {
    /// Check the submitted fields, stopping at the first rule that is broken.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] whose message names the broken rule.
    pub fn validate(self) -> Result<ExpenseFields, Error> {
        let validation_error = |message: &str| Error::Validation(message.to_owned());

        let (Some(date), Some(amount), Some(description)) = (
            non_empty(self.date),
            non_empty(self.amount.map(String::from)),
            non_empty(self.description),
        ) else {
            return Err(validation_error(MISSING_FIELDS_MSG));
        };

        if description.chars().count() > DESCRIPTION_MAX_LENGTH {
            return Err(validation_error(DESCRIPTION_TOO_LONG_MSG));
        }

        if !description
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        {
            return Err(validation_error(DESCRIPTION_CHARACTERS_MSG));
        }

        if !is_positive_whole_number(&amount) {
            return Err(validation_error(INVALID_AMOUNT_MSG));
        }

        if !is_valid_date(&date, OffsetDateTime::now_utc().date()) {
            return Err(validation_error(INVALID_DATE_MSG));
        }

        Ok(ExpenseFields {
            date,
            amount,
            description,
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn is_positive_whole_number(amount: &str) -> bool {
    amount.chars().all(|c| c.is_ascii_digit()) && amount.parse::<u64>().is_ok_and(|n| n > 0)
}

fn is_valid_date(date: &str, today: Date) -> bool {
    let Ok(date) = Date::parse(date, DATE_FORMAT) else {
        return false;
    };

    let latest = Date::from_calendar_date(today.year() + MAX_YEARS_AHEAD, Month::December, 31)
        .unwrap_or(Date::MAX);

    date <= latest
}

// ============================================================================
// STORE
// ============================================================================

/// The name of the collection (and data file) holding expenses.
const EXPENSES: &str = "expenses";

/// Handles the creation, retrieval, update and deletion of [Expense]s.
///
/// Every method takes the ID of the user making the request and only ever
/// touches that user's expenses.
#[derive(Debug)]
pub struct ExpenseStore {
    expenses: Collection<Expense>,
}

impl ExpenseStore {
    /// Load the expenses saved in `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self {
            expenses: Collection::open(data_dir, EXPENSES),
        }
    }

    /// Create a new expense owned by `user_id` and save it to disk.
    ///
    /// # Errors
    ///
    /// Returns [Error::Storage] if the expenses file could not be written.
    pub fn create(&mut self, user_id: UserID, fields: ExpenseFields) -> Result<Expense, Error> {
        self.expenses.insert(|id| Expense {
            id,
            user_id,
            date: fields.date,
            amount: fields.amount,
            description: fields.description,
        })
    }

    /// Get the expense `id` if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the expense does not exist or belongs to
    /// another user.
    pub fn get(&self, user_id: UserID, id: ExpenseId) -> Result<Expense, Error> {
        self.expenses
            .records()
            .iter()
            .find(|expense| is_owned(expense, user_id, id))
            .cloned()
            .ok_or(Error::NotFound)
    }

    /// Get all of `user_id`'s expenses in the order they were created.
    pub fn list(&self, user_id: UserID) -> Vec<Expense> {
        self.expenses
            .records()
            .iter()
            .filter(|expense| expense.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Replace the date, amount and description of the expense `id` and save
    /// the change to disk.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::NotFound] if the expense does not exist or belongs to another user.
    /// - [Error::Storage] if the expenses file could not be written.
    pub fn update(
        &mut self,
        user_id: UserID,
        id: ExpenseId,
        fields: ExpenseFields,
    ) -> Result<Expense, Error> {
        let mut expenses = self.expenses.records().to_vec();
        let expense = expenses
            .iter_mut()
            .find(|expense| is_owned(expense, user_id, id))
            .ok_or(Error::NotFound)?;

        expense.date = fields.date;
        expense.amount = fields.amount;
        expense.description = fields.description;
        let updated = expense.clone();

        self.expenses.replace(expenses)?;

        Ok(updated)
    }

    /// Remove the expense `id` and save the remaining expenses to disk.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::NotFound] if the expense does not exist or belongs to another user.
    /// - [Error::Storage] if the expenses file could not be written.
    pub fn delete(&mut self, user_id: UserID, id: ExpenseId) -> Result<(), Error> {
        let records = self.expenses.records();
        let index = records
            .iter()
            .position(|expense| is_owned(expense, user_id, id))
            .ok_or(Error::NotFound)?;

        let mut expenses = records.to_vec();
        expenses.remove(index);

        self.expenses.replace(expenses)
    }

    /// Sum the amounts of `user_id`'s expenses.
    ///
    /// Amounts that cannot be read as a number are skipped.
    pub fn total(&self, user_id: UserID) -> f64 {
        self.expenses
            .records()
            .iter()
            .filter(|expense| expense.user_id == user_id)
            .map(|expense| {
                expense.amount.trim().parse::<f64>().unwrap_or_else(|_| {
                    tracing::warn!(
                        "Expense {} has a non-numeric amount {:?}, counting it as zero",
                        expense.id,
                        expense.amount
                    );
                    0.0
                })
            })
            .sum()
    }

    /// Get the number of expenses across all users.
    pub fn count(&self) -> usize {
        self.expenses.records().len()
    }
}

fn is_owned(expense: &Expense, user_id: UserID, id: ExpenseId) -> bool {
    expense.id == id && expense.user_id == user_id
}
