//! Expense management for the expense tracker.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the validation of submitted expense forms
//! - The `ExpenseStore` that persists expenses to disk
//! - The route handlers for adding, listing, editing and deleting expenses

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod state;
mod total_endpoint;

pub use core::{ExpenseForm, ExpenseId, ExpenseStore};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use get_endpoint::get_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use state::ExpenseState;
pub use total_endpoint::total_expense_endpoint;

#[cfg(test)]
pub use core::{Expense, ExpenseFields, INVALID_AMOUNT_MSG, MISSING_FIELDS_MSG, RawAmount};
#[cfg(test)]
pub use total_endpoint::ExpenseTotal;
