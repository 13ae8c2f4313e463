use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;

use crate::{AppState, Error, expense::ExpenseStore};

/// The state needed by the expense route handlers.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The store of every user's expenses.
    pub expenses: Arc<Mutex<ExpenseStore>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expenses: state.expenses.clone(),
        }
    }
}

impl ExpenseState {
    /// Acquire the expense store for the rest of the request.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the lock was poisoned by a panic in
    /// another request.
    pub fn lock(&self) -> Result<MutexGuard<'_, ExpenseStore>, Error> {
        self.expenses.lock().map_err(|error| {
            tracing::error!("Could not acquire expense store lock: {error}");
            Error::StoreLockError
        })
    }
}
