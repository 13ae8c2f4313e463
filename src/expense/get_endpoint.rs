use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Session,
    expense::{ExpenseId, ExpenseState},
};

/// A route handler for fetching a single expense owned by the logged-in user.
///
/// # Errors
///
/// Returns [Error::NotFound] if the ID is not a number, does not exist or
/// belongs to another user.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
) -> Response {
    let Ok(Path(expense_id)) = expense_id else {
        return Error::NotFound.into_response();
    };

    let expense = state
        .lock()
        .and_then(|expenses| expenses.get(session.user_id, expense_id));

    match expense {
        Ok(expense) => Json(expense).into_response(),
        Err(error) => error.into_response(),
    }
}
