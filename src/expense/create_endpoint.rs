use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Session,
    error::message_response,
    expense::{ExpenseForm, ExpenseState},
    payload::Payload,
};

/// A route handler for adding an expense owned by the logged-in user.
///
/// # Errors
///
/// Returns [Error::Validation] naming the first broken rule if the form is
/// invalid, or an internal error if the expense could not be saved.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    Payload(form): Payload<ExpenseForm>,
) -> Response {
    match create_expense(&state, &session, form) {
        Ok(()) => message_response("Expense added successfully"),
        Err(error) => error.into_response(),
    }
}

fn create_expense(state: &ExpenseState, session: &Session, form: ExpenseForm) -> Result<(), Error> {
    let fields = form.validate()?;
    let expense = state.lock()?.create(session.user_id, fields)?;
    tracing::debug!("User {} added expense {}", session.user_id, expense.id);

    Ok(())
}
