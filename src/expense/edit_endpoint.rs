use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Session,
    error::message_response,
    expense::{ExpenseForm, ExpenseId, ExpenseState},
    payload::Payload,
};

/// A route handler for replacing the date, amount and description of an
/// expense owned by the logged-in user.
///
/// The form is validated before the expense is looked up, so an invalid form
/// for a missing expense is reported as a validation error.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the ID is not a number, does not exist or belongs to
///   another user.
/// - [Error::Validation] naming the first broken rule if the form is invalid.
pub async fn edit_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    Payload(form): Payload<ExpenseForm>,
) -> Response {
    let Ok(Path(expense_id)) = expense_id else {
        return Error::NotFound.into_response();
    };

    match update_expense(&state, &session, expense_id, form) {
        Ok(()) => message_response("Expense updated successfully"),
        Err(error) => error.into_response(),
    }
}

fn update_expense(
    state: &ExpenseState,
    session: &Session,
    expense_id: ExpenseId,
    form: ExpenseForm,
) -> Result<(), Error> {
    let fields = form.validate()?;
    state.lock()?.update(session.user_id, expense_id, fields)?;
    tracing::debug!("User {} updated expense {expense_id}", session.user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use tempfile::TempDir;

    use crate::{
        expense::{ExpenseFields, ExpenseForm, MISSING_FIELDS_MSG, RawAmount},
        payload::Payload,
        test_utils::{assert_message, get_expense_state, get_test_session},
        user::UserID,
    };

    use super::edit_expense_endpoint;

    fn groceries() -> ExpenseFields {
        ExpenseFields {
            date: "2024-01-05".to_owned(),
            amount: "42".to_owned(),
            description: "Groceries".to_owned(),
        }
    }

    fn dinner_form() -> ExpenseForm {
        ExpenseForm {
            date: Some("2024-02-01".to_owned()),
            amount: Some(RawAmount::Text("50".to_owned())),
            description: Some("Dinner".to_owned()),
        }
    }

    #[tokio::test]
    async fn updates_own_expense() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let created = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(get_test_session(1)),
            Ok(Path(created.id)),
            Payload(dinner_form()),
        )
        .await;

        assert_message(response, StatusCode::OK, "Expense updated successfully").await;
        let updated = state.lock().unwrap().get(UserID::new(1), created.id).unwrap();
        assert_eq!(updated.description, "Dinner");
        assert_eq!(updated.amount, "50");
    }

    #[tokio::test]
    async fn other_users_expense_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let created = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();

        let response = edit_expense_endpoint(
            State(state.clone()),
            Extension(get_test_session(2)),
            Ok(Path(created.id)),
            Payload(dinner_form()),
        )
        .await;

        assert_message(response, StatusCode::NOT_FOUND, "Expense not found").await;
        let unchanged = state.lock().unwrap().get(UserID::new(1), created.id).unwrap();
        assert_eq!(unchanged.description, "Groceries");
    }

    #[tokio::test]
    async fn invalid_form_is_rejected() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let created = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();

        let response = edit_expense_endpoint(
            State(state),
            Extension(get_test_session(1)),
            Ok(Path(created.id)),
            Payload(ExpenseForm::default()),
        )
        .await;

        assert_message(response, StatusCode::BAD_REQUEST, MISSING_FIELDS_MSG).await;
    }
}
