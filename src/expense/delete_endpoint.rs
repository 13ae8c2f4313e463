use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Session,
    error::message_response,
    expense::{ExpenseId, ExpenseState},
};

/// A route handler for deleting an expense owned by the logged-in user.
///
/// # Errors
///
/// Returns [Error::NotFound] if the ID is not a number, does not exist or
/// belongs to another user.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
) -> Response {
    let Ok(Path(expense_id)) = expense_id else {
        return Error::NotFound.into_response();
    };

    let result = state
        .lock()
        .and_then(|mut expenses| expenses.delete(session.user_id, expense_id));

    match result {
        Ok(()) => {
            tracing::debug!("User {} deleted expense {expense_id}", session.user_id);
            message_response("Expense deleted successfully")
        }
        Err(error) => error.into_response(),
    }
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
        expense::ExpenseFields,
        test_utils::{assert_message, get_expense_state, get_test_session},
        user::UserID,
    };

    use super::delete_expense_endpoint;

    fn groceries() -> ExpenseFields {
        ExpenseFields {
            date: "2024-01-05".to_owned(),
            amount: "42".to_owned(),
            description: "Groceries".to_owned(),
        }
    }

    #[tokio::test]
    async fn deletes_own_expense() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let created = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();

        let response = delete_expense_endpoint(
            State(state.clone()),
            Extension(get_test_session(1)),
            Ok(Path(created.id)),
        )
        .await;

        assert_message(response, StatusCode::OK, "Expense deleted successfully").await;
        assert_eq!(state.lock().unwrap().count(), 0);
    }

    #[tokio::test]
    async fn deleting_other_users_expense_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let created = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();

        let response = delete_expense_endpoint(
            State(state.clone()),
            Extension(get_test_session(2)),
            Ok(Path(created.id)),
        )
        .await;

        assert_message(response, StatusCode::NOT_FOUND, "Expense not found").await;
        assert_eq!(state.lock().unwrap().count(), 1);
    }
}
