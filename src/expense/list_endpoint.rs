use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{auth::Session, expense::ExpenseState};

/// A route handler for listing the logged-in user's expenses in the order
/// they were added.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
) -> Response {
    match state.lock() {
        Ok(expenses) => Json(expenses.list(session.user_id)).into_response(),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use tempfile::TempDir;

    use crate::{
        expense::{Expense, ExpenseFields},
        test_utils::{assert_status, get_expense_state, get_test_session, parse_json_body},
        user::UserID,
    };

    use super::list_expenses_endpoint;

    fn groceries() -> ExpenseFields {
        ExpenseFields {
            date: "2024-01-05".to_owned(),
            amount: "42".to_owned(),
            description: "Groceries".to_owned(),
        }
    }

    #[tokio::test]
    async fn lists_only_own_expenses() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());
        let own = state
            .lock()
            .unwrap()
            .create(UserID::new(1), groceries())
            .unwrap();
        state
            .lock()
            .unwrap()
            .create(UserID::new(2), groceries())
            .unwrap();

        let response =
            list_expenses_endpoint(State(state), Extension(get_test_session(1))).await;

        assert_status(&response, StatusCode::OK);
        let expenses: Vec<Expense> = parse_json_body(response).await;
        assert_eq!(expenses, vec![own]);
    }

    #[tokio::test]
    async fn lists_nothing_for_new_user() {
        let dir = TempDir::new().unwrap();
        let state = get_expense_state(dir.path());

        let response =
            list_expenses_endpoint(State(state), Extension(get_test_session(1))).await;

        let expenses: Vec<Expense> = parse_json_body(response).await;
        assert!(expenses.is_empty());
    }
}
