use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, Serializer};

use crate::{auth::Session, expense::ExpenseState};

/// The sum of a user's expense amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTotal {
    /// The sum, or zero if the user has no expenses.
    #[serde(serialize_with = "serialize_total")]
    pub total: f64,
}

/// Write whole sums as integers, e.g. `42` rather than `42.0`.
fn serialize_total<S>(total: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if total.fract() == 0.0 && total.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*total as i64)
    } else {
        serializer.serialize_f64(*total)
    }
}

/// A route handler for summing the logged-in user's expenses.
pub async fn total_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(session): Extension<Session>,
) -> Response {
    match state.lock() {
        Ok(expenses) => Json(ExpenseTotal {
            total: expenses.total(session.user_id),
        })
        .into_response(),
        Err(error) => error.into_response(),
    }
}
