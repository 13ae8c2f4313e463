use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::Session,
    expense::{ExpenseState, ExpenseStore},
    user::UserID,
};

pub(crate) fn get_test_session(user_id: i64) -> Session {
    Session {
        id: Uuid::new_v4(),
        user_id: UserID::new(user_id),
        user_name: format!("User {user_id}"),
        expires_at: OffsetDateTime::now_utc() + Duration::hours(1),
    }
}

pub(crate) fn get_expense_state(data_dir: &Path) -> ExpenseState {
    ExpenseState {
        expenses: Arc::new(Mutex::new(ExpenseStore::open(data_dir))),
    }
}
