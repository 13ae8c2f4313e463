//! Handles registration of new users.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, error::message_response, payload::Payload, user::UserStore,
};

/// Shown when one of the registration fields is missing or empty.
pub const REGISTRATION_FIELDS_MSG: &str = "Name, email and password are required.";

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The store of registered users.
    pub users: Arc<Mutex<UserStore>>,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The raw data sent in a registration request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The user's display name.
    #[serde(default)]
    pub name: Option<String>,
    /// The email the user will log in with.
    #[serde(default)]
    pub email: Option<String>,
    /// The plain text password, hashed before it is stored.
    #[serde(default)]
    pub password: Option<String>,
}

/// Handler for registration requests via the POST method.
///
/// # Errors
///
/// Returns:
/// - [Error::Validation] if a field is missing or empty.
/// - [Error::DuplicateUser] if the email is already registered.
/// - [Error::HashingError] or [Error::Storage] if the user could not be saved.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Payload(form): Payload<RegisterForm>,
) -> Response {
    match create_user(&state, form) {
        Ok(()) => message_response("Registration successful."),
        Err(error) => error.into_response(),
    }
}

fn create_user(state: &RegistrationState, form: RegisterForm) -> Result<(), Error> {
    let non_empty = |field: Option<String>| field.filter(|value| !value.is_empty());
    let (Some(name), Some(email), Some(password)) = (
        non_empty(form.name),
        non_empty(form.email),
        non_empty(form.password),
    ) else {
        return Err(Error::Validation(REGISTRATION_FIELDS_MSG.to_owned()));
    };

    let mut users = state.users.lock().map_err(|error| {
        tracing::error!("Could not acquire user store lock: {error}");
        Error::StoreLockError
    })?;

    // Duplicates are rejected before hashing. `create` checks again.
    if users.get_by_email(&email).is_ok() {
        return Err(Error::DuplicateUser);
    }

    let password_hash = PasswordHash::new(&password, state.password_cost)?;
    let user = users.create(&name, &email, password_hash)?;
    tracing::info!("Registered user {}", user.id);

    Ok(())
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use tempfile::TempDir;

    use crate::{error::MessageBody, user::UserStore};

    use super::{REGISTRATION_FIELDS_MSG, RegistrationState, register_user};

    fn get_test_server() -> (TestServer, Arc<Mutex<UserStore>>, TempDir) {
        let dir = TempDir::new().unwrap();
        let users = Arc::new(Mutex::new(UserStore::open(dir.path())));
        let state = RegistrationState {
            users: users.clone(),
            password_cost: 4,
        };
        let app = Router::new()
            .route("/register", post(register_user))
            .with_state(state);

        (TestServer::new(app).unwrap(), users, dir)
    }

    fn alice() -> serde_json::Value {
        serde_json::json!({"name": "Alice", "email": "alice@x.com", "password": "pw1"})
    }

    #[tokio::test]
    async fn register_succeeds_and_hashes_password() {
        let (server, users, _dir) = get_test_server();

        let response = server.post("/register").json(&alice()).await;

        response.assert_status_ok();
        response.assert_json(&MessageBody {
            message: "Registration successful.".to_owned(),
        });
        let user = users.lock().unwrap().get_by_email("alice@x.com").unwrap();
        assert_eq!(user.name, "Alice");
        assert_ne!(user.password_hash.to_string(), "pw1");
        assert!(user.password_hash.verify("pw1").unwrap());
    }

    #[tokio::test]
    async fn register_duplicate_email_fails() {
        let (server, users, _dir) = get_test_server();
        server.post("/register").json(&alice()).await.assert_status_ok();

        let response = server.post("/register").json(&alice()).await;

        response.assert_status_bad_request();
        response.assert_json(&MessageBody {
            message: "User already exists".to_owned(),
        });
        assert_eq!(users.lock().unwrap().count(), 1);
    }

    #[tokio::test]
    async fn register_with_missing_field_fails() {
        let (server, users, _dir) = get_test_server();

        let response = server
            .post("/register")
            .form(&[("name", "Alice"), ("email", "alice@x.com"), ("password", "")])
            .await;

        response.assert_status_bad_request();
        response.assert_json(&MessageBody {
            message: REGISTRATION_FIELDS_MSG.to_owned(),
        });
        assert_eq!(users.lock().unwrap().count(), 0);
    }
}
