//! Handles log-in requests by checking credentials and starting a session.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{AuthState, Session, cookie::set_session_cookie},
    error::message_response,
    payload::Payload,
    user::User,
};

/// The raw data sent in a log-in request.
///
/// There is no need for validation here since the fields are only compared
/// against registered users. A missing field simply fails to match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogInForm {
    /// Email entered during log-in.
    #[serde(default)]
    pub email: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and a success
/// message is returned.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] both when the email does not belong to
/// a registered user and when the password is wrong.
pub async fn post_log_in(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    Payload(form): Payload<LogInForm>,
) -> Response {
    let user = match check_credentials(&state, &form) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    match start_session(&state, jar, &user) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            (jar, message_response("Login successful.")).into_response()
        }
        Err(error) => error.into_response(),
    }
}

fn start_session(
    state: &AuthState,
    jar: PrivateCookieJar,
    user: &User,
) -> Result<PrivateCookieJar, Error> {
    let session = Session::new(user, state.cookie_duration);
    let jar = set_session_cookie(jar, &session, state.secure_cookies)?;
    state.sessions()?.insert(&session);

    Ok(jar)
}

fn check_credentials(state: &AuthState, form: &LogInForm) -> Result<User, Error> {
    let user = {
        let users = state.users.lock().map_err(|error| {
            tracing::error!("Could not acquire user store lock: {error}");
            Error::StoreLockError
        })?;

        match users.get_by_email(&form.email) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    match user.password_hash.verify(&form.password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            Err(Error::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use tempfile::TempDir;

    use crate::{
        PasswordHash,
        auth::{AuthState, COOKIE_SESSION, DEFAULT_SESSION_DURATION, SessionStore},
        error::MessageBody,
        user::UserStore,
    };

    use super::post_log_in;

    fn get_test_server() -> (TestServer, Arc<Mutex<SessionStore>>, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut users = UserStore::open(dir.path());
        users
            .create(
                "Alice",
                "alice@x.com",
                PasswordHash::new("pw1", 4).unwrap(),
            )
            .unwrap();

        let state = AuthState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_SESSION_DURATION,
            secure_cookies: false,
            users: Arc::new(Mutex::new(users)),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        };
        let sessions = state.sessions.clone();
        let app = Router::new()
            .route("/login", post(post_log_in))
            .with_state(state);

        (TestServer::new(app).unwrap(), sessions, dir)
    }

    fn message(text: &str) -> MessageBody {
        MessageBody {
            message: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn log_in_succeeds_and_sets_session_cookie() {
        let (server, sessions, _dir) = get_test_server();

        let response = server
            .post("/login")
            .json(&serde_json::json!({"email": "alice@x.com", "password": "pw1"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&message("Login successful."));
        let cookie = response.cookie(COOKIE_SESSION);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(sessions.lock().unwrap().count(), 1);
    }

    #[tokio::test]
    async fn log_in_accepts_form_body() {
        let (server, _, _dir) = get_test_server();

        let response = server
            .post("/login")
            .form(&[("email", "alice@x.com"), ("password", "pw1")])
            .await;

        response.assert_status_ok();
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (server, sessions, _dir) = get_test_server();

        let wrong_password = server
            .post("/login")
            .json(&serde_json::json!({"email": "alice@x.com", "password": "nope"}))
            .await;
        let unknown_email = server
            .post("/login")
            .json(&serde_json::json!({"email": "bob@x.com", "password": "pw1"}))
            .await;

        wrong_password.assert_status_unauthorized();
        unknown_email.assert_status_unauthorized();
        wrong_password.assert_json(&message("Invalid email or password"));
        unknown_email.assert_json(&message("Invalid email or password"));
        assert!(wrong_password.maybe_cookie(COOKIE_SESSION).is_none());
        assert_eq!(sessions.lock().unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_invalid_credentials() {
        let (server, _, _dir) = get_test_server();

        server
            .post("/login")
            .json(&serde_json::json!({}))
            .await
            .assert_status_unauthorized();
    }
}
