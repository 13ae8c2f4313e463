//! Authentication middleware that validates the session cookie and renews the session.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        Session, SessionStore,
        cookie::{extend_session, get_session_from_cookies},
    },
    user::UserStore,
};

/// The state needed for the auth middleware and the log-in route.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts without any requests.
    pub cookie_duration: Duration,
    /// Whether session cookies are restricted to HTTPS.
    pub secure_cookies: bool,
    /// The store of registered users.
    pub users: Arc<Mutex<UserStore>>,
    /// The sessions that are currently logged in.
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            secure_cookies: state.secure_cookies,
            users: state.users.clone(),
            sessions: state.sessions.clone(),
        }
    }
}

impl AuthState {
    /// Acquire the session store.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the lock was poisoned by a panic in
    /// another request.
    pub fn sessions(&self) -> Result<MutexGuard<'_, SessionStore>, Error> {
        self.sessions.lock().map_err(|error| {
            tracing::error!("Could not acquire session store lock: {error}");
            Error::StoreLockError
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// The session is placed into the request and the request executed normally
/// if the cookie is valid, the session has not been ended by logging out and
/// its user still exists, otherwise a `401 Unauthorized` response is returned. Every successful request pushes the
/// session expiry back by [AuthState::cookie_duration].
///
/// **Note**: Route handlers can use the function argument `Extension(session): Extension<Session>` to receive the session.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key` for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}");
            return Error::Unauthorized.into_response();
        }
    };
    let session = match get_session_from_cookies(&jar) {
        Ok(session) => session,
        Err(error) => return error.into_response(),
    };

    match state.sessions() {
        Ok(sessions) if sessions.is_active_at(&session, OffsetDateTime::now_utc()) => {}
        Ok(_) => return Error::Unauthorized.into_response(),
        Err(error) => return error.into_response(),
    }

    match user_exists(&state, &session) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(
                "Rejecting session for user {} who no longer exists",
                session.user_id
            );
            return Error::Unauthorized.into_response();
        }
        Err(error) => return error.into_response(),
    }

    parts.extensions.insert(session.clone());
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_session(jar, &session, state.cookie_duration, state.secure_cookies) {
        Ok((updated_jar, extended)) => {
            let touched = state
                .sessions()
                .map(|mut sessions| sessions.touch(&extended));

            // The session may have ended while the request was running.
            if !matches!(touched, Ok(true)) {
                return Response::from_parts(parts, body);
            }

            updated_jar
        }
        Err(err) => {
            tracing::error!("Error extending session: {err:?}");
            return Response::from_parts(parts, body);
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

fn user_exists(state: &AuthState, session: &Session) -> Result<bool, Error> {
    let users = state.users.lock().map_err(|error| {
        tracing::error!("Could not acquire user store lock: {error}");
        Error::StoreLockError
    })?;

    Ok(users.get(session.user_id).is_ok())
}
