//! Log-out route handler that ends the session and invalidates the session cookie.

use axum::{
    extract::State,
    http::{HeaderMap, header::ACCEPT},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    auth::{
        AuthState,
        cookie::{get_session_from_cookies, invalidate_session_cookie},
    },
    endpoints,
    error::message_response,
};

/// End the session and invalidate the session cookie.
///
/// The session is removed from the session store, so copies of the cookie
/// stop working too. Clients that accept JSON get a success message, anyone
/// else is redirected to the log-in page. Requests without an active session
/// are rejected with [Error::Unauthorized].
pub async fn get_log_out(
    State(state): State<AuthState>,
    headers: HeaderMap,
    jar: PrivateCookieJar,
) -> Response {
    let session = match get_session_from_cookies(&jar) {
        Ok(session) => session,
        Err(error) => return error.into_response(),
    };

    match state.sessions() {
        Ok(mut sessions) => {
            if !sessions.remove(session.id) {
                return Error::Unauthorized.into_response();
            }
        }
        Err(error) => return error.into_response(),
    }

    tracing::info!("User {} logged out", session.user_id);
    let jar = invalidate_session_cookie(jar);

    if wants_json(&headers) {
        (jar, message_response("Logout successful")).into_response()
    } else {
        (jar, Redirect::to(endpoints::LOG_IN)).into_response()
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("application/json"))
}
