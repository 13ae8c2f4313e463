//! Defines functions for storing the session in a private cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::Session};

/// The name of the cookie holding the serialized [Session].
pub const COOKIE_SESSION: &str = "session";
/// How long a session lasts without any requests.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::hours(1);

/// Store `session` in the session cookie, replacing any existing session.
///
/// # Errors
///
/// Returns [Error::CookieError] if the session cannot be serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    session: &Session,
    secure: bool,
) -> Result<PrivateCookieJar, Error> {
    let session_string =
        serde_json::to_string(session).map_err(|error| Error::CookieError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_SESSION, session_string))
            .path("/")
            .expires(session.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(secure),
    ))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict),
    )
}

/// Get the session from the cookie jar.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if the session cookie is missing, cannot
/// be decrypted or parsed, or has expired.
pub fn get_session_from_cookies(jar: &PrivateCookieJar) -> Result<Session, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::Unauthorized)?;
    let session: Session =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::Unauthorized)?;

    if session.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::Unauthorized);
    }

    Ok(session)
}

/// Push the expiry of `session` to the later of now plus `duration` and its
/// current expiry, and store it in the session cookie.
///
/// Returns the updated jar together with the extended session.
///
/// # Errors
///
/// Returns [Error::CookieError] if the new expiry would overflow or the
/// session cannot be serialized. The cookie jar is not modified in that case.
pub fn extend_session(
    jar: PrivateCookieJar,
    session: &Session,
    duration: Duration,
    secure: bool,
) -> Result<(PrivateCookieJar, Session), Error> {
    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| Error::CookieError("session expiry overflowed".to_owned()))?;

    let session = Session {
        expires_at: max(session.expires_at, new_expiry),
        ..session.clone()
    };
    let jar = set_session_cookie(jar, &session, secure)?;

    Ok((jar, session))
}
