//! An extractor for request bodies sent either as JSON or as a URL-encoded form.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// Shown when the request body cannot be parsed.
pub const INVALID_BODY_MSG: &str = "Invalid request body.";

/// The deserialized body of a request.
///
/// Bodies with the content type `application/x-www-form-urlencoded` are
/// parsed as a form, anything else is parsed as JSON. An empty body is
/// treated as an empty JSON object so that missing fields reach validation.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = is_form_body(request.headers());

        let bytes = Bytes::from_request(request, state).await.map_err(|error| {
            tracing::debug!("Could not read request body: {error}");
            Error::Validation(INVALID_BODY_MSG.to_owned())
        })?;

        parse_body(&bytes, is_form).map(Payload)
    }
}

/// Whether a body sent with `headers` is read as URL-encoded. Every other
/// body is read as JSON.
pub(crate) fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn parse_body<T: DeserializeOwned>(bytes: &[u8], is_form: bool) -> Result<T, Error> {
    let result = if is_form {
        serde_urlencoded::from_bytes(bytes).map_err(|error| error.to_string())
    } else if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"{}").map_err(|error| error.to_string())
    } else {
        serde_json::from_slice(bytes).map_err(|error| error.to_string())
    };

    result.map_err(|error| {
        tracing::debug!("Could not parse request body: {error}");
        Error::Validation(INVALID_BODY_MSG.to_owned())
    })
}
