//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    payload::{INVALID_BODY_MSG, is_form_body},
};

/// The number of characters of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The fields whose values never appear in the logs.
const REDACTED_FIELDS: [&str; 1] = ["password"];
const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in request bodies are redacted, reading the body the same way
/// the route handlers do: URL-encoded if the content type says so, otherwise
/// JSON.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return Error::Validation(INVALID_BODY_MSG.to_owned()).into_response();
        }
    };

    let body_text = String::from_utf8_lossy(&body_bytes);
    let display_text = redact_body(&parts.headers, &body_text);
    log_body("Received request", &parts, &display_text);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_body(
        "Sending response",
        &parts,
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_body(headers: &HeaderMap, body_text: &str) -> String {
    if is_form_body(headers) {
        redact_form(body_text)
    } else {
        redact_json(body_text)
    }
}

fn redact_form(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return form_text.to_owned();
    };

    let fields: Vec<(String, String)> = fields
        .into_iter()
        .map(|(key, value)| {
            if REDACTED_FIELDS.contains(&key.as_str()) {
                (key, REDACTED_VALUE.to_owned())
            } else {
                (key, value)
            }
        })
        .collect();

    serde_urlencoded::to_string(&fields).unwrap_or_else(|_| form_text.to_owned())
}

fn redact_json(json_text: &str) -> String {
    let Ok(mut value) = serde_json::from_str::<serde_json::Value>(json_text) else {
        return json_text.to_owned();
    };

    if let Some(object) = value.as_object_mut() {
        for field in REDACTED_FIELDS {
            if let Some(field_value) = object.get_mut(field) {
                *field_value = serde_json::Value::from(REDACTED_VALUE);
            }
        }
    }

    value.to_string()
}

fn log_body(prefix: &str, head: &impl std::fmt::Debug, body: &str) {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((cut, _)) => {
            tracing::info!("{prefix}: {head:#?}\nbody: {}...", &body[..cut]);
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{prefix}: {head:#?}\nbody: {body:?}"),
    }
}
