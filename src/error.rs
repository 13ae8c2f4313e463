//! Defines the app level error type and its conversion to JSON responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid session.
    #[error("no valid session")]
    Unauthorized,

    /// The email did not belong to a registered user or the password did not
    /// match.
    ///
    /// Both cases use this one variant so that clients cannot find out which
    /// emails are registered.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request body was missing a field or a field was malformed.
    ///
    /// The string is shown to the client and should name the violated rule.
    #[error("{0}")]
    Validation(String),

    /// The email used to register is already in use.
    #[error("the email is already registered")]
    DuplicateUser,

    /// The requested expense does not exist or belongs to another user.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A data file could not be written.
    #[error("could not write {0}")]
    Storage(String),

    /// Could not acquire the lock for one of the stores.
    #[error("could not acquire the store lock")]
    StoreLockError,

    /// The session cookie could not be created.
    #[error("could not create the session cookie: {0}")]
    CookieError(String),
}

/// The JSON body sent with every message-only response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    /// A human readable description of the outcome.
    pub message: String,
}

/// Create a `200 OK` response with a JSON message body.
pub fn message_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(MessageBody {
            message: message.to_owned(),
        }),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.to_owned(),
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::InvalidCredentials => {
                error_response(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            Error::Validation(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Error::DuplicateUser => error_response(StatusCode::BAD_REQUEST, "User already exists"),
            Error::NotFound => error_response(StatusCode::NOT_FOUND, "Expense not found"),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, check the server logs for more details.",
                )
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{Error, MessageBody};

    async fn get_status_and_message(error: Error) -> (StatusCode, MessageBody) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let cases = [
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (Error::Validation("nope".to_owned()), StatusCode::BAD_REQUEST),
            (Error::DuplicateUser, StatusCode::BAD_REQUEST),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (
                Error::HashingError("bad salt".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Storage("expenses.json".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::StoreLockError, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, want_status) in cases {
            let description = error.to_string();
            let (got_status, _) = get_status_and_message(error).await;

            assert_eq!(got_status, want_status, "wrong status for {description}");
        }
    }

    #[tokio::test]
    async fn validation_message_is_passed_through() {
        let (_, body) =
            get_status_and_message(Error::Validation("All fields are required.".to_owned())).await;

        assert_eq!(body.message, "All fields are required.");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let (_, body) =
            get_status_and_message(Error::Storage("/secret/path/users.json: EACCES".to_owned()))
                .await;

        assert!(!body.message.contains("/secret/path"));
    }
}
