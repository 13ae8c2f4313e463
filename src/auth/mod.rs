//! Registration, log-in, log-out and the session cookie that ties them together.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod register_user;
mod session;
mod session_store;

pub use cookie::DEFAULT_SESSION_DURATION;
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard};
pub use register_user::register_user;
pub use session::Session;
pub use session_store::SessionStore;

#[cfg(test)]
pub use cookie::{COOKIE_SESSION, set_session_cookie};
