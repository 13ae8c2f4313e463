//! Implements a struct that holds the state of the REST server.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    PasswordHash,
    auth::{DEFAULT_SESSION_DURATION, SessionStore},
    expense::ExpenseStore,
    user::UserStore,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// How long a session lasts without any requests.
    pub cookie_duration: Duration,

    /// Whether session cookies are restricted to HTTPS.
    pub secure_cookies: bool,

    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,

    /// The registered users.
    pub users: Arc<Mutex<UserStore>>,

    /// Every user's expenses.
    pub expenses: Arc<Mutex<ExpenseStore>>,

    /// The sessions that are currently logged in. These are not persisted,
    /// so everyone has to log in again after a restart.
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    /// Create a new [AppState] with the users and expenses saved in `data_dir`.
    ///
    /// Missing data files are treated as empty collections and are created on
    /// the first write.
    pub fn new(data_dir: &Path, cookie_secret: &str, secure_cookies: bool) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_SESSION_DURATION,
            secure_cookies,
            password_cost: PasswordHash::DEFAULT_COST,
            users: Arc::new(Mutex::new(UserStore::open(data_dir))),
            expenses: Arc::new(Mutex::new(ExpenseStore::open(data_dir))),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
