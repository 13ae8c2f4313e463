//! Tracks which sessions are live so that logging out ends a session for good.

use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::Session, user::UserID};

#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    user_id: UserID,
    expires_at: OffsetDateTime,
}

/// The sessions that have been started and not yet ended or expired.
///
/// The session cookie only proves who a session belongs to. A session is
/// accepted only while it is also listed here, so a copy of the cookie is
/// worthless once the session has been removed.
#[derive(Debug, Default)]
pub struct SessionStore {
    active: HashMap<Uuid, ActiveSession>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `session` as active.
    ///
    /// Sessions that have run out are dropped at the same time.
    pub fn insert(&mut self, session: &Session) {
        let now = OffsetDateTime::now_utc();
        self.active.retain(|_, active| active.expires_at > now);

        self.active.insert(
            session.id,
            ActiveSession {
                user_id: session.user_id,
                expires_at: session.expires_at,
            },
        );
    }

    /// Whether `session` was started, has not ended and has not run out at `now`.
    pub fn is_active_at(&self, session: &Session, now: OffsetDateTime) -> bool {
        self.active
            .get(&session.id)
            .is_some_and(|active| active.user_id == session.user_id && active.expires_at > now)
    }

    /// Move the expiry of an active session to that of `session`.
    ///
    /// Returns `false`, leaving the store unchanged, if the session has already ended.
    pub fn touch(&mut self, session: &Session) -> bool {
        match self.active.get_mut(&session.id) {
            Some(active) if active.user_id == session.user_id => {
                active.expires_at = session.expires_at;
                true
            }
            _ => false,
        }
    }

    /// End the session with `id`. Returns `false` if it was not active.
    pub fn remove(&mut self, id: Uuid) -> bool {
        self.active.remove(&id).is_some()
    }

    /// The number of sessions that have not been removed or pruned.
    pub fn count(&self) -> usize {
        self.active.len()
    }
}
