//! Defines the user model and the store that persists users to `users.json`.

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, PasswordHash,
    collection::{Collection, Record},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the user collection.
    pub id: UserID,
    /// The user's display name. Older data files may not have one.
    #[serde(default)]
    pub name: String,
    /// The email the user logs in with. Compared case-sensitively.
    pub email: String,
    /// The user's password hash.
    #[serde(rename = "password")]
    pub password_hash: PasswordHash,
}

impl Record for User {
    fn record_id(&self) -> i64 {
        self.id.as_i64()
    }
}

/// The name of the collection (and data file) holding users.
const USERS: &str = "users";

/// Handles the creation and retrieval of [User]s.
#[derive(Debug)]
pub struct UserStore {
    users: Collection<User>,
}

impl UserStore {
    /// Load the users saved in `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        Self {
            users: Collection::open(data_dir, USERS),
        }
    }

    /// Create a new user and save it to disk.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::DuplicateUser] if `email` already belongs to a user.
    /// - [Error::Storage] if the users file could not be written.
    pub fn create(
        &mut self,
        name: &str,
        email: &str,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        if self.get_by_email(email).is_ok() {
            return Err(Error::DuplicateUser);
        }

        self.users.insert(|id| User {
            id: UserID::new(id),
            name: name.to_owned(),
            email: email.to_owned(),
            password_hash,
        })
    }

    /// Get the user with the ID `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such user.
    pub fn get(&self, user_id: UserID) -> Result<User, Error> {
        self.users
            .records()
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    /// Get the user whose email exactly matches `email`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such user.
    pub fn get_by_email(&self, email: &str) -> Result<User, Error> {
        self.users
            .records()
            .iter()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(Error::NotFound)
    }

    /// Get the number of registered users.
    pub fn count(&self) -> usize {
        self.users.records().len()
    }
}
