// Copyright (c) 2025 Maildrop and contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under DCO

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Repository.

use rand::random;
use std::fmt::Write;
use std::sync::Mutex;

use crate::models::{Mail, User};

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// User lookup filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserFilter {
    /// Match on the identifier.
    Id(String),
    /// Match on the username.
    Username(String),
    /// Match on the email address.
    Email(String),
}

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Repository.
///
/// Handlers depend on this trait only, so storage can be swapped without
/// touching them. Identifiers are assigned by the repository on creation
/// and are opaque 24-character strings.
pub trait Repository: Send + Sync {
    /// Stores the given user and assigns it an identifier.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if storage is inaccessible.
    fn create_user(&self, user: User) -> Result<User>;

    /// Returns the first user matching the given filter.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if storage is inaccessible.
    fn find_user(&self, filter: &UserFilter) -> Result<Option<User>>;

    /// Returns all users.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if storage is inaccessible.
    fn users(&self) -> Result<Vec<User>>;

    /// Stores the given mail and assigns it an identifier.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if storage is inaccessible.
    fn create_mail(&self, mail: Mail) -> Result<Mail>;

    /// Returns all mails owned by the given user.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if storage is inaccessible.
    fn mails_by_user(&self, user_id: &str) -> Result<Vec<Mail>>;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// In-memory repository.
///
/// Users and mails live in vectors behind a mutex. This is the storage the
/// binary runs with - nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    /// Storage protected by a lock.
    inner: Mutex<Storage>,
}

/// In-memory storage.
#[derive(Debug, Default)]
struct Storage {
    /// Stored users.
    users: Vec<User>,
    /// Stored mails.
    mails: Vec<Mail>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl MemoryRepository {
    /// Creates an in-memory repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop::repository::MemoryRepository;
    ///
    /// // Create repository
    /// let repository = MemoryRepository::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Repository for MemoryRepository {
    fn create_user(&self, mut user: User) -> Result<User> {
        let mut storage = self.inner.lock().map_err(|_| Error::Poisoned)?;
        user.id = object_id();
        storage.users.push(user.clone());
        Ok(user)
    }

    fn find_user(&self, filter: &UserFilter) -> Result<Option<User>> {
        let storage = self.inner.lock().map_err(|_| Error::Poisoned)?;
        let user = storage
            .users
            .iter()
            .find(|user| match filter {
                UserFilter::Id(id) => &user.id == id,
                UserFilter::Username(username) => &user.username == username,
                UserFilter::Email(email) => &user.email == email,
            })
            .cloned();
        Ok(user)
    }

    fn users(&self) -> Result<Vec<User>> {
        let storage = self.inner.lock().map_err(|_| Error::Poisoned)?;
        Ok(storage.users.clone())
    }

    fn create_mail(&self, mut mail: Mail) -> Result<Mail> {
        let mut storage = self.inner.lock().map_err(|_| Error::Poisoned)?;
        mail.id = object_id();
        storage.mails.push(mail.clone());
        Ok(mail)
    }

    fn mails_by_user(&self, user_id: &str) -> Result<Vec<Mail>> {
        let storage = self.inner.lock().map_err(|_| Error::Poisoned)?;
        Ok(storage
            .mails
            .iter()
            .filter(|mail| mail.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Generates an opaque identifier.
///
/// Identifiers are 24 lowercase hex characters derived from 12 random
/// bytes, so they are indistinguishable from document store object ids.
#[must_use]
pub fn object_id() -> String {
    let bytes: [u8; 12] = random();
    bytes.iter().fold(String::with_capacity(24), |mut id, byte| {
        let _ = write!(id, "{byte:02x}");
        id
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> User {
        User {
            id: String::new(),
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: String::from("secrethashed"),
        }
    }

    #[test]
    fn test_create_and_find_user() {
        let repository = MemoryRepository::new();
        let created = repository
            .create_user(user("bob", "bob@example.com"))
            .expect("create must succeed");
        assert_eq!(created.id.len(), 24);

        for filter in [
            UserFilter::Id(created.id.clone()),
            UserFilter::Username(String::from("bob")),
            UserFilter::Email(String::from("bob@example.com")),
        ] {
            let found = repository
                .find_user(&filter)
                .expect("find must succeed");
            assert_eq!(found.as_ref(), Some(&created), "miss for {filter:?}");
        }

        let missing = repository
            .find_user(&UserFilter::Username(String::from("eve")))
            .expect("find must succeed");
        assert_eq!(missing, None);
    }

    #[test]
    fn test_mails_by_user() {
        let repository = MemoryRepository::new();
        let owner = repository
            .create_user(user("bob", "bob@example.com"))
            .expect("create must succeed");

        let mail = Mail {
            id: String::new(),
            user_id: owner.id.clone(),
            to: String::from("alice@example.com"),
            subject: String::from("hi"),
            body: String::from("hello"),
        };
        let created = repository
            .create_mail(mail)
            .expect("create must succeed");

        let mails = repository
            .mails_by_user(&owner.id)
            .expect("query must succeed");
        assert_eq!(mails, vec![created]);

        let none = repository
            .mails_by_user("missing")
            .expect("query must succeed");
        assert!(none.is_empty());
    }

    #[test]
    fn test_object_id() {
        let id = object_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
