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

//! Credentials and tokens.
//!
//! The hashing and token scheme in this module is a deliberate placeholder
//! kept for protocol development: passwords are "hashed" by appending a
//! suffix, and a token is its own payload. Nothing here must be mistaken for
//! security.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Token error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidToken {
    /// Token is absent or empty.
    #[error("token is empty")]
    Empty,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Hashes the given password.
///
/// # Examples
///
/// ```
/// use maildrop::auth;
///
/// // Hash password
/// let hashed = auth::hash_password("secret");
/// ```
#[must_use]
pub fn hash_password(password: &str) -> String {
    // TODO: replace the placeholder scheme with argon2 before any deployment
    format!("{password}hashed")
}

/// Verifies the given password against a hash.
///
/// # Examples
///
/// ```
/// use maildrop::auth;
///
/// // Hash and verify password
/// let hashed = auth::hash_password("secret");
/// assert!(auth::verify_password("secret", &hashed));
/// ```
#[must_use]
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    hash_password(password) == hashed_password
}

/// Builds a token from the given payload.
#[must_use]
pub fn build_token(payload: &str) -> String {
    payload.to_string()
}

/// Verifies the given token and returns its payload.
///
/// # Errors
///
/// This function returns [`InvalidToken`], if the token is absent or empty.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), maildrop::auth::InvalidToken> {
/// use maildrop::auth;
///
/// // Build and verify token
/// let token = auth::build_token("payload");
/// let payload = auth::verify_token(Some(&token))?;
/// assert_eq!(payload, "payload");
/// # Ok(())
/// # }
/// ```
pub fn verify_token(token: Option<&str>) -> Result<String, InvalidToken> {
    match token {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(InvalidToken::Empty),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let hashed = hash_password("secret");
        assert!(verify_password("secret", &hashed));
        assert!(!verify_password("other", &hashed));
    }

    #[test]
    fn test_verify_token() {
        assert_eq!(verify_token(Some("payload")).as_deref(), Ok("payload"));
        assert_eq!(verify_token(Some("")), Err(InvalidToken::Empty));
        assert_eq!(verify_token(None), Err(InvalidToken::Empty));
    }
}
