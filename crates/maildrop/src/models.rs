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

//! Application models.

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Registered user.
///
/// The hashed password is never serialized, so responses and token payloads
/// built from a user always carry the public projection only. It defaults to
/// an empty string on deserialization, which is what a token payload yields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier.
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Hashed password, omitted from all projections.
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
}

/// Registration payload.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateUser {
    /// Requested username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain text password.
    pub password: String,
}

/// Login payload.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Plain text password.
    pub password: String,
}

/// Sent mail owned by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mail {
    /// Opaque identifier.
    pub id: String,
    /// Identifier of the owning user.
    pub user_id: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Mail composition payload.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateMail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}
