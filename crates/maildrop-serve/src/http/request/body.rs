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

//! HTTP request body.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP request body.
///
/// The body is a tagged variant selected exactly once during parsing: when
/// the `Content-Type` header equals the JSON media type, the body is decoded
/// into a structured value, and otherwise kept as raw text. An empty body is
/// always absent, regardless of the content type.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// No body.
    #[default]
    Absent,
    /// Raw text body.
    Text(String),
    /// Structured JSON body.
    Json(Value),
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Body {
    /// Returns whether the body is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Body;
    ///
    /// // Create body
    /// let body = Body::Absent;
    ///
    /// // Ensure body is absent
    /// assert!(body.is_absent());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Body::Absent)
    }

    /// Returns the raw text, if the body is text.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the structured value, if the body is JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Body;
    /// use serde_json::json;
    ///
    /// // Create body
    /// let body = Body::Json(json!({ "a": 1 }));
    ///
    /// // Obtain reference to structured value
    /// let value = body.as_json();
    /// assert!(value.is_some());
    /// ```
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl From<&str> for Body {
    /// Creates a text body from a string.
    #[inline]
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<String> for Body {
    /// Creates a text body from a string.
    #[inline]
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<Value> for Body {
    /// Creates a structured body from a JSON value.
    #[inline]
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Body {
    /// Formats the body for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Body::Absent => f.write_str("absent"),
            Body::Text(text) => write!(f, "text ({} bytes)", text.len()),
            Body::Json(_) => f.write_str("json"),
        }
    }
}
