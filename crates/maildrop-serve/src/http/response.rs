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

//! HTTP response.

use serde_json::Value;
use std::fmt;

use super::component::Status;
use super::{MEDIA_TYPE_JSON, MEDIA_TYPE_TEXT};

mod headers;

pub use headers::Headers;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP response.
///
/// Responses are created with one of the constructors, which choose the
/// content type and default to status `200 OK`, and can then be customized
/// with the builder methods.
///
/// # Examples
///
/// ```
/// use maildrop_serve::http::{Response, Status};
/// use serde_json::json;
///
/// // Create response
/// let res = Response::from_json(json!({ "id": 1 }))
///     .status(Status::Ok);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// Response status.
    pub status: Status,
    /// Media type of the body.
    pub content_type: String,
    /// Response body.
    pub body: String,
    /// Custom response headers.
    pub headers: Headers,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Response {
    /// Creates a JSON response from the given value.
    ///
    /// The value is serialized immediately, so the body is a string from the
    /// start and `Content-Length` can be derived at serialization time.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    /// use serde_json::json;
    ///
    /// // Create response
    /// let res = Response::from_json(json!({ "id": 1 }));
    /// ```
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        Self {
            status: Status::Ok,
            content_type: MEDIA_TYPE_JSON.to_string(),
            body: value.to_string(),
            headers: Headers::new(),
        }
    }

    /// Creates a plain text response from the given string.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    ///
    /// // Create response
    /// let res = Response::from_text("Hello, world!");
    /// ```
    #[must_use]
    pub fn from_text<T>(text: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            status: Status::Ok,
            content_type: MEDIA_TYPE_TEXT.to_string(),
            body: text.into(),
            headers: Headers::new(),
        }
    }

    /// Creates a validation error response from the given value.
    ///
    /// This is a JSON response with status `400 Bad Request`, used by
    /// handlers to reject requests with missing or malformed fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    /// use serde_json::json;
    ///
    /// // Create response
    /// let res = Response::validation_error(json!({
    ///     "error": "email is required"
    /// }));
    /// ```
    #[must_use]
    pub fn validation_error(value: Value) -> Self {
        Self::from_json(value).status(Status::BadRequest)
    }

    /// Serializes the response into bytes.
    ///
    /// The serialized form is the status line, `Content-Type` and
    /// `Content-Length` headers, the custom headers in insertion order, a
    /// blank line, and the body. `Content-Length` is derived from the byte
    /// length of the body.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    ///
    /// // Create response and serialize into bytes
    /// let res = Response::from_text("hi");
    /// let bytes = res.into_bytes();
    /// assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
    /// ```
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let mut message = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            self.content_type,
            self.body.len()
        );

        // Append custom headers in insertion order, then the body
        message.push_str(&self.headers.to_string());
        message.push_str("\r\n");
        message.push_str(&self.body);
        message.into_bytes()
    }
}

impl Response {
    /// Sets the status of the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::{Response, Status};
    /// use serde_json::json;
    ///
    /// // Create response and set status
    /// let res = Response::from_json(json!({ "error": "Conflict" }))
    ///     .status(Status::Conflict);
    /// ```
    #[inline]
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the given header of the response.
    ///
    /// If the header is already present, its value is replaced in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    ///
    /// // Create response and set header
    /// let res = Response::from_text("hi")
    ///     .set_header("Cache-Control", "no-store");
    /// ```
    #[inline]
    #[must_use]
    pub fn set_header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(name, value);
        self
    }

    /// Adds a cookie to the response.
    ///
    /// The cookie is rendered as
    /// `name=value; Max-Age=<expires>; Path=/; HttpOnly; Secure` and added
    /// to the `Set-Cookie` header. Multiple cookies are joined with `; `
    /// into a single combined header value, which deviates from the usual
    /// one-header-per-cookie convention but keeps serialization trivial.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    ///
    /// // Create response and add cookie
    /// let res = Response::from_text("hi")
    ///     .set_cookie("token", "abc", 3600);
    /// ```
    #[must_use]
    pub fn set_cookie(mut self, name: &str, value: &str, expires: u64) -> Self {
        let cookie =
            format!("{name}={value}; Max-Age={expires}; Path=/; HttpOnly; Secure");

        // Join multiple cookies into a single combined header value
        match self.headers.get_mut("Set-Cookie") {
            Some(slot) => {
                slot.push_str("; ");
                slot.push_str(&cookie);
            }
            None => self.headers.insert("Set-Cookie", cookie),
        }
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Response {
    /// Creates a default response.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Response;
    ///
    /// // Create response
    /// let res = Response::default();
    /// ```
    #[inline]
    fn default() -> Self {
        Self::from_text("")
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Response {
    /// Formats the response for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HTTP/1.1 {}\r\n", self.status)?;
        write!(f, "Content-Type: {}\r\n", self.content_type)?;
        write!(f, "{}\r\n", self.headers)?;
        f.write_str(&self.body)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_into_bytes() {
        let res = Response::from_text("Hello, world!");
        assert_eq!(
            res.into_bytes(),
            b"HTTP/1.1 200 OK\r\n\
              Content-Type: text/plain\r\n\
              Content-Length: 13\r\n\
              \r\n\
              Hello, world!"
        );
    }

    #[test]
    fn test_into_bytes_with_headers() {
        let res = Response::from_json(json!({ "id": 1 }))
            .status(Status::Conflict)
            .set_header("Cache-Control", "no-store");

        let message = String::from_utf8(res.into_bytes())
            .expect("response must be UTF-8");
        assert_eq!(
            message,
            "HTTP/1.1 409 Conflict\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 8\r\n\
             Cache-Control: no-store\r\n\
             \r\n\
             {\"id\":1}"
        );
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let res = Response::from_text("héllo");
        let message = String::from_utf8(res.into_bytes())
            .expect("response must be UTF-8");
        assert!(message.contains("Content-Length: 6\r\n"));
    }

    #[test]
    fn test_validation_error() {
        let res = Response::validation_error(json!({ "error": "bad" }));
        assert_eq!(res.status, Status::BadRequest);
        assert_eq!(res.content_type, "application/json");
    }

    #[test]
    fn test_set_cookie_combines_values() {
        let res = Response::from_text("hi")
            .set_cookie("token", "abc", 3600)
            .set_cookie("theme", "dark", 3600);

        assert_eq!(
            res.headers.get("Set-Cookie"),
            Some(
                "token=abc; Max-Age=3600; Path=/; HttpOnly; Secure; \
                 theme=dark; Max-Age=3600; Path=/; HttpOnly; Secure"
            )
        );
    }
}
