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

//! HTTP request.

use std::fmt;
use std::str;

use super::MEDIA_TYPE_JSON;

mod body;
mod cookies;
mod error;
mod headers;
mod query;

pub use body::Body;
pub use cookies::Cookies;
pub use error::{Error, Result};
pub use headers::Headers;
pub use query::Query;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request.
///
/// The regular way to create a [`Request`] is to use [`Request::from_bytes`],
/// which parses a given slice of bytes. Parsing is done entirely by hand, as
/// the restricted framing the server understands is simple enough that an
/// HTTP parser library would hide more than it helps.
///
/// Method, path and version are kept as verbatim tokens. The query string is
/// split off the path during parsing, so the path never contains a `?`. The
/// combination of method and path forms the route key, which the router uses
/// for exact-match dispatch.
///
/// # Examples
///
/// ```
/// use maildrop_serve::http::Request;
///
/// // Create request
/// let req = Request::new()
///     .method("GET")
///     .path("/");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// Request method.
    pub method: String,
    /// Request path, with the query string stripped.
    pub path: String,
    /// Protocol version.
    pub version: String,
    /// Request headers.
    pub headers: Headers,
    /// Query string parameters.
    pub query: Query,
    /// Request cookies.
    pub cookies: Cookies,
    /// Request body.
    pub body: Body,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Request {
    /// Creates a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request
    /// let req = Request::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request from the given bytes.
    ///
    /// The bytes are split once on the first blank line into a header block
    /// and a body. The first line of the header block must consist of exactly
    /// three whitespace-separated tokens, and every remaining line must split
    /// once on `: ` into a header name and value. If the path contains a `?`,
    /// the query string is split off and parsed into parameters.
    ///
    /// The body is decoded as JSON if and only if the `Content-Type` header
    /// equals the JSON media type, and kept as raw text otherwise. Cookies
    /// are parsed from the `Cookie` header, if present.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`] for anything that doesn't match the
    /// expected framing: a missing blank line, a malformed request line,
    /// query parameter, header line or cookie, or a body that is declared as
    /// JSON but can't be decoded.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request from bytes
    /// let req = Request::from_bytes(b"GET / HTTP/1.1\r\n\r\n")?;
    /// assert_eq!(req.method, "GET");
    /// assert_eq!(req.path, "/");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let message = str::from_utf8(bytes)?;

        // Split message once on the first blank line into a header block and
        // a body - a message without a blank line was truncated by the sender
        // or by the bounded receive buffer, so we can't make sense of it
        let (head, body) = message
            .split_once("\r\n\r\n")
            .ok_or(Error::Truncated)?;

        // Unpack request line - the first line must consist of exactly three
        // whitespace-separated tokens, or the request is malformed
        let mut lines = head.trim().split("\r\n");
        let line = lines.next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        let (Some(method), Some(target), Some(version), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(Error::RequestLine(line.to_string()));
        };

        // Split query string off the path, if present, and parse it - note
        // that a parameter without a `=` must propagate as a parse error
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query.parse()?),
            None => (target, Query::new()),
        };

        // Unpack remaining header lines - when the same header name occurs
        // more than once, the last occurrence wins
        let mut headers = Headers::new();
        for line in lines {
            let (name, value) = line
                .trim()
                .split_once(": ")
                .ok_or_else(|| Error::HeaderLine(line.to_string()))?;

            // Add header to map
            headers.insert(name, value);
        }

        // Decode body as JSON if and only if the content type says so - an
        // empty body is always absent, regardless of the content type
        let body = if body.is_empty() {
            Body::Absent
        } else if headers.get("Content-Type") == Some(MEDIA_TYPE_JSON) {
            Body::Json(serde_json::from_str(body)?)
        } else {
            Body::Text(body.to_string())
        };

        // Parse cookies from the `Cookie` header, if present
        let cookies = match headers.get("Cookie") {
            Some(value) => value.parse()?,
            None => Cookies::new(),
        };

        // Return request
        Ok(Request {
            method: method.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            headers,
            query,
            cookies,
            body,
        })
    }

    /// Returns the route key of the request.
    ///
    /// The route key is the string `method:path`, which is used as the exact
    /// lookup key in the route table - no pattern matching exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request
    /// let req = Request::new()
    ///     .method("GET")
    ///     .path("/users");
    ///
    /// // Obtain route key
    /// assert_eq!(req.route_key(), "GET:/users");
    /// ```
    #[inline]
    #[must_use]
    pub fn route_key(&self) -> String {
        format!("{}:{}", self.method, self.path)
    }
}

impl Request {
    /// Sets the method of the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request and set method
    /// let req = Request::new()
    ///     .method("POST");
    /// ```
    #[inline]
    #[must_use]
    pub fn method<M>(mut self, method: M) -> Self
    where
        M: Into<String>,
    {
        self.method = method.into();
        self
    }

    /// Sets the path of the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request and set path
    /// let req = Request::new()
    ///     .path("/users");
    /// ```
    #[inline]
    #[must_use]
    pub fn path<P>(mut self, path: P) -> Self
    where
        P: Into<String>,
    {
        self.path = path.into();
        self
    }

    /// Adds a header to the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request and add header
    /// let req = Request::new()
    ///     .header("Accept", "text/plain");
    /// ```
    #[inline]
    #[must_use]
    pub fn header<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(name, value);
        self
    }

    /// Adds a cookie to the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request and add cookie
    /// let req = Request::new()
    ///     .cookie("token", "value");
    /// ```
    #[inline]
    #[must_use]
    pub fn cookie<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.cookies.insert(name, value);
        self
    }

    /// Sets the body of the request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    /// use serde_json::json;
    ///
    /// // Create request and set body
    /// let req = Request::new()
    ///     .body(json!({ "a": 1 }));
    /// ```
    #[inline]
    #[must_use]
    pub fn body<B>(mut self, body: B) -> Self
    where
        B: Into<Body>,
    {
        self.body = body.into();
        self
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Request {
    /// Creates a default request.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::Request;
    ///
    /// // Create request
    /// let req = Request::default();
    /// ```
    #[inline]
    fn default() -> Self {
        Self {
            method: String::from("GET"),
            path: String::from("/"),
            version: String::from("HTTP/1.1"),
            headers: Headers::default(),
            query: Query::default(),
            cookies: Cookies::default(),
            body: Body::default(),
        }
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Request {
    /// Formats the request for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}\r\n", self.method, self.path, self.version)?;
        write!(f, "{}\r\n", self.headers)?;
        write!(f, "[Body: {}]", self.body)
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
    fn test_round_trip() {
        let bytes = b"POST /send?to=bob&cc=eve HTTP/1.1\r\n\
                      Host: localhost\r\n\
                      Accept: text/plain\r\n\
                      \r\n\
                      hello";

        let req = Request::from_bytes(bytes).expect("request must parse");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/send");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(
            req.headers,
            Headers::from_iter([
                ("Host", "localhost"),
                ("Accept", "text/plain"),
            ])
        );
        assert_eq!(
            req.query,
            Query::from_iter([("to", "bob"), ("cc", "eve")])
        );
        assert_eq!(req.body, Body::Text(String::from("hello")));
        assert_eq!(req.route_key(), "POST:/send");
    }

    #[test]
    fn test_body_content_type_gating() {
        let with_header = b"POST /debug HTTP/1.1\r\n\
                            Content-Type: application/json\r\n\
                            \r\n\
                            {\"a\":1}";

        // With the JSON content type, the body is structured
        let req = Request::from_bytes(with_header).expect("request must parse");
        assert_eq!(req.body, Body::Json(json!({ "a": 1 })));

        // Without it, the body is the raw text, byte for byte
        let without_header = b"POST /debug HTTP/1.1\r\n\r\n{\"a\":1}";
        let req =
            Request::from_bytes(without_header).expect("request must parse");
        assert_eq!(req.body, Body::Text(String::from("{\"a\":1}")));
    }

    #[test]
    fn test_body_absent_when_empty() {
        let bytes = b"GET / HTTP/1.1\r\n\
                      Content-Type: application/json\r\n\
                      \r\n";

        let req = Request::from_bytes(bytes).expect("request must parse");
        assert!(req.body.is_absent());
    }

    #[test]
    fn test_body_declared_json_but_undecodable() {
        let bytes = b"POST / HTTP/1.1\r\n\
                      Content-Type: application/json\r\n\
                      \r\n\
                      not json";

        let res = Request::from_bytes(bytes);
        assert!(matches!(res, Err(Error::Json(_))));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let bytes = b"GET / HTTP/1.1\r\n\
                      Accept: text/plain\r\n\
                      Accept: application/json\r\n\
                      \r\n";

        let req = Request::from_bytes(bytes).expect("request must parse");
        assert_eq!(req.headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_cookies() {
        let bytes = b"GET / HTTP/1.1\r\n\
                      Cookie: token=abc; theme=dark\r\n\
                      \r\n";

        let req = Request::from_bytes(bytes).expect("request must parse");
        assert_eq!(req.cookies.get("token"), Some("abc"));
        assert_eq!(req.cookies.get("theme"), Some("dark"));
    }

    #[test]
    fn test_malformed_query_pair() {
        let bytes = b"GET /a?bad HTTP/1.1\r\n\r\n";
        let res = Request::from_bytes(bytes);
        assert!(matches!(res, Err(Error::QueryPair(pair)) if pair == "bad"));
    }

    #[test]
    fn test_malformed_request_line() {
        for head in ["GET /", "GET / HTTP/1.1 extra"] {
            let bytes = format!("{head}\r\n\r\n");
            let res = Request::from_bytes(bytes.as_bytes());
            assert!(matches!(res, Err(Error::RequestLine(_))));
        }
    }

    #[test]
    fn test_malformed_header_line() {
        let bytes = b"GET / HTTP/1.1\r\nAccept text/plain\r\n\r\n";
        let res = Request::from_bytes(bytes);
        assert!(matches!(res, Err(Error::HeaderLine(_))));
    }

    #[test]
    fn test_truncated() {
        let bytes = b"GET / HTTP/1.1\r\nHost: localhost";
        let res = Request::from_bytes(bytes);
        assert!(matches!(res, Err(Error::Truncated)));
    }
}
