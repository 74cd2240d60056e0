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

//! HTTP request error.

use std::{result, str};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// HTTP request error.
///
/// Parsing is strict: anything that doesn't match the restricted framing the
/// server understands is a parse error, never silently dropped data. Parse
/// errors are caught at the connection boundary and never propagate further.
#[derive(Debug, Error)]
pub enum Error {
    /// Request is not valid UTF-8.
    #[error("request is not valid UTF-8")]
    Encoding(#[from] str::Utf8Error),

    /// Header block is not terminated by a blank line.
    #[error("missing blank line after header block")]
    Truncated,

    /// Request line does not consist of exactly three tokens.
    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    /// Query string parameter without a `=` separator.
    #[error("malformed query parameter: {0:?}")]
    QueryPair(String),

    /// Header line without a `: ` separator.
    #[error("malformed header line: {0:?}")]
    HeaderLine(String),

    /// Cookie without a `=` separator.
    #[error("malformed cookie: {0:?}")]
    CookiePair(String),

    /// Body declared as JSON, but not decodable.
    #[error("body declared as JSON, but not decodable")]
    Json(#[from] serde_json::Error),
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// HTTP request result.
pub type Result<T = ()> = result::Result<T, Error>;
