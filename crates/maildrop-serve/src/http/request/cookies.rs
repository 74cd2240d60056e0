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

//! HTTP request cookies.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP request cookies.
///
/// Cookies are parsed from the value of the `Cookie` header, splitting on
/// `; ` and then once on `=`. A cookie without a `=` is a parse error, like
/// a malformed query string parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cookies {
    /// Ordered map of cookies.
    inner: BTreeMap<String, String>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Cookies {
    /// Creates a cookie map.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::request::Cookies;
    ///
    /// // Create cookie map
    /// let cookies = Cookies::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for the given cookie.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::request::Cookies;
    ///
    /// // Create cookie map and add cookie
    /// let mut cookies = Cookies::new();
    /// cookies.insert("token", "value");
    ///
    /// // Obtain reference to cookie value
    /// let value = cookies.get("token");
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    /// Returns whether the cookie is contained.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Updates the given cookie.
    #[inline]
    pub fn insert<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(name.into(), value.into());
    }
}

#[allow(clippy::must_use_candidate)]
impl Cookies {
    /// Returns the number of cookies.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any cookies.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for Cookies {
    type Err = Error;

    /// Attempts to create a cookie map from a `Cookie` header value.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::CookiePair`], if a cookie does not
    /// contain a `=` separator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use maildrop_serve::http::request::Cookies;
    ///
    /// // Create cookie map from string
    /// let cookies: Cookies = "token=abc; theme=dark".parse()?;
    /// assert_eq!(cookies.get("theme"), Some("dark"));
    /// # Ok(())
    /// # }
    /// ```
    fn from_str(value: &str) -> Result<Self> {
        let mut cookies = Cookies::new();
        for cookie in value.split("; ") {
            let (name, value) = cookie
                .split_once('=')
                .ok_or_else(|| Error::CookiePair(cookie.to_string()))?;

            // Add cookie to map
            cookies.insert(name, value);
        }
        Ok(cookies)
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Cookies {
    /// Formats the cookie map for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.inner.iter().peekable();
        while let Some((name, value)) = iter.next() {
            write!(f, "{name}={value}")?;
            if iter.peek().is_some() {
                f.write_str("; ")?;
            }
        }

        // No errors occurred
        Ok(())
    }
}
