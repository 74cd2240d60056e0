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

//! HTTP query string.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::{Error, Result};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// HTTP query string.
///
/// The query string is parsed from the part of the request target after the
/// first `?`, splitting on `&` and then once on `=`. A pair without a `=` is
/// a parse error and must never be silently dropped. Note that values are
/// stored verbatim, as percent-decoding is deliberately not supported.
///
/// When the same key occurs more than once, the last occurrence wins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query {
    /// Ordered map of parameters.
    inner: BTreeMap<String, String>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Query {
    /// Creates a query string.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::request::Query;
    ///
    /// // Create query string
    /// let query = Query::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parameter value for the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::http::request::Query;
    ///
    /// // Create query string and add parameter
    /// let mut query = Query::new();
    /// query.insert("key", "value");
    ///
    /// // Obtain reference to parameter value
    /// let value = query.get("key");
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Returns whether the parameter is contained.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Updates the given parameter.
    #[inline]
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(key.into(), value.into());
    }
}

#[allow(clippy::must_use_candidate)]
impl Query {
    /// Returns the number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether there are any parameters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl FromStr for Query {
    type Err = Error;

    /// Attempts to create a query string from a string.
    ///
    /// # Errors
    ///
    /// This method returns [`Error::QueryPair`], if a parameter does not
    /// contain a `=` separator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use maildrop_serve::http::request::Query;
    ///
    /// // Create query string from string
    /// let query: Query = "key=value".parse()?;
    /// assert_eq!(query.get("key"), Some("value"));
    /// # Ok(())
    /// # }
    /// ```
    fn from_str(value: &str) -> Result<Self> {
        let mut query = Query::new();
        for pair in value.split('&') {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::QueryPair(pair.to_string()))?;

            // Add parameter to query string
            query.insert(key, value);
        }
        Ok(query)
    }
}

// ----------------------------------------------------------------------------

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    /// Creates a query string from an iterator.
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut query = Query::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

// ----------------------------------------------------------------------------

impl fmt::Display for Query {
    /// Formats the query string for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut iter = self.inner.iter().peekable();
        while let Some((key, value)) = iter.next() {
            write!(f, "{key}={value}")?;
            if iter.peek().is_some() {
                f.write_str("&")?;
            }
        }

        // No errors occurred
        Ok(())
    }
}
