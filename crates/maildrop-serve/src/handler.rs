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

//! Handler.

use std::fmt;
use std::result;

use super::http::{Request, Response};

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Fault raised by a handler or middleware.
///
/// Faults are internal errors, not client errors: a handler that wants to
/// reject a request returns a [`Response`] with a client error status. Faults
/// propagate to the connection loop, which logs them and answers with a
/// generic `500 Internal Server Error`.
pub type Fault = anyhow::Error;

/// Handler result type.
pub type Result<T = Response> = result::Result<T, Fault>;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Handler.
///
/// Handlers produce the final response for a request. They receive a shared
/// reference to the per-request context, which the middleware chain has
/// already populated, and can thus read but not mutate it. This split keeps
/// context mutation confined to middlewares.
///
/// Besides closures and functions which exactly match the signature of
/// [`Handler::handle`], this trait can be implemented for any data type.
///
/// # Examples
///
/// ```
/// use maildrop_serve::handler::{Handler, Result};
/// use maildrop_serve::http::{Request, Response};
///
/// // Define handler
/// struct Hello;
///
/// // Create handler implementation
/// impl Handler<()> for Hello {
///     fn handle(&self, _ctx: &(), _req: &Request) -> Result {
///         Ok(Response::from_text("Hello, world!"))
///     }
/// }
/// ```
pub trait Handler<C>: Send + Sync + 'static {
    /// Handles the given request.
    ///
    /// # Errors
    ///
    /// This method returns a [`Fault`], if the handler hits an internal
    /// error it can't express as a response, e.g., a failing collaborator.
    fn handle(&self, ctx: &C, req: &Request) -> Result;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<C> fmt::Debug for Box<dyn Handler<C>> {
    /// Formats the handler for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Box<dyn Handler>")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<C, F> Handler<C> for F
where
    F: Fn(&C, &Request) -> Result + Send + Sync + 'static,
{
    #[inline]
    fn handle(&self, ctx: &C, req: &Request) -> Result {
        self(ctx, req)
    }
}
