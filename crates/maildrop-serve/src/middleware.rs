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

//! Middleware.

use std::fmt;

use super::handler::Result;
use super::http::{Request, Response};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Middleware.
///
/// Middlewares run before the handler of a route. They receive an exclusive
/// reference to the per-request context, which they can populate for the
/// handler, e.g., with the authenticated user. A middleware may also answer
/// the request itself by returning a [`Response`], which short-circuits the
/// chain - neither the remaining middlewares nor the handler run.
///
/// Besides closures and functions which exactly match the signature of
/// [`Middleware::process`], this trait can be implemented for any data type.
///
/// # Examples
///
/// This example shows how to implement a middleware that rejects requests
/// without a `token` cookie, while letting all other requests pass through
/// to the handler.
///
/// ```
/// use maildrop_serve::handler::Result;
/// use maildrop_serve::http::{Request, Response, Status};
/// use maildrop_serve::middleware::Middleware;
/// use serde_json::json;
///
/// // Define middleware
/// struct RequireToken;
///
/// // Create middleware implementation
/// impl Middleware<()> for RequireToken {
///     fn process(
///         &self, _ctx: &mut (), req: &Request,
///     ) -> Result<Option<Response>> {
///         if req.cookies.contains("token") {
///             Ok(None)
///         } else {
///             Ok(Some(
///                 Response::from_json(json!({ "error": "Unauthorized" }))
///                     .status(Status::Unauthorized),
///             ))
///         }
///     }
/// }
/// ```
pub trait Middleware<C>: Send + Sync + 'static {
    /// Processes the given request.
    ///
    /// Returning `Ok(None)` passes the request on to the next middleware or
    /// the handler, while `Ok(Some(response))` short-circuits the chain.
    ///
    /// # Errors
    ///
    /// This method returns a [`Fault`][], if the middleware hits an internal
    /// error it can't express as a response.
    ///
    /// [`Fault`]: crate::handler::Fault
    fn process(&self, ctx: &mut C, req: &Request) -> Result<Option<Response>>;
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<C> fmt::Debug for Box<dyn Middleware<C>> {
    /// Formats the middleware for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Box<dyn Middleware>")
    }
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<C, F> Middleware<C> for F
where
    F: Fn(&mut C, &Request) -> Result<Option<Response>> + Send + Sync + 'static,
{
    #[inline]
    fn process(&self, ctx: &mut C, req: &Request) -> Result<Option<Response>> {
        self(ctx, req)
    }
}
