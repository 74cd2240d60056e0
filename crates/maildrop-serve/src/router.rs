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

//! Router.

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::handler::{Handler, Result};
use super::http::{Request, Response, Status};
use super::middleware::Middleware;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Router.
///
/// The router maps route keys of the form `method:path` to handlers, using
/// exact string matching - no patterns, no path parameters. Each route also
/// carries a frozen chain of middlewares, snapshotted when the route is
/// registered, so middlewares registered later never apply to it. This makes
/// registration order load-bearing and must be kept in mind when composing
/// an application.
///
/// The router is generic over the per-request context `C`, which is created
/// fresh for every dispatch, mutated by the middleware chain, and read by
/// the handler.
///
/// # Examples
///
/// ```
/// use maildrop_serve::handler::Result;
/// use maildrop_serve::http::{Request, Response};
/// use maildrop_serve::router::Router;
///
/// // Define handler
/// fn hello(_ctx: &(), _req: &Request) -> Result {
///     Ok(Response::from_text("Hello, world!"))
/// }
///
/// // Create router and register route
/// let mut router: Router<()> = Router::new();
/// router.register_route("GET", "/", hello);
/// ```
pub struct Router<C> {
    /// Map of route keys to routes.
    routes: HashMap<String, Route<C>>,
    /// Ordered list of middlewares registered so far.
    middlewares: Vec<Arc<dyn Middleware<C>>>,
}

/// Route with frozen middleware chain.
struct Route<C> {
    /// Route handler.
    handler: Box<dyn Handler<C>>,
    /// Middleware chain, snapshotted at registration.
    chain: Arc<[Arc<dyn Middleware<C>>]>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<C: 'static> Router<C> {
    /// Creates a router.
    ///
    /// # Examples
    ///
    /// ```
    /// use maildrop_serve::router::Router;
    ///
    /// // Create router
    /// let router: Router<()> = Router::new();
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { routes: HashMap::new(), middlewares: Vec::new() }
    }

    /// Registers a middleware.
    ///
    /// The middleware is appended to the global sequence and applies to all
    /// routes registered after this call. Routes registered before keep the
    /// chain they were registered with.
    pub fn register_middleware<M>(&mut self, middleware: M)
    where
        M: Middleware<C>,
    {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Registers a route.
    ///
    /// The handler is stored under the route key `method:path`, together
    /// with a snapshot of the middlewares registered so far. Registering the
    /// same route key again replaces the previous route.
    pub fn register_route<H>(&mut self, method: &str, path: &str, handler: H)
    where
        H: Handler<C>,
    {
        self.routes.insert(
            format!("{method}:{path}"),
            Route {
                handler: Box::new(handler),
                chain: Arc::from(self.middlewares.as_slice()),
            },
        );
    }

    /// Routes the given request.
    ///
    /// A fresh context is created, the middleware chain of the matched route
    /// runs in order, and the first middleware returning a response
    /// short-circuits the chain. Otherwise the handler runs with the context
    /// the chain produced. An unknown route key yields a fixed `404 Not
    /// Found` response, and no middleware runs at all.
    ///
    /// # Errors
    ///
    /// This method returns a [`Fault`][], if a middleware or the handler
    /// raises one.
    ///
    /// [`Fault`]: crate::handler::Fault
    pub fn route(&self, req: &Request) -> Result
    where
        C: Default,
    {
        let Some(route) = self.routes.get(&req.route_key()) else {
            return Ok(Self::not_found());
        };

        // Create fresh context and walk the frozen middleware chain - the
        // first middleware returning a response answers the request
        let mut ctx = C::default();
        for middleware in route.chain.iter() {
            if let Some(res) = middleware.process(&mut ctx, req)? {
                return Ok(res);
            }
        }

        // Invoke handler with the context the chain produced
        route.handler.handle(&ctx, req)
    }

    /// Creates the response for an unknown route.
    fn not_found() -> Response {
        Response::from_json(json!({ "error": "Not Found" }))
            .status(Status::NotFound)
    }
}

impl<C> Router<C>
where
    C: Serialize + 'static,
{
    /// Registers the debug route for all methods.
    ///
    /// The debug route echoes the parsed request and the context produced by
    /// the middleware chain as JSON, which makes it a convenient probe for
    /// both the parser and the chain a route would see at this point of the
    /// registration sequence.
    pub fn register_debug_route(&mut self, path: &str) {
        for method in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
            self.register_route(method, path, debug);
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<C: 'static> Default for Router<C> {
    /// Creates a default router.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------

impl<C> fmt::Debug for Router<C> {
    /// Formats the router for debugging.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.keys())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Handles the debug route.
fn debug<C>(ctx: &C, req: &Request) -> Result
where
    C: Serialize,
{
    Ok(Response::from_json(json!({
        "request": {
            "method": req.method,
            "path": req.path,
            "version": req.version,
            "headers": req.headers,
            "query": req.query,
            "cookies": req.cookies,
            "body": req.body,
        },
        "context": serde_json::to_value(ctx)?,
    })))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Context recording which middlewares ran.
    #[derive(Debug, Default, Serialize)]
    struct Ctx {
        trace: Vec<&'static str>,
    }

    fn first(ctx: &mut Ctx, _req: &Request) -> Result<Option<Response>> {
        ctx.trace.push("first");
        Ok(None)
    }

    fn second(ctx: &mut Ctx, _req: &Request) -> Result<Option<Response>> {
        ctx.trace.push("second");
        Ok(None)
    }

    fn trace(ctx: &Ctx, _req: &Request) -> Result {
        Ok(Response::from_text(ctx.trace.join(",")))
    }

    /// Middleware counting invocations and short-circuiting.
    struct Reject(Arc<AtomicUsize>);

    impl Middleware<Ctx> for Reject {
        fn process(
            &self, _ctx: &mut Ctx, _req: &Request,
        ) -> Result<Option<Response>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some(
                Response::from_json(json!({ "error": "Forbidden" }))
                    .status(Status::Forbidden),
            ))
        }
    }

    #[test]
    fn test_middleware_snapshot() {
        let mut router: Router<Ctx> = Router::new();

        // Routes only see middlewares registered before them
        router.register_route("GET", "/early", trace);
        router.register_middleware(first);
        router.register_route("GET", "/mid", trace);
        router.register_middleware(second);
        router.register_route("GET", "/late", trace);

        for (path, expected) in
            [("/early", ""), ("/mid", "first"), ("/late", "first,second")]
        {
            let req = Request::new().path(path);
            let res = router.route(&req).expect("route must succeed");
            assert_eq!(res.body, expected, "chain mismatch for {path}");
        }
    }

    #[test]
    fn test_middleware_short_circuit() {
        let count = Arc::new(AtomicUsize::new(0));

        let mut router: Router<Ctx> = Router::new();
        router.register_middleware(first);
        router.register_middleware(Reject(Arc::clone(&count)));
        router.register_middleware(second);
        router.register_route("GET", "/", trace);

        // The rejecting middleware answers, the rest of the chain and the
        // handler must not run
        let res = router
            .route(&Request::new())
            .expect("route must succeed");
        assert_eq!(res.status, Status::Forbidden);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_route() {
        let router: Router<Ctx> = Router::new();
        let res = router
            .route(&Request::new().path("/missing"))
            .expect("route must succeed");

        assert_eq!(res.status, Status::NotFound);
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert_eq!(body, json!({ "error": "Not Found" }));
    }

    #[test]
    fn test_debug_route() {
        let mut router: Router<Ctx> = Router::new();
        router.register_middleware(first);
        router.register_debug_route("/debug");

        let req = Request::new()
            .method("POST")
            .path("/debug")
            .body(json!({ "a": 1 }));

        let res = router.route(&req).expect("route must succeed");
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert_eq!(body["request"]["method"], "POST");
        assert_eq!(body["request"]["body"], json!({ "a": 1 }));
        assert_eq!(body["context"]["trace"], json!(["first"]));
    }
}
