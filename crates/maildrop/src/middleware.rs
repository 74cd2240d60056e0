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

//! Application middleware.

use tracing::debug;

use maildrop_serve::handler::Result;
use maildrop_serve::http::{Request, Response, Status};

use crate::auth;
use crate::context::Ctx;
use crate::models::User;

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Authenticates the request and stores the user in the context.
///
/// The `token` cookie is verified and its payload decoded into a user,
/// which the handlers behind this middleware read from the context. Any
/// failure short-circuits with a `401 Unauthorized` - the handler never
/// runs for an unauthenticated request.
pub fn inject_user(ctx: &mut Ctx, req: &Request) -> Result<Option<Response>> {
    let Ok(payload) = auth::verify_token(req.cookies.get("token")) else {
        return Ok(Some(unauthorized()));
    };

    // Decode user from token payload
    let Ok(user) = serde_json::from_str::<User>(&payload) else {
        return Ok(Some(unauthorized()));
    };

    // Store user in context
    debug!("authenticated as {}", user.username);
    ctx.user = Some(user);
    Ok(None)
}

/// Creates the response for an unauthenticated request.
fn unauthorized() -> Response {
    Response::from_text("Unauthorized").status(Status::Unauthorized)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_inject_user() {
        let token = json!({
            "id": "651f7a3f9b2e4c5d6a7b8c9d",
            "username": "bob",
            "email": "bob@example.com",
        })
        .to_string();

        let req = Request::new().cookie("token", token);
        let mut ctx = Ctx::default();
        let res = inject_user(&mut ctx, &req).expect("must not fault");

        assert!(res.is_none());
        let user = ctx.user.expect("user must be set");
        assert_eq!(user.username, "bob");
        assert_eq!(user.hashed_password, "");
    }

    #[test]
    fn test_inject_user_missing_token() {
        let mut ctx = Ctx::default();
        let res = inject_user(&mut ctx, &Request::new())
            .expect("must not fault")
            .expect("must short-circuit");

        assert_eq!(res.status, Status::Unauthorized);
        assert!(ctx.user.is_none());
    }

    #[test]
    fn test_inject_user_undecodable_payload() {
        let req = Request::new().cookie("token", "not json");
        let mut ctx = Ctx::default();
        let res = inject_user(&mut ctx, &req)
            .expect("must not fault")
            .expect("must short-circuit");

        assert_eq!(res.status, Status::Unauthorized);
    }
}
