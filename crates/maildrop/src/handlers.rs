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

//! Application handlers.

use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use maildrop_serve::handler::{Handler, Result};
use maildrop_serve::http::{Request, Response, Status};

use crate::auth;
use crate::context::Ctx;
use crate::mailer::Mailer;
use crate::models::{CreateMail, CreateUser, Credentials, Mail, User};
use crate::repository::{Repository, UserFilter};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Lifetime of the token cookie in seconds.
const TOKEN_MAX_AGE: u64 = 3600;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Application.
///
/// Owns the collaborators the handlers depend on. Handlers are associated
/// functions taking the application as their first argument, so they can be
/// registered on the router via [`App::bind`].
#[derive(Clone)]
pub struct App {
    /// User and mail storage.
    repository: Arc<dyn Repository>,
    /// Outgoing mail relay.
    mailer: Arc<dyn Mailer>,
}

/// Handler bound to an application.
pub struct Bound<F> {
    /// Bound application.
    app: App,
    /// Bound handler function.
    action: F,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl App {
    /// Creates an application with the given collaborators.
    #[inline]
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository>, mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self { repository, mailer }
    }

    /// Binds a handler function to the application.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use maildrop::config::MailSettings;
    /// use maildrop::context::Ctx;
    /// use maildrop::handlers::App;
    /// use maildrop::mailer::SmtpMailer;
    /// use maildrop::repository::MemoryRepository;
    /// use maildrop_serve::router::Router;
    ///
    /// // Create application
    /// let app = App::new(
    ///     Arc::new(MemoryRepository::new()),
    ///     Arc::new(SmtpMailer::new(MailSettings::default())),
    /// );
    ///
    /// // Create router and register handler
    /// let mut router: Router<Ctx> = Router::new();
    /// router.register_route("POST", "/user", app.bind(App::create_user));
    /// ```
    #[inline]
    pub fn bind<F>(&self, action: F) -> Bound<F>
    where
        F: Fn(&App, &Ctx, &Request) -> Result + Send + Sync + 'static,
    {
        Bound { app: self.clone(), action }
    }
}

impl App {
    /// Registers a user.
    ///
    /// Responds with `400` and validation detail when the payload doesn't
    /// match the registration schema, `409` when the username or email is
    /// already taken, and otherwise `200` with the public user projection.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if storage is inaccessible.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn create_user(app: &App, _ctx: &Ctx, req: &Request) -> Result {
        let create: CreateUser = match payload(req) {
            Ok(create) => create,
            Err(res) => return Ok(res),
        };

        // Check for duplicates - when both collide, email takes precedence
        let mut duplicate = None;
        for (field, filter) in [
            ("username", UserFilter::Username(create.username.clone())),
            ("email", UserFilter::Email(create.email.clone())),
        ] {
            if app.repository.find_user(&filter)?.is_some() {
                duplicate = Some(field);
            }
        }
        if let Some(field) = duplicate {
            return Ok(Response::from_json(json!({
                "error": format!("{} already taken", capitalize(field)),
                "field": field,
            }))
            .status(Status::Conflict));
        }

        // Store user with the hashed password
        let user = app.repository.create_user(User {
            id: String::new(),
            username: create.username,
            email: create.email,
            hashed_password: auth::hash_password(&create.password),
        })?;
        Ok(Response::from_json(serde_json::to_value(&user)?))
    }

    /// Logs a user in.
    ///
    /// Responds with `400` on a payload schema violation, `404` when the
    /// user is unknown, `401` when the password doesn't verify, and
    /// otherwise `200` with the token in the body and a `token` cookie.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if storage is inaccessible.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn login_user(app: &App, _ctx: &Ctx, req: &Request) -> Result {
        let credentials: Credentials = match payload(req) {
            Ok(credentials) => credentials,
            Err(res) => return Ok(res),
        };

        // Look up user by username
        let filter = UserFilter::Username(credentials.username.clone());
        let Some(user) = app.repository.find_user(&filter)? else {
            return Ok(Response::from_text("User not found")
                .status(Status::NotFound));
        };

        // Verify password against the stored hash
        if !auth::verify_password(&credentials.password, &user.hashed_password)
        {
            return Ok(Response::from_text("Invalid password")
                .status(Status::Unauthorized));
        }

        // Issue token carrying the public user projection
        let token = auth::build_token(&serde_json::to_string(&user)?);
        Ok(Response::from_json(json!({ "jwt": token })).set_cookie(
            "token",
            &token,
            TOKEN_MAX_AGE,
        ))
    }

    /// Lists all users.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if storage is inaccessible.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn get_users(app: &App, _ctx: &Ctx, _req: &Request) -> Result {
        let users = app.repository.users()?;
        Ok(Response::from_json(serde_json::to_value(&users)?))
    }

    /// Returns the authenticated user.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if the user can't be serialized.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn get_me(_app: &App, ctx: &Ctx, _req: &Request) -> Result {
        let Some(user) = &ctx.user else {
            return Ok(unauthorized());
        };
        Ok(Response::from_json(serde_json::to_value(user)?))
    }

    /// Composes and relays a mail.
    ///
    /// The mail is stored through the repository and relayed through the
    /// mailer. Relay failures are faults, not client errors - the caller
    /// sees a `500` while the detail lands in the log.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if storage is inaccessible or
    /// the relay fails.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn send_mail(app: &App, ctx: &Ctx, req: &Request) -> Result {
        let Some(user) = &ctx.user else {
            return Ok(unauthorized());
        };
        let create: CreateMail = match payload(req) {
            Ok(create) => create,
            Err(res) => return Ok(res),
        };

        // Store mail, then relay it
        let mail = app.repository.create_mail(Mail {
            id: String::new(),
            user_id: user.id.clone(),
            to: create.to,
            subject: create.subject,
            body: create.body,
        })?;
        app.mailer
            .send(&user.email, &mail.to, &mail.subject, &mail.body)?;
        Ok(Response::from_json(serde_json::to_value(&mail)?))
    }

    /// Lists the mails sent by the authenticated user.
    ///
    /// # Errors
    ///
    /// This function returns a [`Fault`][], if storage is inaccessible.
    ///
    /// [`Fault`]: maildrop_serve::handler::Fault
    pub fn get_mails(app: &App, ctx: &Ctx, _req: &Request) -> Result {
        let Some(user) = &ctx.user else {
            return Ok(unauthorized());
        };
        let mails = app.repository.mails_by_user(&user.id)?;
        Ok(Response::from_json(serde_json::to_value(&mails)?))
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<F> Handler<Ctx> for Bound<F>
where
    F: Fn(&App, &Ctx, &Request) -> Result + Send + Sync + 'static,
{
    #[inline]
    fn handle(&self, ctx: &Ctx, req: &Request) -> Result {
        (self.action)(&self.app, ctx, req)
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Extracts and validates the JSON payload of a request.
///
/// Schema violations are a client concern, so the error side carries the
/// ready-made `400` response instead of a fault.
fn payload<T>(req: &Request) -> std::result::Result<T, Response>
where
    T: DeserializeOwned,
{
    let Some(value) = req.body.as_json() else {
        return Err(Response::validation_error(json!({
            "error": "expected a JSON body"
        })));
    };
    serde_json::from_value(value.clone()).map_err(|err| {
        Response::validation_error(json!({ "error": err.to_string() }))
    })
}

/// Creates the response for an unauthenticated request.
fn unauthorized() -> Response {
    Response::from_text("Unauthorized").status(Status::Unauthorized)
}

/// Capitalizes the first character of a field name.
fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use std::sync::Mutex;

    use crate::mailer;
    use crate::middleware::inject_user;
    use crate::repository::MemoryRepository;

    use super::*;

    /// Mailer recording envelopes instead of relaying.
    #[derive(Debug, Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Mailer for RecordingMailer {
        fn send(
            &self, from: &str, to: &str, _subject: &str, _body: &str,
        ) -> mailer::Result {
            let mut sent = self.sent.lock().unwrap();
            sent.push((from.to_string(), to.to_string()));
            Ok(())
        }
    }

    fn app() -> (App, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        let app = App::new(
            Arc::new(MemoryRepository::new()),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
        );
        (app, mailer)
    }

    fn register(app: &App, username: &str, email: &str) -> Value {
        let req = Request::new().method("POST").path("/user").body(json!({
            "username": username,
            "email": email,
            "password": "hunter2",
        }));
        let res = App::create_user(app, &Ctx::default(), &req)
            .expect("must not fault");
        assert_eq!(res.status, Status::Ok);
        serde_json::from_str(&res.body).expect("body must be JSON")
    }

    #[test]
    fn test_create_user() {
        let (app, _) = app();
        let user = register(&app, "bob", "bob@example.com");

        assert_eq!(user["username"], "bob");
        assert_eq!(user["email"], "bob@example.com");
        assert_eq!(user["id"].as_str().map(str::len), Some(24));

        // The hashed password must never leak into the projection
        assert!(user.get("hashed_password").is_none());
    }

    #[test]
    fn test_create_user_validation() {
        let (app, _) = app();
        let req = Request::new()
            .body(json!({ "username": "bob", "email": "bob@example.com" }));
        let res = App::create_user(&app, &Ctx::default(), &req)
            .expect("must not fault");

        assert_eq!(res.status, Status::BadRequest);
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert!(body["error"].as_str().is_some());
    }

    #[test]
    fn test_create_user_duplicate() {
        let (app, _) = app();
        register(&app, "bob", "bob@example.com");

        let req = Request::new().body(json!({
            "username": "bob",
            "email": "other@example.com",
            "password": "hunter2",
        }));
        let res = App::create_user(&app, &Ctx::default(), &req)
            .expect("must not fault");

        assert_eq!(res.status, Status::Conflict);
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert_eq!(
            body,
            json!({ "error": "Username already taken", "field": "username" })
        );
    }

    #[test]
    fn test_login_user() {
        let (app, _) = app();
        register(&app, "bob", "bob@example.com");

        let req = Request::new()
            .body(json!({ "username": "bob", "password": "hunter2" }));
        let res = App::login_user(&app, &Ctx::default(), &req)
            .expect("must not fault");

        assert_eq!(res.status, Status::Ok);
        let cookie = res.headers.get("Set-Cookie");
        assert!(cookie.is_some_and(|c| c.starts_with("token=")));

        // The token payload must carry the public user projection
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        let token = body["jwt"].as_str().expect("token must be a string");
        let payload: Value =
            serde_json::from_str(token).expect("payload must be JSON");
        assert_eq!(payload["username"], "bob");
        assert!(payload.get("hashed_password").is_none());
    }

    #[test]
    fn test_login_user_unknown() {
        let (app, _) = app();
        let req = Request::new()
            .body(json!({ "username": "eve", "password": "hunter2" }));
        let res = App::login_user(&app, &Ctx::default(), &req)
            .expect("must not fault");

        assert_eq!(res.status, Status::NotFound);
        assert_eq!(res.body, "User not found");
    }

    #[test]
    fn test_login_user_bad_password() {
        let (app, _) = app();
        register(&app, "bob", "bob@example.com");

        let req = Request::new()
            .body(json!({ "username": "bob", "password": "wrong" }));
        let res = App::login_user(&app, &Ctx::default(), &req)
            .expect("must not fault");

        assert_eq!(res.status, Status::Unauthorized);
        assert_eq!(res.body, "Invalid password");
    }

    #[test]
    fn test_get_users() {
        let (app, _) = app();
        register(&app, "bob", "bob@example.com");
        register(&app, "alice", "alice@example.com");

        let res = App::get_users(&app, &Ctx::default(), &Request::new())
            .expect("must not fault");
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_mail_flow() {
        let (app, relay) = app();
        register(&app, "bob", "bob@example.com");

        // Log in and authenticate via the middleware, as a request would
        let req = Request::new()
            .body(json!({ "username": "bob", "password": "hunter2" }));
        let res = App::login_user(&app, &Ctx::default(), &req)
            .expect("must not fault");
        let body: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        let token = body["jwt"].as_str().expect("token must be a string");

        let mut ctx = Ctx::default();
        let req = Request::new().cookie("token", token);
        let res = inject_user(&mut ctx, &req).expect("must not fault");
        assert!(res.is_none());

        // Compose a mail and ensure it was stored and relayed
        let req = Request::new().body(json!({
            "to": "alice@example.com",
            "subject": "hi",
            "body": "hello",
        }));
        let res =
            App::send_mail(&app, &ctx, &req).expect("must not fault");
        assert_eq!(res.status, Status::Ok);
        assert_eq!(
            *relay.sent.lock().unwrap(),
            vec![(
                String::from("bob@example.com"),
                String::from("alice@example.com")
            )]
        );

        let res = App::get_mails(&app, &ctx, &Request::new())
            .expect("must not fault");
        let mails: Value =
            serde_json::from_str(&res.body).expect("body must be JSON");
        assert_eq!(mails[0]["subject"], "hi");
        assert_eq!(mails[0]["user_id"], ctx.user.unwrap().id);
    }

    #[test]
    fn test_get_me_unauthenticated() {
        let (app, _) = app();
        let res = App::get_me(&app, &Ctx::default(), &Request::new())
            .expect("must not fault");
        assert_eq!(res.status, Status::Unauthorized);
    }
}
