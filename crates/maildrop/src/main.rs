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

//! Webmail backend entry point.

use anyhow::Result;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use maildrop::config::Settings;
use maildrop::context::Ctx;
use maildrop::handlers::App;
use maildrop::mailer::SmtpMailer;
use maildrop::middleware::inject_user;
use maildrop::repository::MemoryRepository;
use maildrop_serve::router::Router;
use maildrop_serve::server::Server;

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Runs the server.
fn main() -> Result<()> {
    let settings = Settings::load()?;

    // Initialize logging, letting `RUST_LOG` override the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();
    settings.warn_on_default_secrets();

    // Create application with its collaborators
    let app = App::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(SmtpMailer::new(settings.mail.clone())),
    );

    // Register routes - the order matters, as each route snapshots the
    // middlewares registered before it: registration and login are public,
    // everything after `inject_user` requires authentication
    let mut router: Router<Ctx> = Router::new();
    router.register_route("POST", "/user", app.bind(App::create_user));
    router.register_route("POST", "/login", app.bind(App::login_user));
    router.register_route("GET", "/users", app.bind(App::get_users));
    router.register_debug_route("/debug");
    router.register_middleware(inject_user);
    router.register_route("GET", "/me", app.bind(App::get_me));
    router.register_route("POST", "/mail", app.bind(App::send_mail));
    router.register_route("GET", "/mails", app.bind(App::get_mails));

    // Bind server and run the accept loop
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port));
    let server = Server::bind(addr, router)?;
    server.run()?;
    Ok(())
}
