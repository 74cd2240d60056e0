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

//! Server integration tests.

use anyhow::anyhow;
use serde_json::{Value, json};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;

use maildrop_serve::handler::Result;
use maildrop_serve::http::{Request, Response};
use maildrop_serve::router::Router;
use maildrop_serve::server::Server;

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Binds a server on an ephemeral port and runs it on its own thread.
fn spawn(router: Router<()>) -> SocketAddr {
    let addr = "127.0.0.1:0".parse().expect("address must parse");
    let server = Server::bind(addr, router).expect("server must bind");
    let addr = server.local_addr().expect("address must be known");

    // The accept loop blocks forever, so the thread is detached
    thread::spawn(move || server.run());
    addr
}

/// Sends raw bytes on a fresh connection and reads the entire answer.
fn exchange(addr: SocketAddr, bytes: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect must succeed");
    stream.write_all(bytes).expect("write must succeed");

    // The server half-closes after one response, so reading to the end of
    // the stream yields exactly that response
    let mut message = String::new();
    stream
        .read_to_string(&mut message)
        .expect("read must succeed");
    message
}

fn hello(_ctx: &(), _req: &Request) -> Result {
    Ok(Response::from_text("Hello, world!"))
}

fn broken(_ctx: &(), _req: &Request) -> Result {
    Err(anyhow!("collaborator unavailable"))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[test]
fn test_request_response() {
    let mut router = Router::new();
    router.register_route("GET", "/", hello);

    let addr = spawn(router);
    let message = exchange(addr, b"GET / HTTP/1.1\r\n\r\n");
    assert_eq!(
        message,
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 13\r\n\
         \r\n\
         Hello, world!"
    );
}

#[test]
fn test_unknown_route() {
    let addr = spawn(Router::new());
    let message = exchange(addr, b"GET /missing HTTP/1.1\r\n\r\n");
    assert!(message.starts_with("HTTP/1.1 404 Not Found\r\n"));

    let body = message
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .expect("response must contain a body");
    let body: Value = serde_json::from_str(body).expect("body must be JSON");
    assert_eq!(body, json!({ "error": "Not Found" }));
}

#[test]
fn test_handler_fault() {
    let mut router = Router::new();
    router.register_route("GET", "/", broken);

    let addr = spawn(router);
    let message = exchange(addr, b"GET / HTTP/1.1\r\n\r\n");
    assert!(message.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(message.ends_with("Internal Server Error"));
}

#[test]
fn test_malformed_request() {
    let addr = spawn(Router::new());
    let message = exchange(addr, b"GET /\r\n\r\n");
    assert!(message.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
}

#[test]
fn test_one_request_per_connection() {
    let mut router = Router::new();
    router.register_route("GET", "/", hello);

    // The first request is answered, after which the server half-closes
    // the connection, so a second request on it must yield nothing
    let addr = spawn(router);
    let mut stream = TcpStream::connect(addr).expect("connect must succeed");
    stream
        .write_all(b"GET / HTTP/1.1\r\n\r\n")
        .expect("write must succeed");

    let mut message = String::new();
    stream
        .read_to_string(&mut message)
        .expect("read must succeed");
    assert!(message.ends_with("Hello, world!"));

    // Fresh connections keep being served
    let message = exchange(addr, b"GET / HTTP/1.1\r\n\r\n");
    assert!(message.ends_with("Hello, world!"));
}
