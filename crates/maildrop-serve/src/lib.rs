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

//! Blocking HTTP/1.1 server.
//!
//! Note that this is not intended to be used in production. It implements a
//! deliberately restricted subset of HTTP/1.1 framing on top of blocking
//! sockets, serving exactly one request per connection on a single thread.
//! It's implemented with sync Rust and without an HTTP library to keep the
//! wire protocol fully visible, and to keep it as simple as possible.
//!
//! Known limitations, all of them intentional: no persistent connections, no
//! chunked transfer encoding, no TLS, no URL-decoding, no path parameters,
//! and no concurrency. A request is read with a single bounded read, so a
//! request exceeding the receive buffer, or arriving fragmented across TCP
//! segments, is truncated.

#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod handler;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;
