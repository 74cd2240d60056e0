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

//! Server.

use socket2::{Domain, Protocol, Socket, Type};
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use tracing::{debug, error, info};

use super::handler::Fault;
use super::http::{Request, Response, Status};
use super::router::Router;

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Size of the receive buffer.
///
/// Each connection is read exactly once into a buffer of this size, without
/// a read loop. A request exceeding the buffer, or arriving fragmented after
/// the first read, is truncated and rejected as malformed.
pub const RECV_BUFFER_SIZE: usize = 4096;

/// Maximum number of drain reads before closing a connection.
const DRAIN_ATTEMPTS: usize = 64;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Blocking HTTP server.
///
/// The server couples a bound listener with a [`Router`] and serves exactly
/// one request per accepted connection on a single thread. The listen
/// backlog is 1, so accepting is effectively serialized - this is intended
/// minimalism, not a tuning choice.
///
/// # Examples
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use maildrop_serve::router::Router;
/// use maildrop_serve::server::Server;
///
/// // Create router
/// let router: Router<()> = Router::new();
///
/// // Create server
/// let server = Server::bind("127.0.0.1:0".parse()?, router)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Server<C> {
    /// Bound listener.
    listener: TcpListener,
    /// Router serving all connections.
    router: Router<C>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl<C> Server<C> {
    /// Creates a server bound to the given address.
    ///
    /// The listener is created with address reuse enabled and a backlog
    /// of 1, and stays bound for the lifetime of the server.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if the socket can't be created or
    /// bound, e.g., because the address is already in use.
    pub fn bind(addr: SocketAddr, router: Router<C>) -> Result<Self> {
        let socket = Socket::new(
            Domain::for_address(addr),
            Type::STREAM,
            Some(Protocol::TCP),
        )?;

        // Bind socket and start listening with a backlog of 1
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(1)?;

        // Return server
        info!("listening on {addr}");
        Ok(Self { listener: socket.into(), router })
    }

    /// Returns the local address the server is bound to.
    ///
    /// This is primarily useful when binding to port 0, which lets the
    /// operating system pick a free port.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if the local address can't be
    /// obtained from the socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

impl<C> Server<C>
where
    C: Default + 'static,
{
    /// Runs the accept loop.
    ///
    /// This method blocks forever: each iteration accepts a connection,
    /// serves a single request on it, and continues to the next connection.
    /// Errors while serving a connection are logged and never terminate the
    /// loop - only a failing accept does.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if a connection can't be accepted.
    pub fn run(&self) -> Result {
        loop {
            let (stream, peer) = self.listener.accept()?;
            info!("{peer}: connection established");

            // Serve connection, logging but swallowing errors
            if let Err(err) = self.serve(stream, peer) {
                error!("{peer}: {err}");
            }
        }
    }

    /// Serves a single request on the given connection.
    ///
    /// The connection is read exactly once into a bounded buffer. A parse
    /// failure or a fault raised while routing is logged with full detail
    /// and answered with a generic `500 Internal Server Error`, so a single
    /// bad request never takes the server down.
    ///
    /// After writing the response, the write side is shut down and trailing
    /// client bytes are drained with a bounded number of reads before the
    /// socket is closed. This avoids a connection-reset race with a client
    /// that is still writing when the server closes.
    fn serve(&self, mut stream: TcpStream, peer: SocketAddr) -> io::Result<()> {
        let mut buffer = [0; RECV_BUFFER_SIZE];
        let size = stream.read(&mut buffer)?;

        // Parse and route request - any fault is mapped to a fixed 500
        // response, with full detail recorded for operators
        let result = Request::from_bytes(&buffer[..size])
            .map_err(Fault::from)
            .and_then(|req| {
                debug!("{peer}: received request: {req}");
                self.router.route(&req)
            });
        let res = result.unwrap_or_else(|fault| {
            error!("{peer}: {fault:#}");
            Response::from_text("Internal Server Error")
                .status(Status::InternalServerError)
        });

        // Serialize and send response
        info!("{peer}: responding with status {}", res.status);
        stream.write_all(&res.into_bytes())?;
        stream.shutdown(Shutdown::Write)?;

        // Drain trailing client bytes before closing
        for _ in 0..DRAIN_ATTEMPTS {
            if stream.read(&mut buffer)? == 0 {
                break;
            }
        }

        // Close connection by dropping the stream
        info!("{peer}: connection closed");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl<C> fmt::Display for Server<C> {
    /// Formats the server for display.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.listener.local_addr() {
            Ok(addr) => write!(f, "server on {addr}"),
            Err(_) => f.write_str("server"),
        }
    }
}
