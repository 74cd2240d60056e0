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

//! Mailer.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use tracing::debug;

use crate::config::MailSettings;

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Mailer.
///
/// Handlers depend on this trait only, so tests can swap the relay for a
/// recording fake.
pub trait Mailer: Send + Sync {
    /// Sends a mail.
    ///
    /// # Errors
    ///
    /// This method returns an [`Error`], if the mail can't be relayed.
    fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result;
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// SMTP mailer.
///
/// Speaks a fixed line-oriented SMTP dialog over a raw TCP socket: greeting,
/// `EHLO`, `AUTH LOGIN` with base64 credentials, envelope, `DATA`, `QUIT`.
/// Relay responses are read line by line and logged, but their status codes
/// are not interpreted - a relay that rejects a step shows up as a dialog
/// running into a closed connection, not as a structured error.
#[derive(Debug)]
pub struct SmtpMailer {
    /// Relay settings.
    settings: MailSettings,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl SmtpMailer {
    /// Creates an SMTP mailer with the given settings.
    ///
    /// The relay connection is established per send, not here.
    #[inline]
    #[must_use]
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Mailer for SmtpMailer {
    fn send(&self, from: &str, to: &str, subject: &str, body: &str) -> Result {
        let settings = &self.settings;
        debug!("relaying mail from {from} to {to} via {}", settings.server);

        // Connect to relay and consume the greeting
        let stream =
            TcpStream::connect((settings.server.as_str(), settings.port))?;
        let mut relay = Dialog::new(stream)?;
        relay.recv()?;

        // Identify and authenticate with base64 credentials
        relay.send("EHLO maildrop")?;
        relay.send("AUTH LOGIN")?;
        relay.send(&STANDARD.encode(&settings.username))?;
        relay.send(&STANDARD.encode(&settings.password))?;

        // Announce envelope
        relay.send(&format!("MAIL FROM:<{from}>"))?;
        relay.send(&format!("RCPT TO:<{to}>"))?;

        // Transmit message, terminated by a lone dot
        relay.send("DATA")?;
        relay.send(&format!(
            "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\n\r\n{body}\r\n."
        ))?;

        // Close dialog
        relay.send("QUIT")?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------

/// SMTP dialog over a connection.
struct Dialog {
    /// Buffered relay responses.
    reader: BufReader<TcpStream>,
    /// Write side of the connection.
    writer: TcpStream,
}

impl Dialog {
    /// Creates a dialog over the given connection.
    fn new(stream: TcpStream) -> Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { reader, writer: stream })
    }

    /// Sends a line and consumes the relay's answer.
    fn send(&mut self, line: &str) -> Result {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\r\n")?;
        self.recv()
    }

    /// Consumes one answer line from the relay.
    fn recv(&mut self) -> Result {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(Error::Disconnected);
        }

        // Log answer for operators
        debug!("relay answered: {}", line.trim_end());
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Accepts one connection and plays a canned relay, answering `250` to
    /// every line while recording everything the client sent.
    fn scripted_relay() -> (u16, thread::JoinHandle<String>) {
        let listener =
            TcpListener::bind("127.0.0.1:0").expect("bind must succeed");
        let port = listener
            .local_addr()
            .expect("address must be known")
            .port();

        let handle = thread::spawn(move || {
            let (stream, _) =
                listener.accept().expect("accept must succeed");
            let mut reader = BufReader::new(
                stream.try_clone().expect("clone must succeed"),
            );
            let mut writer = stream;
            writer
                .write_all(b"220 fake ESMTP\r\n")
                .expect("write must succeed");

            // The client stops reading answers once its dialog is complete
            // and may reset the connection, so reads and writes past that
            // point must not panic
            let mut transcript = String::new();
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                transcript.push_str(&line);
                let _ = writer.write_all(b"250 OK\r\n");
                if line.starts_with("QUIT") {
                    break;
                }
            }

            // Consume any trailing bytes so the client can close cleanly
            let mut rest = Vec::new();
            let _ = reader.read_to_end(&mut rest);
            transcript
        });
        (port, handle)
    }

    #[test]
    fn test_smtp_dialog() {
        let (port, relay) = scripted_relay();
        let mailer = SmtpMailer::new(MailSettings {
            server: String::from("127.0.0.1"),
            port,
            username: String::from("bob"),
            password: String::from("hunter2"),
        });

        mailer
            .send("bob@example.com", "alice@example.com", "hi", "hello")
            .expect("send must succeed");

        let transcript = relay.join().expect("relay must finish");
        assert!(transcript.starts_with("EHLO maildrop\r\n"));
        assert!(transcript.contains("AUTH LOGIN\r\n"));
        assert!(transcript.contains(&format!("{}\r\n", STANDARD.encode("bob"))));
        assert!(
            transcript.contains(&format!("{}\r\n", STANDARD.encode("hunter2")))
        );
        assert!(transcript.contains("MAIL FROM:<bob@example.com>\r\n"));
        assert!(transcript.contains("RCPT TO:<alice@example.com>\r\n"));
        assert!(transcript.contains("Subject: hi\r\n"));
        assert!(transcript.ends_with("QUIT\r\n"));
    }

    #[test]
    fn test_relay_unreachable() {
        let mailer = SmtpMailer::new(MailSettings {
            server: String::from("127.0.0.1"),
            // Port 1 is practically never bound
            port: 1,
            username: String::from("bob"),
            password: String::from("hunter2"),
        });

        let res = mailer.send("a@example.com", "b@example.com", "s", "b");
        assert!(matches!(res, Err(Error::Connection(_))));
    }
}
