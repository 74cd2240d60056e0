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

//! Configuration.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

mod error;

pub use error::{Error, Result};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Name of the configuration file.
const CONFIG_FILE: &str = "maildrop.toml";

/// Placeholder value that must be changed before deployment.
const DEFAULT_SECRET: &str = "changethis";

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Settings.
///
/// Every field has a default, so the binary runs without a configuration
/// file. Secrets can additionally be supplied through environment variables,
/// which take precedence over the file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Port the server listens on.
    pub port: u16,
    /// Log level filter, unless overridden by `RUST_LOG`.
    pub log_level: String,
    /// Relay settings.
    pub mail: MailSettings,
}

/// Relay settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Relay host.
    pub server: String,
    /// Relay port.
    pub port: u16,
    /// Relay username.
    pub username: String,
    /// Relay password.
    pub password: String,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Settings {
    /// Loads the settings.
    ///
    /// Settings are read from `maildrop.toml` in the working directory, if
    /// present, and otherwise fall back to their defaults. The relay
    /// credentials can be overridden with `MAILDROP_MAIL_USERNAME` and
    /// `MAILDROP_MAIL_PASSWORD`, so secrets can be kept out of the file.
    ///
    /// # Errors
    ///
    /// This function returns an [`Error`], if the configuration file exists
    /// but can't be read or deserialized.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        let mut settings = if path.is_file() {
            toml::from_str(&fs::read_to_string(path)?)?
        } else {
            Self::default()
        };

        // Environment variables take precedence for secrets
        if let Ok(username) = env::var("MAILDROP_MAIL_USERNAME") {
            settings.mail.username = username;
        }
        if let Ok(password) = env::var("MAILDROP_MAIL_PASSWORD") {
            settings.mail.password = password;
        }
        Ok(settings)
    }

    /// Warns about secrets still carrying their placeholder value.
    pub fn warn_on_default_secrets(&self) {
        for (name, value) in [
            ("mail.username", &self.mail.username),
            ("mail.password", &self.mail.password),
        ] {
            if value == DEFAULT_SECRET {
                warn!("the value of {name} is \"{DEFAULT_SECRET}\", change it");
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Trait implementations
// ----------------------------------------------------------------------------

impl Default for Settings {
    /// Creates default settings.
    fn default() -> Self {
        Self {
            port: 6969,
            log_level: String::from("debug"),
            mail: MailSettings::default(),
        }
    }
}

impl Default for MailSettings {
    /// Creates default relay settings.
    fn default() -> Self {
        Self {
            server: String::from("localhost"),
            port: 25,
            username: String::from(DEFAULT_SECRET),
            password: String::from(DEFAULT_SECRET),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            "port = 8080\n\
             \n\
             [mail]\n\
             server = \"relay.example.com\"\n",
        )
        .expect("settings must deserialize");

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.mail.server, "relay.example.com");
        assert_eq!(settings.mail.port, 25);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 6969);
        assert_eq!(settings.mail.username, DEFAULT_SECRET);
    }
}
