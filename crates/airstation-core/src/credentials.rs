//! Login credentials for the AirStation web console.
//!
//! Passwords are stored using [`SecretString`] from the `secrecy` crate so they
//! never end up in logs or `Debug` output. The password only leaves the secret
//! wrapper when it is RSA-encrypted for the login form.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Factory username of AirStation devices.
pub const DEFAULT_USERNAME: &str = "admin";

/// Factory password of AirStation devices.
pub const DEFAULT_PASSWORD: &str = "password";

/// Credentials for the device's `login.html` form.
///
/// # Example
///
/// ```
/// use airstation_core::Credentials;
///
/// let creds = Credentials::new("admin", "s3cret");
/// assert_eq!(creds.username, "admin");
/// assert_eq!(creds.expose_password(), "s3cret");
///
/// // Factory defaults
/// let factory = Credentials::default();
/// assert_eq!(factory.username, "admin");
/// ```
#[derive(Clone)]
pub struct Credentials {
    /// The console user, `admin` on stock firmware.
    pub username: String,
    password: SecretString,
}

impl Credentials {
    /// Creates new credentials with the given username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Exposes the password for the login handshake.
    ///
    /// Never log or display the returned value.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
            && self.password.expose_secret() == other.password.expose_secret()
    }
}

impl Eq for Credentials {}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
