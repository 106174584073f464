//! Transport layer between the session logic and the device.
//!
//! The session code never talks HTTP directly: it builds [`HttpRequest`]
//! values and hands them to a [`Transport`]. [`HttpTransport`] is the real
//! implementation; tests substitute a scripted one.

pub mod http;

pub use http::HttpTransport;

use std::time::Duration;

use async_trait::async_trait;

use crate::{error::Error, form::DEFAULT_ENCODING};

/// Factory address of AirStation routers.
pub const DEFAULT_URL: &str = "http://192.168.11.1";

/// Default timeout for transport operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method of a device request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully built request to the CGI endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Form-encoded body; `Some` for every POST, even empty ones.
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post_form(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body.into()),
        }
    }
}

/// What came back from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Returns `true` for 3xx answers that were not followed.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Configuration for talking to one device.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the console, without trailing slash.
    pub base_url: String,
    /// Applied to every request; an expired request fails with [`Error::Timeout`].
    pub timeout: Duration,
    /// Charset label for form bodies.
    pub encoding: String,
    /// Follow the redirect the console sends after a successful login.
    pub follow_redirects: bool,
}

impl ClientConfig {
    /// Creates a configuration for the console at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            encoding: DEFAULT_ENCODING.to_string(),
            follow_redirects: true,
        }
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the form body charset.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Enables or disables redirect following.
    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Trait for whatever carries requests to the device.
///
/// Implementations own the cookie store; session cookies are expected to
/// persist across calls on the same instance.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the device's answer.
    ///
    /// Network failures map to [`Error::ConnectionFailed`],
    /// [`Error::Timeout`] or [`Error::Http`].
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}
