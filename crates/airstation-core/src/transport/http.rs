//! HTTP transport backed by `reqwest`.
//!
//! The console is plain HTTP on the LAN. Session cookies are kept in the
//! client's in-memory cookie store, one store per transport instance.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy};
use tracing::debug;

use crate::{
    error::Error,
    form::FORM_CONTENT_TYPE,
    transport::{ClientConfig, HttpRequest, HttpResponse, Method, Transport},
};

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Transport using a cookie-keeping `reqwest` client.
///
/// # Example
///
/// ```no_run
/// use airstation_core::transport::{ClientConfig, HttpRequest, HttpTransport, Transport};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let transport = HttpTransport::new(&ClientConfig::default())?;
///     let response = transport
///         .execute(HttpRequest::get("http://192.168.11.1/cgi-bin/cgi?req=twz"))
///         .await?;
///     println!("{}", response.status);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client honouring the timeout and redirect settings of `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let redirect = if config.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(redirect)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self
                .client
                .post(&request.url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(request.body.unwrap_or_default()),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse { status, body })
    }
}
