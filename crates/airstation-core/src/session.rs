//! Session handling and the login handshake.
//!
//! [`ProtocolAdapter`] is the only place that talks to the device. It owns
//! the session token pair, drives the login handshake and turns every
//! operation into a request for the [`Transport`].
//!
//! # Login handshake
//!
//! 1. GET the home page. A regular page means the cookie session is still
//!    live and there is nothing to do.
//! 2. Otherwise the login form is served. Pull the two session tokens and
//!    the RSA key out of it.
//! 3. Encrypt `airstation_pass=<password>` with that key.
//! 4. POST the login form. A redirect, or a page without an error banner,
//!    means the device accepted the credentials.
//!
//! # Concurrency
//!
//! Login and logout are serialised by an async mutex. Every other operation
//! takes a copy of the token pair when it builds its request and never
//! waits on that mutex.

use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use serde_json::Value;
use tokio::{sync::Mutex, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    credentials::Credentials,
    crypto::JsRsa,
    error::Error,
    form::{DeviceCommand, FormEncoder},
    protocol::{
        DHCP_LEASE_PAGE, Endpoints, RANDOM_DIGITS, dhcp_entry_command, epoch_millis,
        password_plaintext, random_digits,
    },
    response::{self, DhcpReservation, HomePage, SessionTokens},
    transport::{ClientConfig, HttpRequest, HttpResponse, HttpTransport, Transport},
};

/// Where the adapter is in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A login handshake is in flight.
    Authenticating,
    Authenticated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticating => write!(f, "authenticating"),
            SessionState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Lowers the authenticating flag when the login future finishes or is dropped.
struct AuthenticatingGuard<'a>(&'a AtomicBool);

impl<'a> AuthenticatingGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Session owner and request driver for one device.
pub struct ProtocolAdapter {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    timeout: Duration,
    session: RwLock<Option<SessionTokens>>,
    transition: Mutex<()>,
    authenticating: AtomicBool,
}

impl ProtocolAdapter {
    /// Creates an adapter with a fresh [`HttpTransport`] and cookie store.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates an adapter on top of an existing transport.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let encoder = FormEncoder::for_label(&config.encoding)?;
        Ok(Self {
            transport,
            endpoints: Endpoints::new(config.base_url.as_str(), encoder),
            timeout: config.timeout,
            session: RwLock::new(None),
            transition: Mutex::new(()),
            authenticating: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        self.endpoints.base_url()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(SessionTokens::is_complete)
    }

    pub fn state(&self) -> SessionState {
        if self.authenticating.load(Ordering::SeqCst) {
            SessionState::Authenticating
        } else if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Logs in unless the device reports a live session already.
    ///
    /// Rejected credentials fail with [`Error::AuthenticationFailed`] and
    /// leave the adapter unauthenticated. A transport failure or timeout
    /// leaves the session as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        let _gate = self.transition.lock().await;
        let _flag = AuthenticatingGuard::raise(&self.authenticating);

        debug!(url = %self.endpoints.base_url(), "Fetching home page");
        let home = self.send(self.endpoints.home()).await?;
        let challenge = match response::home_page(&home.body)? {
            HomePage::Authenticated => {
                debug!("Device reports an active session, skipping login");
                return Ok(());
            }
            HomePage::LoginRequired(challenge) => challenge,
        };

        let rsa = JsRsa::from_params(&challenge.key)?;
        debug!(key_bits = rsa.block_len() * 8, "Encrypting password");
        let encrypted = rsa.encrypt(&password_plaintext(credentials.expose_password()))?;

        debug!(user = %credentials.username, "Submitting login form");
        let request = self
            .endpoints
            .login(&credentials.username, &challenge.tokens, &encrypted);
        let answer = self.send(request).await?;

        if let Err(err) = login_outcome(&answer) {
            self.clear();
            warn!(user = %credentials.username, error = %err, "Login rejected");
            return Err(err);
        }

        self.store(challenge.tokens);
        info!(user = %credentials.username, url = %self.endpoints.base_url(), "Logged in");
        Ok(())
    }

    /// Clears the session and tells the device to log out.
    ///
    /// The session is cleared before the request goes out; a failed logout
    /// is logged and otherwise ignored. Without a session no request is sent.
    pub async fn logout(&self) {
        let had_session = self.clear();
        let _gate = self.transition.lock().await;
        // A login that held the gate may have stored tokens meanwhile.
        let had_session = self.clear() || had_session;

        if !had_session {
            debug!("No session to log out of");
            return;
        }

        match self.send(self.endpoints.logout()).await {
            Ok(_) => info!(url = %self.endpoints.base_url(), "Logged out"),
            Err(err) => warn!(error = %err, "Logout request failed, session cleared anyway"),
        }
    }

    /// Drops the session without contacting the device.
    ///
    /// Returns `true` if there was one.
    pub fn clear(&self) -> bool {
        self.session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Fetches a named JSON dataset (`WIRELESS`, `DEVICE`, ...).
    pub async fn get_json_param(&self, name: &str) -> Result<Value, Error> {
        self.snapshot()?;
        debug!(param = name, "Fetching JSON parameter");
        let answer = self
            .send(self.endpoints.json_param(name, epoch_millis()))
            .await?;
        response::json_param(&answer.body)
    }

    /// Submits a command; the device must answer `OK`.
    pub async fn set(&self, command: &DeviceCommand) -> Result<(), Error> {
        self.snapshot()?;
        debug!(fields = ?command.keys().collect::<Vec<_>>(), "Submitting command");
        let answer = self.send(self.endpoints.set(command, epoch_millis())).await?;
        response::command_result(&answer.body)
    }

    /// Fetches a form page by file name and returns its HTML.
    pub async fn get_form_page(&self, name: &str) -> Result<String, Error> {
        self.snapshot()?;
        debug!(page = name, "Fetching form page");
        let answer = self
            .send(self.endpoints.form_page(name, random_digits(RANDOM_DIGITS)))
            .await?;
        response::check_device_error(&answer.body)?;
        Ok(answer.body)
    }

    /// Reads the DHCP reservation table.
    pub async fn get_dhcp_table(&self) -> Result<Vec<DhcpReservation>, Error> {
        let page = self.get_form_page(DHCP_LEASE_PAGE).await?;
        response::dhcp_reservations(&page)
    }

    /// Saves `row` through the reservation edit form.
    pub async fn update_dhcp_entry(&self, row: &DhcpReservation) -> Result<(), Error> {
        let tokens = self.snapshot()?;
        debug!(row = %row.row_id, ip = %row.ip, "Updating DHCP reservation");
        self.set(&dhcp_entry_command(row, &tokens)).await
    }

    /// A copy of the current token pair, or [`Error::NotAuthenticated`].
    fn snapshot(&self) -> Result<SessionTokens, Error> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|tokens| tokens.is_complete())
            .cloned()
            .ok_or(Error::NotAuthenticated)
    }

    fn store(&self, tokens: SessionTokens) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        timeout(self.timeout, self.transport.execute(request))
            .await
            .map_err(|_| Error::Timeout(format!("no answer within {:?}", self.timeout)))?
    }
}

impl std::fmt::Debug for ProtocolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolAdapter")
            .field("base_url", &self.endpoints.base_url())
            .field("timeout", &self.timeout)
            .field("state", &self.state())
            .finish()
    }
}

/// Decides whether the answer to the login post means success.
fn login_outcome(answer: &HttpResponse) -> Result<(), Error> {
    if answer.is_redirect() {
        return Ok(());
    }
    match response::is_login_page(&answer.body) {
        Ok(false) => Ok(()),
        Ok(true) => Err(Error::AuthenticationFailed(
            "device served the login page again".into(),
        )),
        Err(Error::DeviceError(message)) => Err(Error::AuthenticationFailed(message)),
        Err(other) => Err(other),
    }
}
