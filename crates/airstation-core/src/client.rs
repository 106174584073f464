//! Asynchronous client for one AirStation.
//!
//! Each operation comes in two forms: an `async fn`, and a `*_with_callback`
//! variant that spawns the operation on the current Tokio runtime and hands
//! the result to a closure. The closure runs on whichever worker thread
//! finishes the request. Callback operations are independent requests and
//! may complete in any order; chain them explicitly when order matters.

use std::{future::Future, sync::Arc};

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    credentials::Credentials,
    error::Error,
    form::DeviceCommand,
    response::DhcpReservation,
    session::{ProtocolAdapter, SessionState},
    transport::{ClientConfig, Transport},
};

/// Handle to one device.
///
/// Cloning is cheap; clones share the session and cookie store.
///
/// # Example
///
/// ```no_run
/// use airstation_core::{AirStation, ClientConfig, Credentials};
///
/// #[tokio::main]
/// async fn main() -> Result<(), airstation_core::Error> {
///     let station = AirStation::new(
///         ClientConfig::new("http://192.168.11.1"),
///         Credentials::new("admin", "password"),
///     )?;
///     station.login().await?;
///
///     for row in station.get_dhcp_table().await? {
///         println!("{} {} {}", row.ip, row.mac, row.lease);
///     }
///
///     station.close().await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AirStation {
    adapter: Arc<ProtocolAdapter>,
    credentials: Credentials,
}

impl AirStation {
    /// Creates a client with its own HTTP transport. No request is sent yet.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, Error> {
        Ok(Self {
            adapter: Arc::new(ProtocolAdapter::new(&config)?),
            credentials,
        })
    }

    /// Creates a client on top of a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        Ok(Self {
            adapter: Arc::new(ProtocolAdapter::with_transport(&config, transport)?),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        self.adapter.base_url()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn is_authenticated(&self) -> bool {
        self.adapter.is_authenticated()
    }

    pub fn state(&self) -> SessionState {
        self.adapter.state()
    }

    /// Logs in with the stored credentials.
    pub async fn login(&self) -> Result<(), Error> {
        self.adapter.login(&self.credentials).await
    }

    /// Logs out. The session is gone afterwards even if the request failed.
    pub async fn close(&self) {
        self.adapter.logout().await
    }

    /// Forgets the session without telling the device.
    pub fn discard_session(&self) -> bool {
        self.adapter.clear()
    }

    pub async fn get_json_param(&self, name: impl AsRef<str>) -> Result<Value, Error> {
        self.adapter.get_json_param(name.as_ref()).await
    }

    pub async fn set(&self, command: &DeviceCommand) -> Result<(), Error> {
        self.adapter.set(command).await
    }

    pub async fn get_form_page(&self, name: &str) -> Result<String, Error> {
        self.adapter.get_form_page(name).await
    }

    pub async fn get_dhcp_table(&self) -> Result<Vec<DhcpReservation>, Error> {
        self.adapter.get_dhcp_table().await
    }

    pub async fn update_dhcp_entry(&self, row: &DhcpReservation) -> Result<(), Error> {
        self.adapter.update_dhcp_entry(row).await
    }

    /// Spawns `operation` and feeds its output to `callback`.
    ///
    /// Must be called from within a Tokio runtime.
    fn spawn_with<T, Fut, F>(
        &self,
        operation: impl FnOnce(Self) -> Fut,
        callback: F,
    ) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        let future = operation(self.clone());
        tokio::spawn(async move { callback(future.await) })
    }

    pub fn login_with_callback<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), Error>) + Send + 'static,
    {
        self.spawn_with(|s| async move { s.login().await }, callback)
    }

    pub fn close_with_callback<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(()) + Send + 'static,
    {
        self.spawn_with(|s| async move { s.close().await }, callback)
    }

    pub fn get_json_param_with_callback<F>(
        &self,
        name: impl Into<String>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Value, Error>) + Send + 'static,
    {
        let name = name.into();
        self.spawn_with(|s| async move { s.get_json_param(name).await }, callback)
    }

    pub fn set_with_callback<F>(&self, command: DeviceCommand, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), Error>) + Send + 'static,
    {
        self.spawn_with(|s| async move { s.set(&command).await }, callback)
    }

    pub fn get_form_page_with_callback<F>(
        &self,
        name: impl Into<String>,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<String, Error>) + Send + 'static,
    {
        let name = name.into();
        self.spawn_with(|s| async move { s.get_form_page(&name).await }, callback)
    }

    pub fn get_dhcp_table_with_callback<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<DhcpReservation>, Error>) + Send + 'static,
    {
        self.spawn_with(|s| async move { s.get_dhcp_table().await }, callback)
    }

    pub fn update_dhcp_entry_with_callback<F>(
        &self,
        row: DhcpReservation,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), Error>) + Send + 'static,
    {
        self.spawn_with(|s| async move { s.update_dhcp_entry(&row).await }, callback)
    }
}
