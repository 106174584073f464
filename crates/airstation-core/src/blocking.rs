//! Blocking client.
//!
//! Wraps the asynchronous [`crate::AirStation`] and a private current-thread
//! runtime, blocking on each operation. Do not use it from inside an async
//! context; use the asynchronous client there.

use std::{future::Future, sync::Arc};

use serde_json::Value;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::debug;

use crate::{
    client,
    credentials::Credentials,
    error::Error,
    form::DeviceCommand,
    response::DhcpReservation,
    session::SessionState,
    transport::{ClientConfig, Transport},
};

/// Blocking handle to one device.
///
/// Dropping it ends the session: local state is cleared at once and a
/// logout request is attempted.
///
/// # Example
///
/// ```no_run
/// use airstation_core::{ClientConfig, Credentials, JsonParam, blocking::AirStation};
///
/// fn main() -> Result<(), airstation_core::Error> {
///     let station = AirStation::new(ClientConfig::default(), Credentials::default())?;
///     station.login()?;
///     println!("{}", station.get_json_param(JsonParam::Device)?);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AirStation {
    inner: client::AirStation,
    /// Only `None` once `drop` has taken it.
    runtime: Option<Runtime>,
}

impl AirStation {
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, Error> {
        Ok(Self {
            inner: client::AirStation::new(config, credentials)?,
            runtime: Some(runtime()?),
        })
    }

    pub fn with_transport(
        config: ClientConfig,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        Ok(Self {
            inner: client::AirStation::with_transport(config, credentials, transport)?,
            runtime: Some(runtime()?),
        })
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    pub fn login(&self) -> Result<(), Error> {
        self.block_on(self.inner.login())
    }

    /// Logs out; the session is cleared whatever the device answers.
    pub fn close(&self) {
        match &self.runtime {
            Some(runtime) => runtime.block_on(self.inner.close()),
            None => {
                self.inner.discard_session();
            }
        }
    }

    pub fn get_json_param(&self, name: impl AsRef<str>) -> Result<Value, Error> {
        self.block_on(self.inner.get_json_param(name))
    }

    pub fn set(&self, command: &DeviceCommand) -> Result<(), Error> {
        self.block_on(self.inner.set(command))
    }

    pub fn get_form_page(&self, name: &str) -> Result<String, Error> {
        self.block_on(self.inner.get_form_page(name))
    }

    pub fn get_dhcp_table(&self) -> Result<Vec<DhcpReservation>, Error> {
        self.block_on(self.inner.get_dhcp_table())
    }

    pub fn update_dhcp_entry(&self, row: &DhcpReservation) -> Result<(), Error> {
        self.block_on(self.inner.update_dhcp_entry(row))
    }

    fn block_on<T>(&self, future: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        match &self.runtime {
            Some(runtime) => runtime.block_on(future),
            None => Err(Error::IoError("runtime is shut down".to_string())),
        }
    }
}

impl Drop for AirStation {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        if Handle::try_current().is_ok() {
            // No blocking here, not even to drop the runtime.
            if self.inner.is_authenticated() {
                self.inner.discard_session();
                debug!("Dropped inside a runtime, session discarded without logout");
            }
            runtime.shutdown_background();
            return;
        }
        if self.inner.is_authenticated() {
            runtime.block_on(self.inner.close());
        }
    }
}

fn runtime() -> Result<Runtime, Error> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}
