//! Core library for controlling Buffalo AirStation routers.
//!
//! AirStation firmware has no API. Everything goes through the HTML web
//! console behind a single CGI endpoint, `/cgi-bin/cgi`. This crate logs in
//! the way the console's own JavaScript does, keeps the session, and turns
//! the console's HTML and JSON answers into typed results.
//!
//! # Example
//!
//! ```no_run
//! use airstation_core::{AirStation, ClientConfig, Credentials, JsonParam, commands};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), airstation_core::Error> {
//!     let station = AirStation::new(ClientConfig::default(), Credentials::default())?;
//!     station.login().await?;
//!
//!     let device = station.get_json_param(JsonParam::Device).await?;
//!     println!("{}", device);
//!
//!     station.set(&commands::wake_on_lan("aa:bb:cc:dd:ee:ff")).await?;
//!     station.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Protocol Details
//!
//! 1. `GET req=twz` serves either the login form or, with a live cookie
//!    session, the main page.
//! 2. The login form carries two session tokens (`sWebSessionid`,
//!    `sWebSessionnum`) and an RSA public key inside its script.
//! 3. `airstation_pass=<password>` is encrypted with that key using the
//!    console's browser RSA variant ([`crypto::jsrsa`]) and posted with the
//!    tokens.
//! 4. Queries (`get_json_param`) and commands (`set`) carry a timestamp so the
//!    console does not answer from its cache.
//! 5. Failures come back as `200 OK` pages with an `errortxt` banner, or as a
//!    `set` answer other than `OK`.

pub mod blocking;
pub mod client;
pub mod commands;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod form;
pub mod protocol;
pub mod response;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::AirStation;
pub use commands::JsonParam;
pub use credentials::Credentials;
pub use error::Error;
pub use form::DeviceCommand;
pub use response::{DhcpReservation, ResponseKind};
pub use session::{ProtocolAdapter, SessionState};
pub use transport::{ClientConfig, DEFAULT_TIMEOUT, DEFAULT_URL};

/// The version of the airstation-core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
