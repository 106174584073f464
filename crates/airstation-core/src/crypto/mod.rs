//! Cryptography used by the AirStation web console.
//!
//! The console never exchanges plaintext passwords: the login page embeds an
//! RSA public key and its script encrypts the password field client side.
//! [`jsrsa`] reproduces that script.

pub mod jsrsa;

pub use jsrsa::{JsRsa, PADDING_OVERHEAD, RsaKeyParams, encrypt, hex_to_base64, packed_len};
