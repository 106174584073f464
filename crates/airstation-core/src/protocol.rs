//! Request construction for the console's single CGI entry point.
//!
//! | Purpose            | Method | Query                                          |
//! |--------------------|--------|------------------------------------------------|
//! | home / login page  | GET    | `req=twz`                                      |
//! | submit login       | POST   | `req=inp&res=login.html`                       |
//! | logout             | GET    | `req=twz&frm=logout.html`                      |
//! | JSON parameter     | POST   | `req=fnc&fnc=%24{get_json_param(NAME,<ms>)}`   |
//! | command            | POST   | `req=set&t=<ms>`                               |
//! | form page          | GET    | `req=frm&frm=<name>&rnd=<8 digits>`            |
//!
//! The console caches aggressively, so the JSON, command and form page
//! requests carry a timestamp or random number that changes per call.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::{
    form::{DeviceCommand, FormEncoder},
    response::{DhcpReservation, SESSION_ID_FIELD, SESSION_NUM_FIELD, SessionTokens},
    transport::HttpRequest,
};

/// Path of the CGI handler, relative to the base URL.
pub const CGI_PATH: &str = "/cgi-bin/cgi";

/// Form page holding the DHCP reservation table.
pub const DHCP_LEASE_PAGE: &str = "dhcps_lease.html";

/// Prefix of the login form field carrying the password.
const PASSWORD_PREFIX: &str = "airstation_pass=";

/// Digits in the `rnd` value of form page requests.
pub const RANDOM_DIGITS: u32 = 8;

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// A random number with exactly `digits` decimal digits.
pub fn random_digits(digits: u32) -> u64 {
    let digits = digits.clamp(1, 19);
    let low = 10u64.pow(digits - 1);
    let high = low.saturating_mul(10);
    rand::rng().random_range(low..high)
}

/// The plaintext that gets RSA-encrypted into the `encrypted` login field.
pub fn password_plaintext(password: &str) -> String {
    format!("{}{}", PASSWORD_PREFIX, password)
}

/// Builds every request the client sends.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    encoder: FormEncoder,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, encoder: FormEncoder) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            encoder,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cgi(&self, query: &str) -> String {
        format!("{}{}?{}", self.base_url, CGI_PATH, query)
    }

    pub fn home(&self) -> HttpRequest {
        HttpRequest::get(self.cgi("req=twz"))
    }

    /// The login form post.
    ///
    /// `encrypted` is the output of the RSA step over
    /// [`password_plaintext`].
    pub fn login(&self, username: &str, tokens: &SessionTokens, encrypted: &str) -> HttpRequest {
        let form = DeviceCommand::new()
            .with("lang", "auto")
            .with("airstation_uname", username)
            .with(SESSION_NUM_FIELD, tokens.num.as_str())
            .with(SESSION_ID_FIELD, tokens.id.as_str())
            .with("encrypted", encrypted);
        HttpRequest::post_form(self.cgi("req=inp&res=login.html"), self.encoder.encode(&form))
    }

    pub fn logout(&self) -> HttpRequest {
        HttpRequest::get(self.cgi("req=twz&frm=logout.html"))
    }

    pub fn json_param(&self, name: &str, timestamp: u128) -> HttpRequest {
        HttpRequest::post_form(
            self.cgi(&format!(
                "req=fnc&fnc=%24{{get_json_param({},{})}}",
                query_value(name),
                timestamp
            )),
            "",
        )
    }

    pub fn set(&self, command: &DeviceCommand, timestamp: u128) -> HttpRequest {
        HttpRequest::post_form(
            self.cgi(&format!("req=set&t={}", timestamp)),
            self.encoder.encode(command),
        )
    }

    pub fn form_page(&self, name: &str, rnd: u64) -> HttpRequest {
        HttpRequest::get(self.cgi(&format!(
            "req=frm&frm={}&rnd={}",
            query_value(name),
            rnd
        )))
    }
}

/// Percent-encodes a caller-supplied name so it stays one query value.
fn query_value(name: &str) -> String {
    form_urlencoded::byte_serialize(name.as_bytes()).collect()
}

/// Fields the reservation form expects when saving `row`.
pub fn dhcp_entry_command(row: &DhcpReservation, tokens: &SessionTokens) -> DeviceCommand {
    let id = row.row_id.as_str();
    DeviceCommand::new()
        .with(SESSION_NUM_FIELD, tokens.num.as_str())
        .with(SESSION_ID_FIELD, tokens.id.as_str())
        .with(format!("manip{}", id), row.ip.as_str())
        .with(format!("manmac{}", id), row.mac.as_str())
        .with("EDITID", id)
        .with(format!("DOFIX{}", id), "Save")
}
