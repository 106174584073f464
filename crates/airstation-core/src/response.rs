//! Interpretation of the console's HTML and JSON responses.
//!
//! The device has no status codes worth reading: a failed action still comes
//! back as `200 OK` with an HTML page whose error banner is an element of
//! class `errortxt`. Every function here runs that check first, so callers
//! never scan HTML for errors themselves.
//!
//! All functions take the raw body and return owned data, so no parsed
//! document outlives the call.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{crypto::RsaKeyParams, error::Error};

/// Class of the device's error banner.
pub const ERROR_CLASS: &str = "errortxt";

/// Class of the DHCP reservation table.
pub const TABLE_CLASS: &str = "AD_LIST";

/// Hidden login form field holding the session id.
pub const SESSION_ID_FIELD: &str = "sWebSessionid";

/// Hidden login form field holding the session number.
pub const SESSION_NUM_FIELD: &str = "sWebSessionnum";

const EXPONENT_MARKER: &str = "exponent = \"";
const MODULUS_MARKER: &str = "modulus = \"";

/// Length of the `fix` prefix on reservation submit buttons.
const ROW_ID_PREFIX_LEN: usize = 3;

/// The two tokens identifying a console session.
///
/// A session is authenticated only when both are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub id: String,
    pub num: String,
}

impl SessionTokens {
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.num.is_empty()
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id", &"[REDACTED]")
            .field("num", &"[REDACTED]")
            .finish()
    }
}

/// What a login page hands out for one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginChallenge {
    pub tokens: SessionTokens,
    pub key: RsaKeyParams,
}

/// Result of fetching the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomePage {
    /// The console served its login form.
    LoginRequired(LoginChallenge),
    /// The console served a regular page; the cookie session is still live.
    Authenticated,
}

/// One row of the DHCP reservation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpReservation {
    pub ip: String,
    pub mac: String,
    pub lease: String,
    /// Suffix of the row's form fields (`manip<ID>`, `DOFIX<ID>`, ...).
    pub row_id: String,
}

/// Coarse shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Login,
    Html,
    Table,
    Json,
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseKind::Login => write!(f, "login page"),
            ResponseKind::Html => write!(f, "HTML page"),
            ResponseKind::Table => write!(f, "reservation table"),
            ResponseKind::Json => write!(f, "JSON"),
        }
    }
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::Protocol(format!("bad selector {:?}: {}", css, e)))
}

/// Element text with whitespace collapsed.
fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `body` and fails with [`Error::DeviceError`] if it carries an
/// error banner.
fn parse_checked(body: &str) -> Result<Html, Error> {
    let document = Html::parse_document(body);
    let banner = selector(&format!(".{}", ERROR_CLASS))?;
    if let Some(element) = document.select(&banner).next() {
        return Err(Error::DeviceError(text_of(element)));
    }
    Ok(document)
}

fn is_login(document: &Html) -> Result<bool, Error> {
    let title = selector("title")?;
    Ok(document
        .select(&title)
        .next()
        .is_some_and(|t| text_of(t).eq_ignore_ascii_case("login")))
}

/// Checks `body` for the device's error banner.
///
/// ```
/// use airstation_core::{Error, response::check_device_error};
///
/// let page = r#"<html><body><p>x</p><div class="errortxt">Wrong password</div></body></html>"#;
/// assert!(matches!(check_device_error(page), Err(Error::DeviceError(m)) if m == "Wrong password"));
/// assert!(check_device_error("<html><body>fine</body></html>").is_ok());
/// ```
pub fn check_device_error(body: &str) -> Result<(), Error> {
    parse_checked(body).map(|_| ())
}

/// Returns `true` if `body` is the login form.
pub fn is_login_page(body: &str) -> Result<bool, Error> {
    is_login(&parse_checked(body)?)
}

/// Classifies `body` without extracting anything.
///
/// Error banners are reported as errors, not as a kind.
pub fn classify(body: &str) -> Result<ResponseKind, Error> {
    let trimmed = body.trim_start();
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<Value>(trimmed).is_ok()
    {
        return Ok(ResponseKind::Json);
    }

    let document = parse_checked(body)?;
    if is_login(&document)? {
        return Ok(ResponseKind::Login);
    }
    let table = selector(&format!(".{}", TABLE_CLASS))?;
    if document.select(&table).next().is_some() {
        return Ok(ResponseKind::Table);
    }
    Ok(ResponseKind::Html)
}

/// Interprets the home page (`req=twz`).
///
/// If the login form is served, the session tokens and the RSA key are
/// pulled out of it.
pub fn home_page(body: &str) -> Result<HomePage, Error> {
    let document = parse_checked(body)?;
    if !is_login(&document)? {
        return Ok(HomePage::Authenticated);
    }

    let tokens = SessionTokens {
        id: hidden_field(&document, SESSION_ID_FIELD)?,
        num: hidden_field(&document, SESSION_NUM_FIELD)?,
    };
    if !tokens.is_complete() {
        return Err(Error::Protocol("login page carries empty session tokens".into()));
    }

    let scripts = script_text(&document)?;
    let exponent = quoted_after(&scripts, EXPONENT_MARKER)
        .ok_or_else(|| Error::InvalidKeyParameters("exponent not found in login page".into()))?;
    let modulus = quoted_after(&scripts, MODULUS_MARKER)
        .ok_or_else(|| Error::InvalidKeyParameters("modulus not found in login page".into()))?;

    Ok(HomePage::LoginRequired(LoginChallenge {
        tokens,
        key: RsaKeyParams::parse(exponent, modulus)?,
    }))
}

fn hidden_field(document: &Html, name: &str) -> Result<String, Error> {
    let field = selector(&format!("[name=\"{}\"]", name))?;
    document
        .select(&field)
        .next()
        .map(|e| e.value().attr("value").unwrap_or_default().to_string())
        .ok_or_else(|| Error::Protocol(format!("login page has no {} field", name)))
}

/// Concatenated contents of every `<script>` element.
fn script_text(document: &Html) -> Result<String, Error> {
    let script = selector("script")?;
    Ok(document
        .select(&script)
        .flat_map(|s| s.text())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// The text between `marker` and the next `"`.
fn quoted_after<'a>(haystack: &'a str, marker: &str) -> Option<&'a str> {
    let start = haystack.find(marker)? + marker.len();
    let len = haystack[start..].find('"')?;
    Some(&haystack[start..start + len])
}

/// Extracts the DHCP reservation table from `dhcps_lease.html`.
///
/// Only rows with exactly five cells are entries; header and spacer rows are
/// skipped. The `(*)` marker the console puts next to some addresses is
/// removed.
pub fn dhcp_reservations(body: &str) -> Result<Vec<DhcpReservation>, Error> {
    let document = parse_checked(body)?;
    let table_sel = selector(&format!(".{}", TABLE_CLASS))?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let submit_sel = selector("[type=\"submit\"], submit")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| Error::Protocol(format!("no {} table in page", TABLE_CLASS)))?;

    let mut entries = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() != 5 {
            continue;
        }

        let name = cells[4]
            .select(&submit_sel)
            .next()
            .and_then(|s| s.value().attr("name"))
            .ok_or_else(|| Error::Protocol("reservation row has no submit control".into()))?;

        entries.push(DhcpReservation {
            ip: text_of(cells[0]).replace("(*)", ""),
            mac: text_of(cells[1]),
            lease: text_of(cells[2]),
            row_id: name.chars().skip(ROW_ID_PREFIX_LEN).collect(),
        });
    }
    Ok(entries)
}

/// Parses a `get_json_param` body.
///
/// No schema is applied; the shape depends on the parameter asked for.
pub fn json_param(body: &str) -> Result<Value, Error> {
    check_device_error(body)?;
    Ok(serde_json::from_str(body)?)
}

/// Interprets the answer to a `set` command.
///
/// The console answers `OK` and nothing else on success. Anything else is
/// returned verbatim in [`Error::CommandRejected`].
pub fn command_result(body: &str) -> Result<(), Error> {
    if body.trim().eq_ignore_ascii_case("OK") {
        return Ok(());
    }
    check_device_error(body)?;
    Err(Error::CommandRejected(body.to_string()))
}
