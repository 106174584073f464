//! Form parameters and `application/x-www-form-urlencoded` bodies.
//!
//! The console's CGI reads some forms positionally, so a [`DeviceCommand`]
//! keeps its fields in insertion order and the encoder writes them out in
//! that order.

use encoding_rs::{Encoding, UTF_8};

use crate::error::Error;

/// Default charset label for form bodies.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Content type of every form body sent to the device.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An ordered set of form fields.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// its original position.
///
/// # Example
///
/// ```
/// use airstation_core::DeviceCommand;
///
/// let command = DeviceCommand::new()
///     .with("el", "button_QOS")
///     .with("val", "ON");
///
/// assert_eq!(command.get("val"), Some("ON"));
/// assert_eq!(command.keys().collect::<Vec<_>>(), ["el", "val"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCommand {
    fields: Vec<(String, String)>,
}

impl DeviceCommand {
    /// Creates an empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, consuming and returning the command.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Appends every field of `other`.
    pub fn extend(&mut self, other: DeviceCommand) {
        for (key, value) in other.fields {
            self.insert(key, value);
        }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DeviceCommand {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut command = DeviceCommand::new();
        for (key, value) in iter {
            command.insert(key, value);
        }
        command
    }
}

/// Serialises form fields in a configurable charset.
#[derive(Debug, Clone, Copy)]
pub struct FormEncoder {
    encoding: &'static Encoding,
}

impl FormEncoder {
    /// Looks up a charset by its WHATWG label (`utf-8`, `shift_jis`, ...).
    pub fn for_label(label: &str) -> Result<Self, Error> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| Error::UnsupportedEncoding(label.to_string()))
    }

    /// Name of the resolved charset.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encodes `command` as `k1=v1&k2=v2`, with no trailing separator.
    pub fn encode(&self, command: &DeviceCommand) -> String {
        self.encode_pairs(command.iter())
    }

    /// Encodes arbitrary pairs in iteration order.
    pub fn encode_pairs<'a>(&self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", self.component(key), self.component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn component(&self, text: &str) -> String {
        let (bytes, _, _) = self.encoding.encode(text);
        form_urlencoded::byte_serialize(&bytes).collect()
    }
}

impl Default for FormEncoder {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}
