//! RSA encryption as performed by the AirStation login page.
//!
//! The web console ships a small JavaScript RSA library and encrypts the
//! `airstation_pass=<password>` string in the browser before posting the
//! login form. The device only accepts ciphertext produced exactly the way
//! that script produces it, so this module follows the script bit for bit:
//!
//! 1. The plaintext is packed UTF-16 unit by UTF-16 unit (1, 2 or 3 bytes
//!    each), from the last unit backwards, into the tail of a `k` byte block.
//! 2. The block is framed as `00 02 <non-zero random> 00 <message>`.
//! 3. The block is raised to the public exponent modulo `n`.
//! 4. The result is rendered as hex, then converted to base64 three hex
//!    digits at a time and wrapped at 64 columns.
//!
//! Step 4 yields the same characters as standard base64 over the ciphertext
//! bytes, but the conversion has to go through hex to reproduce the
//! odd-length padding of the script.

use rand::Rng;
use rsa::BigUint;

use crate::error::Error;

const B64_MAP: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const B64_PAD: char = '=';
const LINE_WIDTH: usize = 64;

/// Bytes of framing around the message: `00 02`, eight random bytes, `00`.
pub const PADDING_OVERHEAD: usize = 11;

/// Public key parameters scraped from a login page.
///
/// These are valid for one login attempt only; the device is free to rotate
/// them every time it serves the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyParams {
    /// Public exponent.
    pub exponent: u32,
    /// Modulus as a hex string.
    pub modulus_hex: String,
}

impl RsaKeyParams {
    /// Parses the decimal exponent string found in the page.
    pub fn parse(exponent: &str, modulus_hex: impl Into<String>) -> Result<Self, Error> {
        let exponent = exponent.trim().parse().map_err(|e| {
            Error::InvalidKeyParameters(format!("exponent {:?}: {}", exponent, e))
        })?;
        Ok(Self {
            exponent,
            modulus_hex: modulus_hex.into(),
        })
    }
}

/// The login page's RSA public key.
///
/// # Example
///
/// ```
/// use airstation_core::crypto::JsRsa;
///
/// let rsa = JsRsa::new(
///     65537,
///     "A5261939975948BB7A58DFFE5FF54E65F0498F9175F5A09288810B8975871E99\
///      AF3B5DD94057B0FC07535F5F97444504FA35169D461D0D30CF0192E307727C06\
///      5168C788771C561A9400FB49175E9E6AA4E23FE11AF69E9412DD23B0CB6684C4\
///      C2429BCE139E848AB26D0829073351F4ACD36074EAFD036A5EB83359D2A698D3",
/// )
/// .unwrap();
///
/// let encrypted = rsa.encrypt("airstation_pass=password").unwrap();
/// assert_ne!(encrypted, "airstation_pass=password");
/// ```
#[derive(Debug, Clone)]
pub struct JsRsa {
    exponent: BigUint,
    modulus: BigUint,
    /// Modulus length in bytes.
    len: usize,
}

impl JsRsa {
    /// Builds a key from the public exponent and the hex modulus.
    ///
    /// Fails with [`Error::InvalidKeyParameters`] if the modulus does not
    /// parse, or if it is too small to hold any padded message.
    pub fn new(exponent: u32, modulus_hex: &str) -> Result<Self, Error> {
        if exponent == 0 {
            return Err(Error::InvalidKeyParameters("exponent is zero".into()));
        }

        let modulus_hex = modulus_hex.trim();
        let modulus = BigUint::parse_bytes(modulus_hex.as_bytes(), 16).ok_or_else(|| {
            Error::InvalidKeyParameters(format!("modulus is not a hex number: {:?}", modulus_hex))
        })?;

        let len = modulus.bits().div_ceil(8);
        if len <= PADDING_OVERHEAD {
            return Err(Error::InvalidKeyParameters(format!(
                "modulus of {} bytes is too short",
                len
            )));
        }

        Ok(Self {
            exponent: BigUint::from(exponent),
            modulus,
            len,
        })
    }

    /// Builds a key from scraped [`RsaKeyParams`].
    pub fn from_params(params: &RsaKeyParams) -> Result<Self, Error> {
        Self::new(params.exponent, &params.modulus_hex)
    }

    /// Modulus length in bytes (`k`).
    pub fn block_len(&self) -> usize {
        self.len
    }

    /// Largest packed plaintext, in bytes, this key can encrypt.
    pub fn capacity(&self) -> usize {
        self.len - PADDING_OVERHEAD
    }

    /// Encrypts `plaintext` the way the login page script does.
    ///
    /// Random padding makes the output differ between calls.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let block = self.pkcs1_pad2(plaintext, &mut rand::rng())?;
        let m = BigUint::from_bytes_be(&block);
        let c = m.modpow(&self.exponent, &self.modulus);

        let mut hex = c.to_str_radix(16);
        if hex.len() % 2 == 1 {
            hex.insert(0, '0');
        }
        hex_to_base64(&hex)
    }

    /// Type 2 padding of `plaintext` into a block of [`block_len`](Self::block_len) bytes.
    fn pkcs1_pad2<R: Rng + ?Sized>(&self, plaintext: &str, rng: &mut R) -> Result<Vec<u8>, Error> {
        let length = packed_len(plaintext);
        if length > self.capacity() {
            return Err(Error::MessageTooLong {
                length,
                capacity: self.capacity(),
            });
        }

        let mut block = vec![0u8; self.len];
        let mut n = self.len;

        // The script walks JavaScript string units, so astral characters go
        // in as two surrogates of three bytes each.
        let units: Vec<u16> = plaintext.encode_utf16().collect();
        for &unit in units.iter().rev() {
            let c = u32::from(unit);
            if c < 0x80 {
                n -= 1;
                block[n] = c as u8;
            } else if c < 0x800 {
                n -= 1;
                block[n] = ((c & 63) | 128) as u8;
                n -= 1;
                block[n] = ((c >> 6) | 192) as u8;
            } else {
                n -= 1;
                block[n] = ((c & 63) | 128) as u8;
                n -= 1;
                block[n] = (((c >> 6) & 63) | 128) as u8;
                n -= 1;
                block[n] = ((c >> 12) | 224) as u8;
            }
        }

        // Separator, then random non-zero filler down to index 2.
        n -= 1;
        block[n] = 0;
        while n > 2 {
            n -= 1;
            block[n] = rng.random_range(1..=u8::MAX);
        }
        block[1] = 2;
        block[0] = 0;

        Ok(block)
    }
}

/// Encrypts `plaintext` with a one-off key.
///
/// Shorthand for [`JsRsa::new`] followed by [`JsRsa::encrypt`].
pub fn encrypt(plaintext: &str, exponent: u32, modulus_hex: &str) -> Result<String, Error> {
    JsRsa::new(exponent, modulus_hex)?.encrypt(plaintext)
}

/// Number of bytes `plaintext` occupies once packed into the RSA block.
pub fn packed_len(plaintext: &str) -> usize {
    plaintext
        .encode_utf16()
        .map(|unit| match unit {
            0..=0x7f => 1,
            0x80..=0x7ff => 2,
            _ => 3,
        })
        .sum()
}

/// Converts a hex string to the console's line-wrapped base64.
///
/// Every three hex digits become two base64 characters; a trailing one or
/// two digits become one or two characters. The result is padded with `=`
/// to a multiple of four and broken into 64-character lines.
///
/// Fails with [`Error::ParseError`] on any non-hex character.
///
/// ```
/// use airstation_core::crypto::hex_to_base64;
///
/// assert_eq!(hex_to_base64("").unwrap(), "");
/// assert_eq!(hex_to_base64("0123456789ABCDEF").unwrap(), "ASNFZ4mrze8=");
/// assert!(hex_to_base64("0x12").is_err());
/// ```
pub fn hex_to_base64(hex: &str) -> Result<String, Error> {
    if hex.is_empty() {
        return Ok(String::new());
    }
    let digits = hex
        .chars()
        .map(|c| {
            c.to_digit(16)
                .ok_or_else(|| Error::ParseError(format!("not a hex digit: {:?}", c)))
        })
        .collect::<Result<Vec<u32>, Error>>()?;
    Ok(line_break(&hex2b64(&digits), LINE_WIDTH))
}

fn hex2b64(digits: &[u32]) -> String {
    let mut out = String::with_capacity(digits.len() * 2 / 3 + 4);

    let mut chunks = digits.chunks_exact(3);
    for chunk in &mut chunks {
        let c = (chunk[0] << 8) | (chunk[1] << 4) | chunk[2];
        out.push(b64_char(c >> 6));
        out.push(b64_char(c & 63));
    }
    match *chunks.remainder() {
        [d] => out.push(b64_char(d << 2)),
        [hi, lo] => {
            let c = (hi << 4) | lo;
            out.push(b64_char(c >> 2));
            out.push(b64_char((c & 3) << 4));
        }
        _ => {}
    }

    while out.len() % 4 != 0 {
        out.push(B64_PAD);
    }
    out
}

fn b64_char(index: u32) -> char {
    B64_MAP[index as usize & 63] as char
}

fn line_break(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / width);
    let mut rest = s;
    while rest.len() > width {
        let (line, tail) = rest.split_at(width);
        out.push_str(line);
        out.push('\n');
        rest = tail;
    }
    out.push_str(rest);
    out
}
