//! Symmetric obfuscation codec for stored records.
//!
//! A record is stored as `base64(xor(percent_encode(text), key))`. Percent
//! encoding first turns any Unicode text into plain ASCII so every position is
//! a single byte; each byte is then XORed with the key byte at `i mod len(key)`.
//!
//! This is obfuscation, not encryption. The key is a fixed literal compiled
//! into the application ([`DEFAULT_KEY`]) and anyone holding the binary can
//! read the records. The [`Codec`] trait isolates the key so a user-derived one
//! can replace it without touching the store.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};

/// The fixed key used for the main snapshot record.
pub const DEFAULT_KEY: &str = "babysteps_secret_key";

/// A reversible transform between text and an opaque stored string.
pub trait Codec: Send + Sync + std::fmt::Debug {
    /// Turn plaintext into the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the text cannot be represented.
    fn encode(&self, plaintext: &str) -> Result<String>;

    /// Recover plaintext from the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the stored string is corrupt or was
    /// produced with a different key.
    fn decode(&self, opaque: &str) -> Result<String>;
}

/// XOR + base64 codec over a fixed key.
#[derive(Debug, Clone)]
pub struct XorCodec {
    key: String,
}

impl XorCodec {
    /// Create a codec over the given key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for XorCodec {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

impl Codec for XorCodec {
    fn encode(&self, plaintext: &str) -> Result<String> {
        encode(plaintext, &self.key)
    }

    fn decode(&self, opaque: &str) -> Result<String> {
        decode(opaque, &self.key)
    }
}

/// Encode `plaintext` with `key`.
///
/// An empty key or empty plaintext passes the text through unchanged.
///
/// # Errors
///
/// Returns [`Error::Encode`] if the key has characters outside U+0000..=U+00FF.
pub fn encode(plaintext: &str, key: &str) -> Result<String> {
    if key.is_empty() || plaintext.is_empty() {
        return Ok(plaintext.to_string());
    }
    let key = key_bytes(key).map_err(Error::encode)?;

    let escaped = urlencoding::encode(plaintext);
    let mixed = xor(escaped.as_bytes(), &key);
    Ok(STANDARD.encode(mixed))
}

/// Decode a string produced by [`encode`] with the same `key`.
///
/// An empty key or empty input passes the input through unchanged.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the input is not valid base64, the key is
/// wrong, or the recovered bytes are not valid UTF-8.
pub fn decode(opaque: &str, key: &str) -> Result<String> {
    if key.is_empty() || opaque.is_empty() {
        return Ok(opaque.to_string());
    }
    let key = key_bytes(key).map_err(Error::decode)?;

    let mixed = STANDARD
        .decode(opaque)
        .map_err(|e| Error::decode(format!("invalid base64: {e}")))?;
    let escaped = xor(&mixed, &key);

    let escaped = std::str::from_utf8(&escaped)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| Error::decode("unmasked record is not percent-encoded text"))?;
    check_escapes(escaped)?;

    urlencoding::decode(escaped)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Error::decode(format!("invalid UTF-8 after percent-decoding: {e}")))
}

/// Obscure a PIN for the credential record.
///
/// Plain base64 of the PIN text, without the XOR step used for snapshots.
#[must_use]
pub fn obscure_credential(pin: &str) -> String {
    STANDARD.encode(pin.as_bytes())
}

fn key_bytes(key: &str) -> std::result::Result<Vec<u8>, String> {
    key.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| format!("key character {c:?} is not a single byte"))
        })
        .collect()
}

fn xor(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

// Every '%' has to introduce two hex digits, otherwise the key was wrong.
fn check_escapes(escaped: &str) -> Result<()> {
    let bytes = escaped.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(Error::decode(format!("malformed escape at offset {i}")));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
