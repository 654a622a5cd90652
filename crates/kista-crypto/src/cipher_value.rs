#![forbid(unsafe_code)]

//! Base64 handling for `CipherValue` text.

use base64::Engine;
use kista_core::Error;

/// Decode base64 `CipherValue` text, ignoring embedded whitespace.
pub fn decode(text: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::MalformedCiphertext(format!("CipherValue is not base64: {e}")))
}

/// Encode bytes as `CipherValue` text.
pub fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
