#![forbid(unsafe_code)]

//! Private key material for kista.
//!
//! Loads PEM-armored RSA private keys whose container encoding is not
//! declared, by trying PKCS#8 and then PKCS#1 in a fixed order.

pub mod key;
pub mod loader;

pub use key::{ImportedKey, PrivateKeyMaterial};
pub use loader::KeyEncoding;
