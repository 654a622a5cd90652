#![forbid(unsafe_code)]

//! SAML 2.0 response decryption and extraction.
//!
//! Re-exports the kista library crates under one roof.

pub use kista_core as core;
pub use kista_crypto as crypto;
pub use kista_keys as keys;
pub use kista_saml as saml;
pub use kista_xml as xml;
