#![forbid(unsafe_code)]

//! Cryptographic primitives for SAML assertion decryption.
//!
//! Provides RSA-OAEP (SHA-1) key transport for the wrapped session key and
//! AES-CBC with a leading IV for the assertion payload. Both directions are
//! implemented so that encrypted fixtures can be produced in tests.

pub mod cipher;
pub mod cipher_value;
pub mod keytransport;

pub use cipher::AesCbc;
pub use keytransport::RsaOaep;
