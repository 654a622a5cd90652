#![forbid(unsafe_code)]

//! Core types shared by every kista crate: the error taxonomy, algorithm
//! URIs and the namespace vocabulary of SAML 2.0 and XML Encryption.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
pub use ns::NamespaceResolver;
