#![forbid(unsafe_code)]

//! Decryption context: the private key and extraction policy.

use crate::extract::ExtractionPolicy;
use kista_keys::PrivateKeyMaterial;

/// Context for SAML response processing.
///
/// Built once at configuration time and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct DecryptContext {
    /// Service provider private key for unwrapping session keys.
    pub key: PrivateKeyMaterial,
    /// Issuer stripping and attribute naming rules.
    pub policy: ExtractionPolicy,
}

impl DecryptContext {
    pub fn new(key: PrivateKeyMaterial) -> Self {
        Self {
            key,
            policy: ExtractionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }
}
