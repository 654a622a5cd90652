#![forbid(unsafe_code)]

//! RSA-OAEP key transport.
//!
//! Only the SHA-1 digest with MGF1-SHA-1 and an empty label is supported.
//! That is what identity providers emit for `rsa-oaep-mgf1p`, and what
//! `rsa-oaep` defaults to when no DigestMethod or MGF is given.

use kista_core::{algorithm, Error};
use zeroize::Zeroizing;

/// RSA-OAEP with SHA-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaOaep {
    uri: &'static str,
}

/// Create a key transport algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<RsaOaep, Error> {
    match uri {
        algorithm::RSA_OAEP => Ok(RsaOaep {
            uri: algorithm::RSA_OAEP,
        }),
        algorithm::RSA_OAEP_ENC11 => Ok(RsaOaep {
            uri: algorithm::RSA_OAEP_ENC11,
        }),
        _ => Err(Error::KeyUnwrapFailure(format!(
            "unsupported key transport algorithm: {uri}"
        ))),
    }
}

impl Default for RsaOaep {
    fn default() -> Self {
        Self {
            uri: algorithm::RSA_OAEP,
        }
    }
}

impl RsaOaep {
    pub fn uri(&self) -> &'static str {
        self.uri
    }

    /// Wrap `key_data` for the holder of `public_key`.
    pub fn encrypt(&self, public_key: &rsa::RsaPublicKey, key_data: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        public_key
            .encrypt(&mut rng, rsa::Oaep::new::<sha1::Sha1>(), key_data)
            .map_err(|e| Error::KeyUnwrapFailure(format!("RSA-OAEP encrypt: {e}")))
    }

    /// Unwrap a session key.
    ///
    /// A ciphertext produced for another key fails the OAEP padding check,
    /// so the caller never sees a plausible-looking wrong key.
    pub fn decrypt(
        &self,
        private_key: &rsa::RsaPrivateKey,
        encrypted: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        private_key
            .decrypt(rsa::Oaep::new::<sha1::Sha1>(), encrypted)
            .map(Zeroizing::new)
            .map_err(|e| Error::KeyUnwrapFailure(format!("RSA-OAEP decrypt: {e}")))
    }
}
