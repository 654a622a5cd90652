#![forbid(unsafe_code)]

//! Key types.

use crate::loader::{self, KeyEncoding};
use kista_core::Error;
use zeroize::Zeroizing;

/// PEM-armored RSA private key text, loaded once at configuration time.
///
/// The text is only parsed on [`PrivateKeyMaterial::import`], so the
/// imported key lives no longer than the call that needs it. The value is
/// never mutated and can be shared across threads by reference.
#[derive(Clone)]
pub struct PrivateKeyMaterial {
    pem: Zeroizing<String>,
}

/// An RSA private key imported from [`PrivateKeyMaterial`].
pub struct ImportedKey {
    pub key: rsa::RsaPrivateKey,
    /// The container encoding that succeeded.
    pub encoding: KeyEncoding,
}

impl PrivateKeyMaterial {
    pub fn from_pem(pem: impl Into<String>) -> Self {
        Self {
            pem: Zeroizing::new(pem.into()),
        }
    }

    /// Read PEM text from a file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Error> {
        let pem = std::fs::read_to_string(path)
            .map_err(|e| Error::KeyImportFailure(format!("{}: {e}", path.display())))?;
        Ok(Self::from_pem(pem))
    }

    /// Import the key, trying [`KeyEncoding::ATTEMPT_ORDER`].
    pub fn import(&self) -> Result<ImportedKey, Error> {
        self.import_with(&KeyEncoding::ATTEMPT_ORDER)
    }

    /// Import the key, trying only the listed encodings, in order.
    pub fn import_with(&self, order: &[KeyEncoding]) -> Result<ImportedKey, Error> {
        let der = loader::pem_body(&self.pem)?;
        let (key, encoding) = loader::load_rsa_private_der(&der, order)?;
        Ok(ImportedKey { key, encoding })
    }
}

impl std::fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKeyMaterial({} bytes of PEM)", self.pem.len())
    }
}

impl std::fmt::Debug for ImportedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSA private key ({:?})", self.encoding)
    }
}
