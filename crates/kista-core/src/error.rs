#![forbid(unsafe_code)]

/// Errors produced while decrypting, querying or encoding SAML messages.
///
/// Every variant is terminal for the message being processed. Messages
/// never carry key bytes or decrypted payloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("encrypted assertion is missing its EncryptedKey cipher value")]
    MissingEncryptedKey,

    #[error("encrypted assertion is missing its EncryptedData cipher value")]
    MissingCipherData,

    #[error("private key import failed: {0}")]
    KeyImportFailure(String),

    #[error("key unwrap failed: {0}")]
    KeyUnwrapFailure(String),

    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("payload decryption failed: {0}")]
    DecryptionFailure(String),

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("document has no EncryptedAssertion element")]
    MissingEncryptedAssertionNode,

    #[error("invalid logout request: {0}")]
    InvalidLogoutRequest(String),

    #[error("invalid message encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
