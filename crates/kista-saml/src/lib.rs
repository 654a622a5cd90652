#![forbid(unsafe_code)]

//! SAML 2.0 response processing.
//!
//! Decrypts `EncryptedAssertion` blocks in place, extracts the protocol
//! fields a service provider needs, and encodes logout requests.
//!
//! Processing order for an inbound response:
//! 1. Base64-decode the `SAMLResponse` form value
//! 2. Detect encryption structurally (an `EncryptedAssertion` element)
//! 3. For each encrypted block: unwrap the session key with RSA-OAEP,
//!    decrypt the payload with AES-CBC, splice the assertion into the
//!    document in place of the block
//! 4. Run field extraction over the plaintext document

pub mod context;
pub mod decrypt;
pub mod extract;
pub mod logout;
pub mod response;

pub use context::DecryptContext;
pub use decrypt::{is_encrypted, EncryptedAssertionBlock};
pub use extract::{
    AttributeExtractor, AttributeLookup, ExtractedFields, ExtractionPolicy, IssuerPrefixStrip,
};
pub use logout::{encode_logout_request, render_logout_request, LogoutRequestDescriptor};
pub use response::{decode_response, process_response, process_xml, ProcessedResponse};
