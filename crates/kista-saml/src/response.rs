#![forbid(unsafe_code)]

//! Inbound `SAMLResponse` handling: decode, decrypt when needed, extract.

use crate::context::DecryptContext;
use crate::decrypt;
use crate::extract::{AttributeExtractor, ExtractedFields};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kista_core::Error;
use kista_xml::XmlDocument;

/// A response after decryption, ready for field extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResponse {
    xml: String,
    encrypted: bool,
    relay_state: Option<String>,
}

impl ProcessedResponse {
    /// The plaintext document.
    pub fn xml(&self) -> &str {
        &self.xml
    }

    pub fn into_xml(self) -> String {
        self.xml
    }

    /// Whether the response arrived with an `EncryptedAssertion`.
    pub fn was_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Relay state as received. Not interpreted.
    pub fn relay_state(&self) -> Option<&str> {
        self.relay_state.as_deref()
    }

    pub fn extractor(&self) -> Result<AttributeExtractor<'_>, Error> {
        AttributeExtractor::parse(&self.xml)
    }

    /// Extract the standard fields and `attributes` under the context policy.
    pub fn fields(
        &self,
        ctx: &DecryptContext,
        attributes: &[&str],
    ) -> Result<ExtractedFields, Error> {
        Ok(self.extractor()?.extract(&ctx.policy, attributes))
    }
}

/// Decode the base64 `SAMLResponse` form value into document text.
///
/// Whitespace (line breaks from form encoding) is ignored.
pub fn decode_response(encoded: &str) -> Result<String, Error> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::InvalidEncoding(format!("SAMLResponse is not base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidEncoding(format!("SAMLResponse is not UTF-8: {e}")))
}

/// Decode and decrypt a base64 `SAMLResponse`.
pub fn process_response(
    ctx: &DecryptContext,
    encoded: &str,
    relay_state: Option<&str>,
) -> Result<ProcessedResponse, Error> {
    let xml = decode_response(encoded)?;
    process_xml(ctx, xml, relay_state)
}

/// Decrypt an already decoded response document.
///
/// Plaintext responses pass through unchanged and never touch the key.
pub fn process_xml(
    ctx: &DecryptContext,
    xml: String,
    relay_state: Option<&str>,
) -> Result<ProcessedResponse, Error> {
    let document = XmlDocument::parse(xml)?;
    let encrypted = decrypt::is_encrypted(&document.parse_doc()?);

    let xml = if encrypted {
        decrypt::decrypt(&ctx.key, document.text())?
    } else {
        tracing::debug!("response carries no encrypted assertion");
        document.into_text()
    };

    Ok(ProcessedResponse {
        xml,
        encrypted,
        relay_state: relay_state.map(str::to_owned),
    })
}
