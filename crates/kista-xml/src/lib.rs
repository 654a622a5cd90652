#![forbid(unsafe_code)]

//! XML document handling for kista.
//!
//! Provides a thin owned-document wrapper over `roxmltree`, a minimal
//! namespace-aware path query, and an XML writer for message templates.

pub mod document;
pub mod writer;
pub mod xpath;

pub use document::XmlDocument;
pub use writer::XmlWriter;
pub use xpath::Path;

/// Return roxmltree parsing options for untrusted protocol messages.
///
/// DTDs are rejected: SAML messages never need one, and refusing them
/// keeps entity expansion out of the attack surface.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Parse `text` with [`parsing_options`], mapping failures to `MalformedXml`.
pub fn parse(text: &str) -> Result<roxmltree::Document<'_>, kista_core::Error> {
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| kista_core::Error::MalformedXml(e.to_string()))
}
