#![forbid(unsafe_code)]

//! XML namespace constants and the fixed prefix bindings used by queries.

/// SAML 2.0 assertion namespace
pub const SAML: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace
pub const SAMLP: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Encryption namespace
pub const ENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// XML Digital Signature namespace
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Transient NameID format used in logout requests
pub const NAMEID_FORMAT_TRANSIENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:transient";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    pub const ENCRYPTED_ASSERTION: &str = "EncryptedAssertion";
    pub const ISSUER: &str = "Issuer";
    pub const NAME_ID: &str = "NameID";
    pub const LOGOUT_REQUEST: &str = "LogoutRequest";
    pub const SESSION_INDEX: &str = "SessionIndex";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const ID: &str = "ID";
    pub const NAME: &str = "Name";
    pub const FORMAT: &str = "Format";
    pub const VERSION: &str = "Version";
    pub const ISSUE_INSTANT: &str = "IssueInstant";
    pub const DESTINATION: &str = "Destination";
    pub const SESSION_INDEX: &str = "SessionIndex";
    pub const ALGORITHM: &str = "Algorithm";
}

// ── Prefix bindings ──────────────────────────────────────────────────

/// Resolves the fixed set of prefixes that kista queries are written in.
///
/// The bindings are independent of whatever prefixes the producer chose in
/// the document itself; matching is always by namespace URI.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceResolver;

impl NamespaceResolver {
    const BINDINGS: &'static [(&'static str, &'static str)] = &[
        ("saml", SAML),
        ("samlp", SAMLP),
        ("xenc", ENC),
        ("e", ENC),
        ("ds", DSIG),
    ];

    pub fn new() -> Self {
        Self
    }

    /// Namespace URI bound to `prefix`, if any.
    pub fn resolve(&self, prefix: &str) -> Option<&'static str> {
        Self::BINDINGS
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, uri)| *uri)
    }
}
