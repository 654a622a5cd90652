#![forbid(unsafe_code)]

//! SP-initiated `LogoutRequest` rendering.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use kista_core::{ns, Error};
use kista_xml::XmlWriter;

const ISSUE_INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// What goes into a logout request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutRequestDescriptor {
    /// Request `ID`, unique per request.
    pub id: String,
    /// Rendered verbatim as `saml:Issuer`.
    pub issuer: String,
    /// Relying party client id; used to address the IdP logout endpoint.
    pub client_id: String,
    pub name_id: String,
    pub session_index: String,
}

impl LogoutRequestDescriptor {
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidLogoutRequest("empty request ID".into()));
        }
        if self.issuer.trim().is_empty() {
            return Err(Error::InvalidLogoutRequest("empty issuer".into()));
        }
        Ok(())
    }
}

/// Render the request XML.
pub fn render_logout_request(
    request: &LogoutRequestDescriptor,
    destination: &str,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    request.validate()?;

    let issue_instant = now.format(ISSUE_INSTANT_FORMAT).to_string();
    let root = format!("samlp:{}", ns::node::LOGOUT_REQUEST);
    let issuer = format!("saml:{}", ns::node::ISSUER);
    let name_id = format!("saml:{}", ns::node::NAME_ID);
    let session_index = format!("samlp:{}", ns::node::SESSION_INDEX);

    let mut w = XmlWriter::new();
    w.write_declaration()?;
    w.start_element(
        &root,
        &[
            ("xmlns:samlp", ns::SAMLP),
            ("xmlns:saml", ns::SAML),
            (ns::attr::ID, &request.id),
            (ns::attr::VERSION, "2.0"),
            (ns::attr::ISSUE_INSTANT, &issue_instant),
            (ns::attr::DESTINATION, destination),
        ],
    )?;
    w.text_element(&issuer, &[], &request.issuer)?;
    w.text_element(
        &name_id,
        &[(ns::attr::FORMAT, ns::NAMEID_FORMAT_TRANSIENT)],
        &request.name_id,
    )?;
    w.text_element(&session_index, &[], &request.session_index)?;
    w.end_element(&root)?;
    w.into_string()
}

/// Render the request and base64-encode it for an HTTP-POST form field.
pub fn encode_logout_request(
    request: &LogoutRequestDescriptor,
    destination: &str,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    let xml = render_logout_request(request, destination, now)?;
    tracing::debug!(id = %request.id, destination, "encoded logout request");
    Ok(STANDARD.encode(xml.as_bytes()))
}
