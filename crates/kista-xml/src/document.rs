#![forbid(unsafe_code)]

//! Owned XML document wrapper over roxmltree.

use kista_core::Error;

/// An owned XML document.  Stores the text after validating that it parses.
///
/// To work with the parsed tree, call [`XmlDocument::parse_doc`] which
/// returns a temporary `roxmltree::Document` borrowing from the text.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        crate::parse(&text)?;
        Ok(Self { text })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Parse the document and return a temporary `roxmltree::Document`.
    ///
    /// The text was validated on construction, so this only fails if the
    /// parsing options changed in between.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        crate::parse(&self.text)
    }

    /// Find the first descendant element with the given local name and namespace.
    pub fn find_element<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        ns: &str,
        local_name: &str,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        doc.descendants().find(|n| is_element(*n, ns, local_name))
    }
}

/// Whether `node` is an element named `{ns}local_name`.
pub fn is_element(node: roxmltree::Node<'_, '_>, ns: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns
}

/// Collect all text content from a node and its descendants.
pub fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        if descendant.is_text() {
            if let Some(t) = descendant.text() {
                text.push_str(t);
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use kista_core::ns;

    const XML: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">
        <saml:Issuer>urn:idp.example.com</saml:Issuer>
        <saml:Assertion><saml:Issuer>inner</saml:Issuer></saml:Assertion>
    </samlp:Response>"#;

    #[test]
    fn test_rejects_malformed() {
        let err = XmlDocument::parse("<a><b></a>".into()).unwrap_err();
        assert!(matches!(err, Error::MalformedXml(_)));
    }

    #[test]
    fn test_rejects_dtd() {
        let xml = r#"<!DOCTYPE a [<!ENTITY x "y">]><a>&x;</a>"#;
        assert!(XmlDocument::parse(xml.into()).is_err());
    }

    #[test]
    fn test_find_element_by_namespace() {
        let xml = XmlDocument::parse(XML.into()).unwrap();
        let doc = xml.parse_doc().unwrap();
        let issuer = XmlDocument::find_element(&doc, ns::SAML, ns::node::ISSUER).unwrap();
        assert_eq!(issuer.text(), Some("urn:idp.example.com"));
        assert!(XmlDocument::find_element(&doc, ns::SAMLP, ns::node::ISSUER).is_none());
    }

    #[test]
    fn test_text_content_spans_children() {
        let doc = roxmltree::Document::parse("<a>one<b>two</b>three</a>").unwrap();
        assert_eq!(text_content(doc.root_element()), "onetwothree");
    }
}
