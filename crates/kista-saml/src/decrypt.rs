#![forbid(unsafe_code)]

//! `EncryptedAssertion` decryption.
//!
//! Processing order per block:
//! 1. Locate the wrapped session key and the encrypted payload
//! 2. Import the private key and unwrap the session key (RSA-OAEP)
//! 3. Decrypt the payload (AES-CBC, leading IV)
//! 4. Replace `<EncryptedAssertion>` with the decrypted `<Assertion>` text

use kista_core::{ns, Error};
use kista_crypto::{cipher, cipher_value, keytransport, AesCbc, RsaOaep};
use kista_keys::PrivateKeyMaterial;
use kista_xml::document::{text_content, XmlDocument};
use kista_xml::xpath;
use quick_xml::escape::escape;
use zeroize::Zeroizing;

/// Upper bound on blocks decrypted from one document.
///
/// A decrypted assertion may itself contain an `EncryptedAssertion`; the
/// bound keeps a hostile producer from looping the splicer forever.
const MAX_ENCRYPTED_ASSERTIONS: usize = 16;

const KEY_INFO_CIPHER_VALUE: &str =
    "xenc:EncryptedData/ds:KeyInfo/xenc:EncryptedKey/xenc:CipherData/xenc:CipherValue";
const SIBLING_KEY_CIPHER_VALUE: &str = "xenc:EncryptedKey/xenc:CipherData/xenc:CipherValue";
const DATA_CIPHER_VALUE: &str = "xenc:EncryptedData/xenc:CipherData/xenc:CipherValue";
const KEY_INFO_METHOD: &str =
    "xenc:EncryptedData/ds:KeyInfo/xenc:EncryptedKey/xenc:EncryptionMethod";
const SIBLING_KEY_METHOD: &str = "xenc:EncryptedKey/xenc:EncryptionMethod";
const DATA_METHOD: &str = "xenc:EncryptedData/xenc:EncryptionMethod";

/// Whether the document carries an `EncryptedAssertion` element.
///
/// Matching is by element name and namespace; text that merely mentions
/// encryption does not count.
pub fn is_encrypted(doc: &roxmltree::Document<'_>) -> bool {
    XmlDocument::find_element(doc, ns::SAML, ns::node::ENCRYPTED_ASSERTION).is_some()
}

/// The ciphertexts held by one `<saml:EncryptedAssertion>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedAssertionBlock {
    /// Base64 wrapped session key.
    pub encrypted_key: String,
    /// Base64 `IV || ciphertext` of the assertion.
    pub cipher_data: String,
    /// `EncryptionMethod` of the `EncryptedKey`, if declared.
    pub key_transport: Option<String>,
    /// `EncryptionMethod` of the `EncryptedData`, if declared.
    pub data_encryption: Option<String>,
}

impl EncryptedAssertionBlock {
    /// Read both ciphertexts from an `EncryptedAssertion` element.
    ///
    /// The session key is looked up inside `EncryptedData/KeyInfo` first and
    /// then as a sibling of `EncryptedData`. Nothing is decrypted here, so a
    /// missing ciphertext is reported before any key is touched.
    pub fn read(node: roxmltree::Node<'_, '_>) -> Result<Self, Error> {
        let encrypted_key =
            select_any(node, &[KEY_INFO_CIPHER_VALUE, SIBLING_KEY_CIPHER_VALUE])?
                .map(text_content)
                .filter(|t| !t.trim().is_empty())
                .ok_or(Error::MissingEncryptedKey)?;

        let cipher_data = select_any(node, &[DATA_CIPHER_VALUE])?
            .map(text_content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::MissingCipherData)?;

        let algorithm = |n: roxmltree::Node| n.attribute(ns::attr::ALGORITHM).map(str::to_owned);
        let key_transport =
            select_any(node, &[KEY_INFO_METHOD, SIBLING_KEY_METHOD])?.and_then(algorithm);
        let data_encryption = select_any(node, &[DATA_METHOD])?.and_then(algorithm);

        Ok(Self {
            encrypted_key,
            cipher_data,
            key_transport,
            data_encryption,
        })
    }

    /// Unwrap the session key and decrypt the assertion to UTF-8 text.
    pub fn decrypt(&self, key: &PrivateKeyMaterial) -> Result<String, Error> {
        let transport = match self.key_transport.as_deref() {
            Some(uri) => keytransport::from_uri(uri)?,
            None => RsaOaep::default(),
        };
        let session_key = unwrap_session_key_with(transport, key, &self.encrypted_key)?;

        let cipher = match self.data_encryption.as_deref() {
            Some(uri) => cipher::from_uri(uri)?,
            None => AesCbc::for_key(&session_key)?,
        };
        tracing::debug!(
            key_transport = transport.uri(),
            cipher = cipher.uri(),
            "decrypting assertion payload"
        );

        cipher.decrypt_payload(&session_key, &self.cipher_data)
    }
}

/// First match of any of `exprs`, tried in order, relative to `node`.
fn select_any<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    exprs: &[&str],
) -> Result<Option<roxmltree::Node<'a, 'input>>, Error> {
    for expr in exprs {
        if let Some(hit) = xpath::select_first(node, expr)? {
            return Ok(Some(hit));
        }
    }
    Ok(None)
}

/// Unwrap a base64 session key with RSA-OAEP (SHA-1).
pub fn unwrap_session_key(
    key: &PrivateKeyMaterial,
    encrypted_key: &str,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    unwrap_session_key_with(RsaOaep::default(), key, encrypted_key)
}

fn unwrap_session_key_with(
    transport: RsaOaep,
    key: &PrivateKeyMaterial,
    encrypted_key: &str,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let imported = key.import()?;
    tracing::debug!(encoding = ?imported.encoding, "imported service provider key");
    let encrypted = cipher_value::decode(encrypted_key)?;
    transport.decrypt(&imported.key, &encrypted)
}

/// Decrypt every `EncryptedAssertion` in `xml`, returning the plaintext document.
///
/// Fails with `MissingEncryptedAssertionNode` if the document has none.
pub fn decrypt(key: &PrivateKeyMaterial, xml: &str) -> Result<String, Error> {
    let mut current = xml.to_owned();
    let mut spliced = 0usize;

    loop {
        let next = {
            let doc = kista_xml::parse(&current)?;
            match XmlDocument::find_element(&doc, ns::SAML, ns::node::ENCRYPTED_ASSERTION) {
                None => None,
                Some(node) => {
                    if spliced == MAX_ENCRYPTED_ASSERTIONS {
                        return Err(Error::MalformedXml(format!(
                            "more than {MAX_ENCRYPTED_ASSERTIONS} encrypted assertions"
                        )));
                    }
                    let block = EncryptedAssertionBlock::read(node)?;
                    let plaintext = block.decrypt(key)?;
                    Some(splice(&current, node, &plaintext)?)
                }
            }
        };

        match next {
            Some(text) => {
                current = text;
                spliced += 1;
            }
            None if spliced == 0 => return Err(Error::MissingEncryptedAssertionNode),
            None => break,
        }
    }

    tracing::info!(assertions = spliced, "decrypted encrypted assertions");
    Ok(current)
}

/// Replace `target` in `xml` with the decrypted `fragment`.
///
/// The fragment must be exactly one element, well-formed in the namespace
/// scope of `target`. Everything outside `target` is copied byte for byte.
pub fn splice(xml: &str, target: roxmltree::Node<'_, '_>, fragment: &str) -> Result<String, Error> {
    let fragment = strip_xml_declaration(fragment);
    check_fragment(target, fragment)?;

    let range = target.range();
    let mut result = String::with_capacity(xml.len() - range.len() + fragment.len());
    result.push_str(&xml[..range.start]);
    result.push_str(fragment);
    result.push_str(&xml[range.end..]);

    kista_xml::parse(&result)?;
    Ok(result)
}

/// Parse `fragment` inside a wrapper that redeclares every namespace in
/// scope at `target`, and require a single root element.
fn check_fragment(target: roxmltree::Node<'_, '_>, fragment: &str) -> Result<(), Error> {
    let mut wrapper = String::from("<fragment");
    for namespace in target.namespaces() {
        let uri = escape(namespace.uri());
        match namespace.name() {
            Some("xml") => {}
            Some(prefix) => wrapper.push_str(&format!(" xmlns:{prefix}=\"{uri}\"")),
            None => wrapper.push_str(&format!(" xmlns=\"{uri}\"")),
        }
    }
    wrapper.push('>');
    wrapper.push_str(fragment);
    wrapper.push_str("</fragment>");

    let doc = kista_xml::parse(&wrapper)
        .map_err(|e| Error::MalformedXml(format!("decrypted assertion: {e}")))?;
    let root = doc.root_element();

    let elements = root.children().filter(|n| n.is_element()).count();
    let stray_text = root
        .children()
        .any(|n| n.is_text() && n.text().is_some_and(|t| !t.trim().is_empty()));
    if elements != 1 || stray_text {
        return Err(Error::MalformedXml(
            "decrypted assertion must be a single element".into(),
        ));
    }
    Ok(())
}

/// Trim surrounding whitespace, a byte order mark and an XML declaration.
fn strip_xml_declaration(text: &str) -> &str {
    let text = text.trim_start_matches('\u{feff}').trim();
    let is_decl = text
        .strip_prefix("<?xml")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace);
    if !is_decl {
        return text;
    }
    match text.find("?>") {
        Some(end) => text[end + 2..].trim_start(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCRYPTED: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"><saml:Issuer>urn:idp</saml:Issuer>
  <saml:EncryptedAssertion><xenc:EncryptedData xmlns:xenc="http://www.w3.org/2001/04/xmlenc#"><xenc:CipherData><xenc:CipherValue>QUJD</xenc:CipherValue></xenc:CipherData></xenc:EncryptedData></saml:EncryptedAssertion>
  <!-- trailer --></samlp:Response>"#;

    fn encrypted_assertion<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
    ) -> roxmltree::Node<'a, 'input> {
        XmlDocument::find_element(doc, ns::SAML, ns::node::ENCRYPTED_ASSERTION).unwrap()
    }

    #[test]
    fn test_is_encrypted_is_structural() {
        let doc = roxmltree::Document::parse(ENCRYPTED).unwrap();
        assert!(is_encrypted(&doc));

        let mention = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" Note="xenc:CipherValue EncryptedAssertion"><x>xenc:CipherValue</x></samlp:Response>"#;
        let doc = roxmltree::Document::parse(mention).unwrap();
        assert!(!is_encrypted(&doc));

        // Right local name, wrong namespace.
        let foreign = r#"<r><EncryptedAssertion xmlns="urn:other"/></r>"#;
        let doc = roxmltree::Document::parse(foreign).unwrap();
        assert!(!is_encrypted(&doc));
    }

    #[test]
    fn test_splice_preserves_surroundings() {
        let doc = roxmltree::Document::parse(ENCRYPTED).unwrap();
        let node = encrypted_assertion(&doc);
        let assertion = r#"<saml:Assertion ID="_a"><saml:Subject/></saml:Assertion>"#;

        let out = splice(ENCRYPTED, node, assertion).unwrap();
        let range = node.range();
        assert_eq!(&out[..range.start], &ENCRYPTED[..range.start]);
        assert!(out.ends_with("\n  <!-- trailer --></samlp:Response>"));
        assert!(out.contains(assertion));
        assert!(!out.contains("EncryptedAssertion"));
    }

    #[test]
    fn test_splice_strips_declaration() {
        let doc = roxmltree::Document::parse(ENCRYPTED).unwrap();
        let node = encrypted_assertion(&doc);
        let fragment = "\u{feff}<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<saml:Assertion/>\n";
        let out = splice(ENCRYPTED, node, fragment).unwrap();
        assert!(out.contains("<saml:Issuer>urn:idp</saml:Issuer>\n  <saml:Assertion/>\n"));
    }

    #[test]
    fn test_splice_scope_escapes_namespace_uris() {
        let xml = ENCRYPTED.replace(
            "<samlp:Response ",
            r#"<samlp:Response xmlns:q="urn:x?a=1&amp;b=&quot;2&quot;&lt;" "#,
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let node = encrypted_assertion(&doc);
        let out = splice(&xml, node, "<q:Assertion/>").unwrap();

        let spliced = roxmltree::Document::parse(&out).unwrap();
        let assertion = spliced
            .descendants()
            .find(|n| n.tag_name().name() == "Assertion")
            .unwrap();
        assert_eq!(assertion.tag_name().namespace(), Some("urn:x?a=1&b=\"2\"<"));
    }

    #[test]
    fn test_splice_rejects_malformed_fragment() {
        let doc = roxmltree::Document::parse(ENCRYPTED).unwrap();
        let node = encrypted_assertion(&doc);
        for bad in [
            "<saml:Assertion>",
            "not xml at all",
            "<saml:Assertion/><saml:Assertion/>",
            "<saml:Assertion/>trailing",
            "<undeclared:Assertion/>",
            "",
        ] {
            let err = splice(ENCRYPTED, node, bad).unwrap_err();
            assert!(matches!(err, Error::MalformedXml(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn test_missing_key_reported_before_decryption() {
        let doc = roxmltree::Document::parse(ENCRYPTED).unwrap();
        let err = EncryptedAssertionBlock::read(encrypted_assertion(&doc)).unwrap_err();
        assert!(matches!(err, Error::MissingEncryptedKey));

        // Even with an unusable key the block is rejected for its shape.
        let key = PrivateKeyMaterial::from_pem("garbage");
        assert!(matches!(decrypt(&key, ENCRYPTED), Err(Error::MissingEncryptedKey)));
    }

    #[test]
    fn test_missing_cipher_data() {
        let xml = r#"<saml:EncryptedAssertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" xmlns:xenc="http://www.w3.org/2001/04/xmlenc#" xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
            <xenc:EncryptedData>
                <ds:KeyInfo><xenc:EncryptedKey><xenc:CipherData><xenc:CipherValue>QUJD</xenc:CipherValue></xenc:CipherData></xenc:EncryptedKey></ds:KeyInfo>
                <xenc:CipherData><xenc:CipherValue>  </xenc:CipherValue></xenc:CipherData>
            </xenc:EncryptedData>
        </saml:EncryptedAssertion>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let err = EncryptedAssertionBlock::read(doc.root_element()).unwrap_err();
        assert!(matches!(err, Error::MissingCipherData));
    }

    #[test]
    fn test_reads_sibling_encrypted_key_and_methods() {
        let xml = r#"<saml:EncryptedAssertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" xmlns:xenc="http://www.w3.org/2001/04/xmlenc#">
            <xenc:EncryptedData>
                <xenc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#aes128-cbc"/>
                <xenc:CipherData><xenc:CipherValue>REFUQQ==</xenc:CipherValue></xenc:CipherData>
            </xenc:EncryptedData>
            <xenc:EncryptedKey>
                <xenc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p"/>
                <xenc:CipherData><xenc:CipherValue>S0VZ</xenc:CipherValue></xenc:CipherData>
            </xenc:EncryptedKey>
        </saml:EncryptedAssertion>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let block = EncryptedAssertionBlock::read(doc.root_element()).unwrap();
        assert_eq!(block.encrypted_key, "S0VZ");
        assert_eq!(block.cipher_data, "REFUQQ==");
        assert_eq!(block.key_transport.as_deref(), Some(kista_core::algorithm::RSA_OAEP));
        assert_eq!(block.data_encryption.as_deref(), Some(kista_core::algorithm::AES128_CBC));
    }

    #[test]
    fn test_decrypt_requires_encrypted_assertion() {
        let key = PrivateKeyMaterial::from_pem("unused");
        let err = decrypt(&key, "<samlp:Response xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\"/>")
            .unwrap_err();
        assert!(matches!(err, Error::MissingEncryptedAssertionNode));
    }

    #[test]
    fn test_strip_xml_declaration() {
        assert_eq!(strip_xml_declaration("  <a/> "), "<a/>");
        assert_eq!(strip_xml_declaration("<?xml version=\"1.0\"?><a/>"), "<a/>");
        assert_eq!(strip_xml_declaration("<?xml-stylesheet href=\"x\"?><a/>"), "<?xml-stylesheet href=\"x\"?><a/>");
    }
}
