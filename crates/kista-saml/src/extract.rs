#![forbid(unsafe_code)]

//! Field extraction from a plaintext SAML response.
//!
//! Every lookup is soft: a missing element or attribute is `None`, never an
//! error. Only parsing the document can fail.

use kista_core::{ns, Error, NamespaceResolver};
use kista_xml::document::text_content;
use kista_xml::Path;
use serde::Serialize;
use std::collections::BTreeMap;

const ISSUER: &str = "//saml:Issuer";
const NAME_ID: &str = "//saml:Subject/saml:NameID";
const AUTHN_STATEMENT: &str = "//saml:AuthnStatement";
const ATTRIBUTE: &str = "//saml:Attribute";
const ATTRIBUTE_VALUE: &str = "saml:AttributeValue";

/// How to strip a protocol prefix from the `Issuer` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IssuerPrefixStrip {
    /// Return the issuer as sent.
    #[default]
    None,
    /// Drop the first `n` characters (e.g. `4` for `urn:`).
    FixedLength(usize),
    /// Drop this prefix when the issuer starts with it.
    NamespaceUri(String),
}

impl IssuerPrefixStrip {
    pub fn apply(&self, issuer: &str) -> String {
        match self {
            IssuerPrefixStrip::None => issuer.to_owned(),
            IssuerPrefixStrip::FixedLength(n) => issuer.chars().skip(*n).collect(),
            IssuerPrefixStrip::NamespaceUri(uri) => {
                issuer.strip_prefix(uri.as_str()).unwrap_or(issuer).to_owned()
            }
        }
    }
}

/// How a requested attribute name maps to `Attribute/@Name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeLookup {
    /// `@Name` equals the requested name.
    #[default]
    Exact,
    /// `@Name` equals the template with `{name}` replaced by the requested
    /// name. A template without `{name}` is used as a prefix.
    Template(String),
}

impl AttributeLookup {
    /// The `@Name` value to look for.
    pub fn resolve(&self, name: &str) -> String {
        match self {
            AttributeLookup::Exact => name.to_owned(),
            AttributeLookup::Template(template) if template.contains("{name}") => {
                template.replace("{name}", name)
            }
            AttributeLookup::Template(prefix) => format!("{prefix}{name}"),
        }
    }
}

/// Caller-selected extraction rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub issuer_strip: IssuerPrefixStrip,
    pub attribute_lookup: AttributeLookup,
}

/// Fields pulled out of a response. `None` means "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub issuer: Option<String>,
    pub name_id: Option<String>,
    pub session_index: Option<String>,
    /// Requested attribute names, in sorted order.
    pub attributes: BTreeMap<String, Option<String>>,
}

impl ExtractedFields {
    /// Look a field up by name: `issuer`, `nameId`, `sessionIndex`, or any
    /// requested attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "issuer" => self.issuer.as_deref(),
            "nameId" => self.name_id.as_deref(),
            "sessionIndex" => self.session_index.as_deref(),
            other => self.attributes.get(other).and_then(|v| v.as_deref()),
        }
    }
}

struct Queries {
    issuer: Path,
    name_id: Path,
    authn_statement: Path,
    attribute: Path,
    attribute_value: Path,
}

impl Queries {
    fn compile() -> Result<Self, Error> {
        let resolver = NamespaceResolver::new();
        Ok(Self {
            issuer: Path::parse(ISSUER, &resolver)?,
            name_id: Path::parse(NAME_ID, &resolver)?,
            authn_statement: Path::parse(AUTHN_STATEMENT, &resolver)?,
            attribute: Path::parse(ATTRIBUTE, &resolver)?,
            attribute_value: Path::parse(ATTRIBUTE_VALUE, &resolver)?,
        })
    }
}

/// Namespace-aware queries over a parsed plaintext response.
pub struct AttributeExtractor<'input> {
    doc: roxmltree::Document<'input>,
    queries: Queries,
}

impl<'input> AttributeExtractor<'input> {
    /// Parse `xml`. This is the only fallible step.
    pub fn parse(xml: &'input str) -> Result<Self, Error> {
        let doc = kista_xml::parse(xml)?;
        Ok(Self {
            doc,
            queries: Queries::compile()?,
        })
    }

    pub fn document(&self) -> &roxmltree::Document<'input> {
        &self.doc
    }

    /// Whether an `EncryptedAssertion` is still present.
    pub fn is_encrypted(&self) -> bool {
        crate::decrypt::is_encrypted(&self.doc)
    }

    /// Text of the first `saml:Issuer` in document order, with `strip` applied.
    pub fn issuer(&self, strip: &IssuerPrefixStrip) -> Option<String> {
        self.queries
            .issuer
            .select_first(self.doc.root())
            .map(|n| strip.apply(&element_text(n)))
    }

    /// Text of `saml:Subject/saml:NameID`.
    pub fn name_id(&self) -> Option<String> {
        self.queries
            .name_id
            .select_first(self.doc.root())
            .map(element_text)
    }

    /// `SessionIndex` attribute of the first `saml:AuthnStatement`.
    pub fn session_index(&self) -> Option<String> {
        self.queries
            .authn_statement
            .select_first(self.doc.root())
            .and_then(|n| n.attribute(ns::attr::SESSION_INDEX))
            .map(str::to_owned)
    }

    /// First value of the attribute named `name` under `lookup`.
    pub fn attribute(&self, name: &str, lookup: &AttributeLookup) -> Option<String> {
        self.values(name, lookup).next()
    }

    /// Every value of the attribute named `name` under `lookup`, in document order.
    pub fn attribute_values(&self, name: &str, lookup: &AttributeLookup) -> Vec<String> {
        self.values(name, lookup).collect()
    }

    /// Collect the well-known fields plus each of `attributes`.
    pub fn extract(&self, policy: &ExtractionPolicy, attributes: &[&str]) -> ExtractedFields {
        ExtractedFields {
            issuer: self.issuer(&policy.issuer_strip),
            name_id: self.name_id(),
            session_index: self.session_index(),
            attributes: attributes
                .iter()
                .map(|name| {
                    (
                        (*name).to_owned(),
                        self.attribute(name, &policy.attribute_lookup),
                    )
                })
                .collect(),
        }
    }

    fn values<'s>(
        &'s self,
        name: &str,
        lookup: &AttributeLookup,
    ) -> impl Iterator<Item = String> + 's {
        let wanted = lookup.resolve(name);
        self.queries
            .attribute
            .select_all(self.doc.root())
            .into_iter()
            .filter(move |n| n.attribute(ns::attr::NAME) == Some(wanted.as_str()))
            .flat_map(move |n| self.queries.attribute_value.select_all(n))
            .map(element_text)
    }
}

fn element_text(node: roxmltree::Node<'_, '_>) -> String {
    text_content(node).trim().to_owned()
}
