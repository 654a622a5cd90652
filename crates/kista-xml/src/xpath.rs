#![forbid(unsafe_code)]

//! Minimal namespace-aware path subset.
//!
//! Only supports what SAML field extraction needs:
//! - `prefix:Local` name tests, resolved through [`NamespaceResolver`]
//! - a leading `//` selecting descendants of the context node
//! - `/` selecting children
//!
//! Predicates and other axes are not supported; callers filter the
//! selected nodes themselves.

use crate::document::is_element;
use kista_core::{Error, NamespaceResolver};

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    descendants: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    ns: &'static str,
    local: String,
}

impl Path {
    /// Compile `expr`, resolving every prefix through `resolver`.
    pub fn parse(expr: &str, resolver: &NamespaceResolver) -> Result<Self, Error> {
        let (descendants, rest) = match expr.strip_prefix("//") {
            Some(rest) => (true, rest),
            None => (false, expr),
        };

        let mut steps = Vec::new();
        for raw in rest.split('/') {
            if raw.is_empty() {
                return Err(Error::InvalidQuery(format!("empty step in `{expr}`")));
            }
            let step = match raw.split_once(':') {
                Some((prefix, local)) => {
                    let ns = resolver.resolve(prefix).ok_or_else(|| {
                        Error::InvalidQuery(format!("unbound prefix `{prefix}` in `{expr}`"))
                    })?;
                    Step {
                        ns,
                        local: local.to_owned(),
                    }
                }
                None => Step {
                    ns: "",
                    local: raw.to_owned(),
                },
            };
            steps.push(step);
        }

        Ok(Self { descendants, steps })
    }

    /// Every node matched from `context`, in document order.
    pub fn select_all<'a, 'input>(
        &self,
        context: roxmltree::Node<'a, 'input>,
    ) -> Vec<roxmltree::Node<'a, 'input>> {
        let mut out = Vec::new();
        let Some((first, rest)) = self.steps.split_first() else {
            return out;
        };

        if self.descendants {
            for node in context.descendants().filter(|n| n.id() != context.id()) {
                if first.matches(node) {
                    collect(node, rest, &mut out);
                }
            }
        } else {
            for node in context.children() {
                if first.matches(node) {
                    collect(node, rest, &mut out);
                }
            }
        }
        out
    }

    /// The first node matched from `context` in document order.
    pub fn select_first<'a, 'input>(
        &self,
        context: roxmltree::Node<'a, 'input>,
    ) -> Option<roxmltree::Node<'a, 'input>> {
        self.select_all(context).into_iter().next()
    }
}

impl Step {
    fn matches(&self, node: roxmltree::Node<'_, '_>) -> bool {
        is_element(node, self.ns, &self.local)
    }
}

fn collect<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    steps: &[Step],
    out: &mut Vec<roxmltree::Node<'a, 'input>>,
) {
    match steps.split_first() {
        None => out.push(node),
        Some((step, rest)) => {
            for child in node.children().filter(|c| step.matches(*c)) {
                collect(child, rest, out);
            }
        }
    }
}

/// Compile `expr` and return its first match from `context`.
pub fn select_first<'a, 'input>(
    context: roxmltree::Node<'a, 'input>,
    expr: &str,
) -> Result<Option<roxmltree::Node<'a, 'input>>, Error> {
    let path = Path::parse(expr, &NamespaceResolver::new())?;
    Ok(path.select_first(context))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol">
        <a:Assertion xmlns:a="urn:oasis:names:tc:SAML:2.0:assertion">
            <a:Subject><a:NameID>first</a:NameID></a:Subject>
            <a:Subject><a:NameID>second</a:NameID></a:Subject>
        </a:Assertion>
    </samlp:Response>"#;

    #[test]
    fn test_descendant_then_child() {
        let doc = roxmltree::Document::parse(XML).unwrap();
        let path = Path::parse("//saml:Subject/saml:NameID", &NamespaceResolver::new()).unwrap();
        let hits = path.select_all(doc.root());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text(), Some("first"));
        assert_eq!(path.select_first(doc.root()).unwrap().text(), Some("first"));
    }

    #[test]
    fn test_relative_path_only_matches_children() {
        let doc = roxmltree::Document::parse(XML).unwrap();
        let root = doc.root_element();
        assert!(select_first(root, "saml:Subject").unwrap().is_none());
        let assertion = select_first(root, "saml:Assertion").unwrap().unwrap();
        assert_eq!(assertion.tag_name().name(), "Assertion");
    }

    #[test]
    fn test_matches_by_uri_not_prefix() {
        let doc = roxmltree::Document::parse(XML).unwrap();
        let hit = select_first(doc.root(), "//saml:NameID").unwrap();
        assert_eq!(hit.and_then(|n| n.text()), Some("first"));
    }

    #[test]
    fn test_rejects_unbound_prefix() {
        let err = Path::parse("//wsse:Security", &NamespaceResolver::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_rejects_empty_step() {
        let err = Path::parse("saml:Assertion//saml:Subject", &NamespaceResolver::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }
}
