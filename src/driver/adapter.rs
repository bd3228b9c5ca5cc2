//! Element Driver
//!
//! Runs the two-pass namespace protocol over one element at a time:
//! declarations first, then qualified-name resolution against the
//! completed scope. Resolution must not start until every `xmlns*`
//! attribute of the element has been applied, which is why the passes are
//! separate.

use super::events::{NamespaceError, ResolvedAttribute, ResolvedElement};
use crate::core::{NamespaceResolver, ResolvedName};
use std::rc::Rc;

/// Callback surface for namespace scope notifications.
///
/// All methods have no-op defaults; implement the ones you need.
pub trait NamespaceHandler {
    /// Called when a prefix binding comes into scope.
    ///
    /// # Arguments
    /// * `prefix` - Declared prefix, `""` for the default namespace
    /// * `uri` - The URI it is bound to
    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) {}

    /// Called when a prefix binding goes out of scope
    fn end_prefix_mapping(&mut self, _prefix: &str) {}

    /// Called for recoverable namespace violations
    fn error(&mut self, _error: &NamespaceError) {}
}

/// Handler for callers that want no notifications
impl NamespaceHandler for () {}

/// Per-element driver for the two-pass attribute protocol.
///
/// For each element the enclosing parser supplies the raw tag name and
/// the flat (name, value) attribute list; the driver pushes a scope,
/// applies every `xmlns`/`xmlns:*` declaration, then resolves the element
/// and attribute names. `end_element` reports the scope's declarations
/// going back out of force and pops.
pub struct ElementDriver {
    resolver: NamespaceResolver,
    /// Include namespace-declaration attributes in resolved output
    report_declarations: bool,
}

impl Default for ElementDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementDriver {
    /// Create a driver with a fresh resolver
    pub fn new() -> Self {
        ElementDriver {
            resolver: NamespaceResolver::new(),
            report_declarations: false,
        }
    }

    /// Build a driver around a preconfigured resolver (for example one
    /// with the decl-URIs mode enabled)
    pub fn with_resolver(resolver: NamespaceResolver) -> Self {
        ElementDriver {
            resolver,
            report_declarations: false,
        }
    }

    /// Include `xmlns`/`xmlns:*` attributes in the resolved output
    pub fn set_report_declarations(&mut self, value: bool) {
        self.report_declarations = value;
    }

    /// Shared access to the underlying resolver
    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    /// Mutable access to the underlying resolver
    pub fn resolver_mut(&mut self) -> &mut NamespaceResolver {
        &mut self.resolver
    }

    /// Clear all scope state for a new parse
    pub fn reset(&mut self) {
        self.resolver.reset();
    }

    /// Process one element start tag.
    ///
    /// `attributes` is the flat (raw name, value) list as written in the
    /// tag. Declarations take effect before any name is resolved, so
    /// their position in the list does not matter. A reserved-prefix
    /// declaration or an undeclared prefix is reported through `handler`;
    /// the affected name then carries an empty URI with the local name
    /// equal to the raw name.
    pub fn start_element<H: NamespaceHandler>(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        handler: &mut H,
    ) -> ResolvedElement {
        self.resolver.push_scope();

        // Pass 1: apply namespace declarations
        for (raw, value) in attributes {
            if let Some(prefix) = declared_prefix(raw) {
                if self.resolver.declare_prefix(prefix, value) {
                    handler.start_prefix_mapping(prefix, value);
                } else {
                    handler.error(&NamespaceError::ReservedPrefix {
                        prefix: prefix.to_string(),
                    });
                }
            }
        }

        // Pass 2: resolve against the completed scope
        let resolved_name = self.resolve_or_substitute(name, false, handler);
        let mut resolved_attrs = Vec::with_capacity(attributes.len());
        for (raw, value) in attributes {
            let is_declaration = declared_prefix(raw).is_some();
            if is_declaration && !self.report_declarations {
                continue;
            }
            let attr_name = if is_declaration && !self.resolver.namespace_decl_uris() {
                substitute(raw)
            } else {
                self.resolve_or_substitute(raw, true, handler)
            };
            resolved_attrs.push(ResolvedAttribute {
                name: attr_name,
                value: value.to_string(),
            });
        }

        ResolvedElement {
            name: resolved_name,
            attributes: resolved_attrs,
        }
    }

    /// Process one element end tag.
    ///
    /// Resolves the end-tag name in the element's own scope, reports each
    /// directly declared prefix going out of scope, then pops.
    pub fn end_element<H: NamespaceHandler>(
        &mut self,
        name: &str,
        handler: &mut H,
    ) -> ResolvedName {
        let resolved = self.resolve_or_substitute(name, false, handler);
        for prefix in self.resolver.declared_prefixes() {
            handler.end_prefix_mapping(prefix);
        }
        self.resolver.pop_scope();
        resolved
    }

    fn resolve_or_substitute<H: NamespaceHandler>(
        &mut self,
        raw: &str,
        is_attribute: bool,
        handler: &mut H,
    ) -> ResolvedName {
        match self.resolver.resolve_name(raw, is_attribute) {
            Some(name) => name,
            None => {
                handler.error(&NamespaceError::UndeclaredPrefix {
                    raw_name: raw.to_string(),
                    is_attribute,
                });
                substitute(raw)
            }
        }
    }
}

/// Extract the declared prefix from an `xmlns`/`xmlns:*` attribute name.
///
/// Returns `Some("")` for the bare `xmlns` default declaration, the part
/// after the colon when the colon sits at byte position 5, and `None` for
/// anything else (including names that merely start with `xmlns`).
fn declared_prefix(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    if !bytes.starts_with(b"xmlns") {
        return None;
    }
    match bytes.get(5).copied() {
        None => Some(""),
        Some(b':') => Some(&raw[6..]),
        Some(_) => None,
    }
}

/// Fallback triple: empty URI, local name equal to the raw name
fn substitute(raw: &str) -> ResolvedName {
    let raw: Rc<str> = Rc::from(raw);
    ResolvedName::new(Rc::from(""), raw.clone(), raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ns;

    /// Collects handler callbacks for assertions
    #[derive(Default)]
    struct Recorder {
        started: Vec<(String, String)>,
        ended: Vec<String>,
        errors: Vec<NamespaceError>,
    }

    impl NamespaceHandler for Recorder {
        fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
            self.started.push((prefix.to_string(), uri.to_string()));
        }

        fn end_prefix_mapping(&mut self, prefix: &str) {
            self.ended.push(prefix.to_string());
        }

        fn error(&mut self, error: &NamespaceError) {
            self.errors.push(error.clone());
        }
    }

    #[test]
    fn test_declared_prefix_detection() {
        assert_eq!(declared_prefix("xmlns"), Some(""));
        assert_eq!(declared_prefix("xmlns:a"), Some("a"));
        assert_eq!(declared_prefix("xmlns:"), Some(""));
        assert_eq!(declared_prefix("xmlnsfoo"), None);
        assert_eq!(declared_prefix("id"), None);
        assert_eq!(declared_prefix("xml"), None);
    }

    #[test]
    fn test_declarations_apply_before_resolution() {
        let mut driver = ElementDriver::new();
        let mut recorder = Recorder::default();

        // Declaration listed after the attribute that needs it
        let element = driver.start_element(
            "a:root",
            &[("a:id", "1"), ("xmlns:a", "urn:a")],
            &mut recorder,
        );

        assert_eq!(element.name.uri(), "urn:a");
        assert_eq!(element.name.local_name(), "root");
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attributes[0].name.uri(), "urn:a");
        assert_eq!(element.attributes[0].name.local_name(), "id");
        assert_eq!(element.attributes[0].value, "1");
        assert!(recorder.errors.is_empty());
        assert_eq!(recorder.started, vec![("a".to_string(), "urn:a".to_string())]);
    }

    #[test]
    fn test_default_namespace_element_only() {
        let mut driver = ElementDriver::new();
        let element = driver.start_element(
            "doc",
            &[("xmlns", "urn:default"), ("title", "t")],
            &mut (),
        );

        assert_eq!(element.name.uri(), "urn:default");
        // Unprefixed attributes stay out of the default namespace
        assert_eq!(element.attributes[0].name.uri(), "");
        assert_eq!(element.attributes[0].name.local_name(), "title");
    }

    #[test]
    fn test_declaration_attributes_hidden_by_default() {
        let mut driver = ElementDriver::new();
        let element = driver.start_element(
            "doc",
            &[("xmlns:a", "urn:a"), ("a:x", "1")],
            &mut (),
        );
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attributes[0].name.raw_name(), "a:x");
    }

    #[test]
    fn test_declaration_attributes_reported_when_enabled() {
        let mut driver = ElementDriver::new();
        driver.set_report_declarations(true);
        let element = driver.start_element("doc", &[("xmlns:a", "urn:a")], &mut ());

        assert_eq!(element.attributes.len(), 1);
        let attr = &element.attributes[0];
        assert_eq!(attr.name.raw_name(), "xmlns:a");
        assert_eq!(attr.name.uri(), "");
        assert_eq!(attr.value, "urn:a");
    }

    #[test]
    fn test_declaration_attributes_resolve_in_decl_uris_mode() {
        let mut resolver = NamespaceResolver::new();
        resolver.set_namespace_decl_uris(true);
        let mut driver = ElementDriver::with_resolver(resolver);
        driver.set_report_declarations(true);

        let element = driver.start_element(
            "doc",
            &[("xmlns", "urn:default"), ("xmlns:a", "urn:a")],
            &mut (),
        );

        assert_eq!(element.attributes[0].name.uri(), ns::NSDECL);
        assert_eq!(element.attributes[0].name.raw_name(), "xmlns");
        assert_eq!(element.attributes[1].name.uri(), ns::NSDECL);
        assert_eq!(element.attributes[1].name.local_name(), "a");
    }

    #[test]
    fn test_reserved_prefix_reported() {
        let mut driver = ElementDriver::new();
        let mut recorder = Recorder::default();
        driver.start_element("doc", &[("xmlns:xml", "urn:evil")], &mut recorder);

        assert_eq!(
            recorder.errors,
            vec![NamespaceError::ReservedPrefix {
                prefix: "xml".to_string()
            }]
        );
        assert!(recorder.started.is_empty());
    }

    #[test]
    fn test_undeclared_prefix_substitutes() {
        let mut driver = ElementDriver::new();
        let mut recorder = Recorder::default();
        let element = driver.start_element("foo:bar", &[("foo:a", "1")], &mut recorder);

        assert_eq!(element.name.uri(), "");
        assert_eq!(element.name.local_name(), "foo:bar");
        assert_eq!(element.name.raw_name(), "foo:bar");
        assert_eq!(element.attributes[0].name.local_name(), "foo:a");
        assert_eq!(recorder.errors.len(), 2);
        assert_eq!(
            recorder.errors[0],
            NamespaceError::UndeclaredPrefix {
                raw_name: "foo:bar".to_string(),
                is_attribute: false,
            }
        );
    }

    #[test]
    fn test_end_element_reports_mappings_and_pops() {
        let mut driver = ElementDriver::new();
        let mut recorder = Recorder::default();

        driver.start_element(
            "a:root",
            &[("xmlns:a", "urn:a"), ("xmlns", "urn:default")],
            &mut recorder,
        );
        let end = driver.end_element("a:root", &mut recorder);

        // End tag resolved in the element's own scope, before the pop
        assert_eq!(end.uri(), "urn:a");
        assert_eq!(recorder.ended, vec!["a".to_string(), "".to_string()]);
        assert_eq!(driver.resolver().depth(), 0);
        assert_eq!(driver.resolver().uri_for_prefix("a"), None);
    }

    #[test]
    fn test_nested_scopes_shadow_and_restore() {
        let mut driver = ElementDriver::new();

        let outer = driver.start_element("p:e", &[("xmlns:p", "urn:1")], &mut ());
        assert_eq!(outer.name.uri(), "urn:1");

        let inner = driver.start_element("p:e", &[("xmlns:p", "urn:2")], &mut ());
        assert_eq!(inner.name.uri(), "urn:2");

        assert_eq!(driver.end_element("p:e", &mut ()).uri(), "urn:2");
        assert_eq!(driver.end_element("p:e", &mut ()).uri(), "urn:1");
    }

    #[test]
    fn test_driver_reset() {
        let mut driver = ElementDriver::new();
        driver.start_element("doc", &[("xmlns:a", "urn:a")], &mut ());
        driver.reset();
        assert_eq!(driver.resolver().depth(), 0);
        assert_eq!(driver.resolver().uri_for_prefix("a"), None);
    }
}
