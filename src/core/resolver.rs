//! Namespace Resolution
//!
//! Scope-stack namespace resolver for XML namespace handling: prefix
//! declarations per element scope, qualified-name resolution into
//! (URI, local name, raw name) triples, copy-on-write table inheritance
//! between scopes.

use super::name::{ResolvedName, SplitCache};
use super::ns;
use super::scope::ScopeFrame;
use std::rc::Rc;

/// Initial scope-stack capacity; deeper nesting grows it by doubling
const INITIAL_SCOPES: usize = 32;

/// Scope-stack namespace resolver.
///
/// A driving parser calls `push_scope` once per element before that
/// element's attributes, `declare_prefix` for each `xmlns*` attribute,
/// `resolve_name` for the element name and each remaining attribute name,
/// and `pop_scope` after the element's children. Scope frames are pooled:
/// popping keeps the frame allocation around for the next push at that
/// depth.
///
/// One resolver serves exactly one in-progress parse; the type is
/// neither `Send` nor `Sync`. Use separate instances for concurrent
/// parses, and `reset` between parses when reusing one.
#[derive(Debug)]
pub struct NamespaceResolver {
    /// Scope frames indexed by depth; frames above `depth` are cleared
    scopes: Vec<ScopeFrame>,
    /// Index of the active scope (0 = root)
    depth: usize,
    /// Whether `xmlns`/`xmlns:*` attribute names resolve to the
    /// namespace-declaration URI
    decl_uris: bool,
    /// Raw-name split cache shared across scopes
    splits: SplitCache,
    /// Pre-built reserved strings
    xml_prefix: Rc<str>,
    xmlns_prefix: Rc<str>,
    xml_uri: Rc<str>,
    nsdecl_uri: Rc<str>,
    empty: Rc<str>,
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResolver {
    /// Create a resolver with the root scope in force and `xml` pre-bound
    pub fn new() -> Self {
        let mut resolver = NamespaceResolver {
            scopes: Vec::with_capacity(INITIAL_SCOPES),
            depth: 0,
            decl_uris: false,
            splits: SplitCache::new(),
            xml_prefix: Rc::from("xml"),
            xmlns_prefix: Rc::from("xmlns"),
            xml_uri: Rc::from(ns::XML),
            nsdecl_uri: Rc::from(ns::NSDECL),
            empty: Rc::from(""),
        };
        resolver.scopes.push(ScopeFrame::default());
        resolver.reset();
        resolver
    }

    /// Clear all state back to a fresh root scope.
    ///
    /// Must be called between parses when reusing a resolver. Frame
    /// capacity is retained; table contents are not.
    pub fn reset(&mut self) {
        for frame in &mut self.scopes {
            frame.clear();
        }
        self.depth = 0;
        self.decl_uris = false;
        self.scopes[0].reset_root();
        self.scopes[0].declare(self.xml_prefix.clone(), self.xml_uri.clone());
    }

    /// Current scope depth (0 = root)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a new element scope inheriting the current bindings.
    ///
    /// The new frame aliases the parent's tables until the first
    /// declaration forces a copy.
    pub fn push_scope(&mut self) {
        self.depth += 1;
        if self.depth == self.scopes.len() {
            self.scopes.push(ScopeFrame::default());
        }
        let (parents, rest) = self.scopes.split_at_mut(self.depth);
        rest[0].attach(&parents[self.depth - 1]);
    }

    /// Leave the current element scope.
    ///
    /// Panics when called on the root scope: an unbalanced pop is a caller
    /// protocol violation, not a recoverable XML condition.
    pub fn pop_scope(&mut self) {
        if self.depth == 0 {
            panic!("namespace scope underflow: pop_scope without matching push_scope");
        }
        self.scopes[self.depth].clear();
        self.depth -= 1;
    }

    /// Declare a prefix binding in the current scope.
    ///
    /// Returns `false` without touching any table when `prefix` is the
    /// reserved `xml` or `xmlns`. The empty prefix sets the default
    /// namespace; an empty URI there un-declares it (`xmlns=""`).
    pub fn declare_prefix(&mut self, prefix: &str, uri: &str) -> bool {
        if prefix == "xml" || prefix == "xmlns" {
            return false;
        }
        let prefix = self.shared(prefix);
        let uri = self.shared(uri);
        self.scopes[self.depth].declare(prefix, uri);
        true
    }

    /// Resolve a raw qualified name against the current scope.
    ///
    /// Returns `None` when the name uses a prefix with no active binding,
    /// or uses `xmlns:` as an element prefix. Unprefixed attribute names
    /// never take the default namespace; the unprefixed `xmlns` attribute
    /// resolves to the declaration URI only in decl-URIs mode. Successful
    /// results are cached in this scope under the exact raw name, so
    /// resolving the same name twice returns a triple over the same
    /// allocations. All comparisons are byte-exact.
    pub fn resolve_name(&mut self, raw_name: &str, is_attribute: bool) -> Option<ResolvedName> {
        let tables = self.scopes[self.depth].tables().clone();
        let mut t = tables.borrow_mut();

        let cache = if is_attribute {
            &t.attribute_names
        } else {
            &t.element_names
        };
        if let Some(hit) = cache.get(raw_name) {
            return Some(hit.clone());
        }

        let split = self.splits.split(raw_name);
        let resolved = match split.prefix {
            None => {
                let uri = if is_attribute {
                    if self.decl_uris && &*split.raw == "xmlns" {
                        self.nsdecl_uri.clone()
                    } else {
                        self.empty.clone()
                    }
                } else {
                    t.default_uri.clone().unwrap_or_else(|| self.empty.clone())
                };
                ResolvedName::new(uri, split.local, split.raw)
            }
            Some(prefix) => {
                if !is_attribute && &*prefix == "xmlns" {
                    return None;
                }
                let uri = if prefix.is_empty() {
                    t.default_uri.clone()?
                } else {
                    t.prefix_to_uri.get(&*prefix)?.clone()
                };
                ResolvedName::new(uri, split.local, split.raw)
            }
        };

        let cache = if is_attribute {
            &mut t.attribute_names
        } else {
            &mut t.element_names
        };
        cache.insert(resolved.raw_rc().clone(), resolved.clone());
        Some(resolved)
    }

    /// Look up the URI bound to a prefix in the current scope.
    ///
    /// The empty prefix queries the default namespace.
    pub fn uri_for_prefix(&self, prefix: &str) -> Option<Rc<str>> {
        let t = self.scopes[self.depth].tables().borrow();
        if prefix.is_empty() {
            t.default_uri.clone()
        } else {
            t.prefix_to_uri.get(prefix).cloned()
        }
    }

    /// Advisory reverse lookup: one of the prefixes bound to `uri`.
    ///
    /// The last declaration for a URI wins and the default prefix never
    /// appears here; use `prefixes_for_uri` for the full set.
    pub fn prefix_for_uri(&self, uri: &str) -> Option<Rc<str>> {
        let t = self.scopes[self.depth].tables().borrow();
        t.uri_to_prefix.get(uri).cloned()
    }

    /// Prefixes declared directly in the current scope, in declaration
    /// order; includes `""` when the default namespace was (un)declared
    pub fn declared_prefixes(&self) -> &[Rc<str>] {
        self.scopes[self.depth].declared()
    }

    /// All prefixes with an active binding, inherited ones included.
    ///
    /// The default prefix is excluded by convention; order is unspecified.
    pub fn active_prefixes(&self) -> Vec<Rc<str>> {
        let t = self.scopes[self.depth].tables().borrow();
        t.prefix_to_uri.keys().cloned().collect()
    }

    /// All active prefixes bound to `uri`
    pub fn prefixes_for_uri(&self, uri: &str) -> Vec<Rc<str>> {
        let t = self.scopes[self.depth].tables().borrow();
        t.prefix_to_uri
            .iter()
            .filter(|(_, bound)| &***bound == uri)
            .map(|(prefix, _)| prefix.clone())
            .collect()
    }

    /// Whether `xmlns`/`xmlns:*` attribute names resolve to the
    /// namespace-declaration URI
    pub fn namespace_decl_uris(&self) -> bool {
        self.decl_uris
    }

    /// Switch resolution of namespace-declaration attribute names on or
    /// off.
    ///
    /// Only legal while the root scope is current; panics otherwise.
    /// Enabling binds `xmlns` to the declaration URI in the root scope;
    /// disabling removes that binding again, leaving other root-level
    /// declarations in place. Both directions invalidate the root scope's
    /// resolution caches.
    pub fn set_namespace_decl_uris(&mut self, value: bool) {
        if self.depth != 0 {
            panic!("cannot change namespace-declaration URI mode after a scope has been pushed");
        }
        if value == self.decl_uris {
            return;
        }
        self.decl_uris = value;
        let xmlns = self.xmlns_prefix.clone();
        let nsdecl = self.nsdecl_uri.clone();
        let root = &mut self.scopes[0];
        if value {
            root.invalidate_caches();
            root.declare(xmlns, nsdecl);
        } else {
            root.retract("xmlns");
        }
    }

    fn shared(&self, s: &str) -> Rc<str> {
        if s.is_empty() {
            self.empty.clone()
        } else {
            Rc::from(s)
        }
    }
}
