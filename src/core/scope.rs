//! Scope Frames
//!
//! Binding tables for one lexical scope, with copy-on-write sharing
//! between parent and child frames. A freshly pushed frame aliases its
//! parent's tables; the first declaration in the frame materializes an
//! owned copy with empty resolution caches. Cache writes that happen
//! before materialization land in the shared tables, where the bindings
//! are identical for both frames.

use super::name::ResolvedName;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame's tables
pub(crate) type TableHandle = Rc<RefCell<Tables>>;

/// Binding tables and resolution caches for one scope
#[derive(Debug, Default)]
pub(crate) struct Tables {
    /// Effective prefix bindings: inherited entries plus this scope's own
    pub prefix_to_uri: HashMap<Rc<str>, Rc<str>>,
    /// Advisory reverse mapping; the last declaration for a URI wins
    pub uri_to_prefix: HashMap<Rc<str>, Rc<str>>,
    /// URI bound to the empty prefix, if any
    pub default_uri: Option<Rc<str>>,
    /// Resolution caches keyed by exact raw name, valid only for the
    /// bindings in force in this frame
    pub element_names: HashMap<Rc<str>, ResolvedName>,
    pub attribute_names: HashMap<Rc<str>, ResolvedName>,
}

impl Tables {
    /// Copy of the binding state with fresh, empty resolution caches
    fn cloned_bindings(&self) -> Tables {
        Tables {
            prefix_to_uri: self.prefix_to_uri.clone(),
            uri_to_prefix: self.uri_to_prefix.clone(),
            default_uri: self.default_uri.clone(),
            element_names: HashMap::new(),
            attribute_names: HashMap::new(),
        }
    }
}

/// One entry of the resolver's scope stack.
///
/// Popped frames keep their allocation and are reused when the stack
/// regrows; `clear` drops the table handle so the no-longer-needed tables
/// can be collected.
#[derive(Debug, Default)]
pub(crate) struct ScopeFrame {
    tables: Option<TableHandle>,
    /// Prefixes declared directly in this frame, in declaration order
    declared: Vec<Rc<str>>,
    /// Whether this frame owns its tables yet (copy-on-write trigger)
    decl_seen: bool,
}

impl ScopeFrame {
    /// Reinitialize as the root frame with empty owned tables
    pub fn reset_root(&mut self) {
        self.tables = Some(Rc::new(RefCell::new(Tables::default())));
        self.declared.clear();
        self.decl_seen = true;
    }

    /// Enter this frame as a child of `parent`, aliasing its tables
    pub fn attach(&mut self, parent: &ScopeFrame) {
        self.tables = parent.tables.clone();
        self.declared.clear();
        self.decl_seen = false;
    }

    /// Drop table references and declarations so the frame can be reused
    pub fn clear(&mut self) {
        self.tables = None;
        self.declared.clear();
        self.decl_seen = false;
    }

    /// Tables currently in force for this frame.
    ///
    /// Panics when the frame has been cleared; only frames at or below the
    /// resolver's current depth are active.
    pub fn tables(&self) -> &TableHandle {
        self.tables.as_ref().expect("scope frame is not active")
    }

    /// Prefixes declared directly in this frame
    pub fn declared(&self) -> &[Rc<str>] {
        &self.declared
    }

    /// Whether this frame still aliases its parent's tables
    #[cfg(test)]
    pub fn shares_tables_with(&self, other: &ScopeFrame) -> bool {
        match (&self.tables, &other.tables) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Declare a binding in this frame, materializing owned tables first.
    ///
    /// Unchecked: reserved-prefix rejection happens in the resolver. The
    /// empty prefix sets or (with an empty URI) clears the default
    /// namespace.
    pub fn declare(&mut self, prefix: Rc<str>, uri: Rc<str>) {
        if !self.decl_seen {
            self.materialize();
        }
        let tables = self.tables().clone();
        let mut t = tables.borrow_mut();
        if prefix.is_empty() {
            t.default_uri = if uri.is_empty() { None } else { Some(uri) };
        } else {
            t.prefix_to_uri.insert(prefix.clone(), uri.clone());
            t.uri_to_prefix.insert(uri, prefix.clone());
        }
        drop(t);
        self.declared.push(prefix);
    }

    /// Remove a binding declared directly in this frame and invalidate its
    /// resolution caches
    pub fn retract(&mut self, prefix: &str) {
        if let Some(pos) = self.declared.iter().rposition(|p| &**p == prefix) {
            self.declared.remove(pos);
        }
        let tables = self.tables().clone();
        let mut t = tables.borrow_mut();
        if let Some(uri) = t.prefix_to_uri.remove(prefix) {
            if t.uri_to_prefix.get(&*uri).map_or(false, |p| &**p == prefix) {
                t.uri_to_prefix.remove(&*uri);
            }
        }
        t.element_names.clear();
        t.attribute_names.clear();
    }

    /// Drop all cached name resolutions for this frame
    pub fn invalidate_caches(&self) {
        let mut t = self.tables().borrow_mut();
        t.element_names.clear();
        t.attribute_names.clear();
    }

    /// Copy-on-write: clone the aliased binding tables, reset the caches.
    /// Runs at most once per push, on the first declaration.
    fn materialize(&mut self) {
        let fresh = match &self.tables {
            Some(shared) => shared.borrow().cloned_bindings(),
            None => Tables::default(),
        };
        self.tables = Some(Rc::new(RefCell::new(fresh)));
        self.decl_seen = true;
    }
}
