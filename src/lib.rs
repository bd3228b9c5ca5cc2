//! RustyNS - Scoped XML namespace resolution
//!
//! A scope-stack namespace-context engine for XML parsers:
//!
//! ```text
//! parser tag events ---> ElementDriver ---> resolved elements/attributes
//!                             |
//!                             v
//!                     NamespaceResolver
//!              (scope stack, copy-on-write tables)
//! ```
//!
//! - `core` - prefix binding scopes and qualified-name resolution
//! - `driver` - the per-element two-pass declaration/resolution protocol
//!
//! The engine does no parsing, validation, or I/O of its own: a driving
//! parser pushes a scope per element, feeds it the `xmlns*` attributes,
//! and asks it to split qualified names into (URI, local name, raw name)
//! triples. Resolvers are single-threaded; use one instance per
//! in-progress parse.

pub mod core;
pub mod driver;

pub use crate::core::{ns, NamespaceResolver, ResolvedName};
pub use driver::{
    ElementDriver, NamespaceError, NamespaceHandler, ResolvedAttribute, ResolvedElement,
};
