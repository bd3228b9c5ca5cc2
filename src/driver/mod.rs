//! Per-Element Namespace Driver
//!
//! Applies the two-pass attribute protocol around a `NamespaceResolver`:
//!
//! ```text
//! start tag (name, attrs) ---> ElementDriver ---> ResolvedElement
//!                                   |
//!                                   v
//!                           NamespaceHandler
//!                  (prefix mappings, recoverable errors)
//! ```
//!
//! Pass one applies every `xmlns`/`xmlns:*` declaration of the element;
//! pass two resolves the element name and the remaining attribute names
//! against the completed scope.

pub mod adapter;
pub mod events;

pub use adapter::{ElementDriver, NamespaceHandler};
pub use events::{NamespaceError, ResolvedAttribute, ResolvedElement};
