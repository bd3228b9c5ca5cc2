//! Driver Event Types
//!
//! Resolved per-element output and the recoverable namespace violations
//! surfaced while producing it.

use crate::core::ResolvedName;
use std::fmt;

/// Result of resolving one element start tag
#[derive(Debug, Clone)]
pub struct ResolvedElement {
    /// Resolved element name
    pub name: ResolvedName,
    /// Resolved attributes; namespace declarations are excluded unless
    /// the driver is configured to report them
    pub attributes: Vec<ResolvedAttribute>,
}

/// A resolved attribute with its value
#[derive(Debug, Clone)]
pub struct ResolvedAttribute {
    pub name: ResolvedName,
    pub value: String,
}

/// Recoverable namespace violations.
///
/// The driver reports these and continues with a substitute; whether they
/// are fatal is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Attempt to declare the reserved `xml` or `xmlns` prefix
    ReservedPrefix { prefix: String },
    /// A qualified name used a prefix with no active binding
    UndeclaredPrefix { raw_name: String, is_attribute: bool },
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceError::ReservedPrefix { prefix } => {
                write!(f, "illegal namespace prefix: {}", prefix)
            }
            NamespaceError::UndeclaredPrefix { raw_name, is_attribute } => {
                let kind = if *is_attribute { "attribute" } else { "element" };
                write!(f, "undeclared namespace prefix in {} name: {}", kind, raw_name)
            }
        }
    }
}

impl std::error::Error for NamespaceError {}
