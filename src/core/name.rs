//! Qualified Name Handling
//!
//! Splits raw qualified names at the first colon and carries resolved
//! (URI, local name, raw name) triples with shared string storage.

use lru::LruCache;
use memchr::memchr;
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Number of distinct raw names whose split parts stay cached
const SPLIT_CACHE_CAPACITY: usize = 512;

/// A resolved XML name: namespace URI, local name, raw qualified name.
///
/// The empty URI means the name is in no namespace. Fields share their
/// backing storage, so clones are cheap and repeated resolutions of the
/// same raw name in one scope hand back triples over the same allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    uri: Rc<str>,
    local: Rc<str>,
    raw: Rc<str>,
}

impl ResolvedName {
    pub(crate) fn new(uri: Rc<str>, local: Rc<str>, raw: Rc<str>) -> Self {
        ResolvedName { uri, local, raw }
    }

    /// Namespace URI, or `""` if the name is in no namespace
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Local part of the name (after the prefix)
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// The name exactly as written, prefix included
    pub fn raw_name(&self) -> &str {
        &self.raw
    }

    /// Prefix part of the raw name, if any
    pub fn prefix(&self) -> Option<&str> {
        memchr(b':', self.raw.as_bytes()).map(|pos| &self.raw[..pos])
    }

    pub(crate) fn raw_rc(&self) -> &Rc<str> {
        &self.raw
    }
}

/// Split parts of a raw qualified name.
///
/// Splitting is independent of any scope's bindings, so parts can be
/// shared resolver-wide.
#[derive(Debug, Clone)]
pub(crate) struct SplitName {
    pub raw: Rc<str>,
    /// Part before the first colon; `None` when the name has no colon
    pub prefix: Option<Rc<str>>,
    pub local: Rc<str>,
}

/// Split a raw name into prefix and local parts at the first colon
pub(crate) fn split_qname(raw_name: &str) -> SplitName {
    let raw: Rc<str> = Rc::from(raw_name);
    match memchr(b':', raw.as_bytes()) {
        Some(pos) => SplitName {
            prefix: Some(Rc::from(&raw[..pos])),
            local: Rc::from(&raw[pos + 1..]),
            raw,
        },
        None => SplitName {
            prefix: None,
            local: raw.clone(),
            raw,
        },
    }
}

/// Bounded cache of qualified-name splits.
///
/// Element and attribute names repeat heavily across a document; caching
/// the split avoids reallocating the same parts in every scope.
pub(crate) struct SplitCache {
    cache: LruCache<Rc<str>, SplitName>,
}

impl std::fmt::Debug for SplitCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitCache")
            .field("len", &self.cache.len())
            .finish()
    }
}

impl SplitCache {
    pub fn new() -> Self {
        SplitCache {
            cache: LruCache::new(NonZeroUsize::new(SPLIT_CACHE_CAPACITY).unwrap()),
        }
    }

    /// Split `raw_name`, reusing cached parts when it was seen before
    pub fn split(&mut self, raw_name: &str) -> SplitName {
        if let Some(hit) = self.cache.get(raw_name) {
            return hit.clone();
        }
        let split = split_qname(raw_name);
        self.cache.put(split.raw.clone(), split.clone());
        split
    }
}
