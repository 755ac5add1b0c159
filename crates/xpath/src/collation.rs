//! String collations and the process-wide active collation.
//!
//! Locale-aware comparisons read the active collation through
//! [`active_collation`]. It is swapped for the duration of a scope with
//! [`use_collation`]; the returned guard puts the previous value back when it
//! is dropped, also on early returns and unwinding. The state is shared by the
//! whole process: concurrent evaluations that both switch collations will see
//! each other's choice.

use crate::consts::{CODEPOINT_URI, SIMPLE_ACCENT_URI, SIMPLE_CASE_ACCENT_URI, SIMPLE_CASE_URI};
use crate::error::{Error, ErrorCode};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub trait Collation: Send + Sync {
    fn uri(&self) -> &str;
    fn compare(&self, a: &str, b: &str) -> Ordering;
    fn key(&self, s: &str) -> String {
        s.to_string()
    }
}

pub struct CodepointCollation;

impl Collation for CodepointCollation {
    fn uri(&self) -> &str {
        CODEPOINT_URI
    }
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Case-insensitive collation
pub struct SimpleCaseCollation;

impl Collation for SimpleCaseCollation {
    fn uri(&self) -> &str {
        SIMPLE_CASE_URI
    }
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        s.to_lowercase()
    }
}

fn strip_marks(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    use unicode_normalization::char::canonical_combining_class as ccc;
    s.nfd().filter(|&ch| ccc(ch) == 0).collect()
}

/// Accent-insensitive collation (NFD, combining marks removed)
pub struct SimpleAccentCollation;

impl Collation for SimpleAccentCollation {
    fn uri(&self) -> &str {
        SIMPLE_ACCENT_URI
    }
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        strip_marks(s)
    }
}

pub struct SimpleCaseAccentCollation;

impl Collation for SimpleCaseAccentCollation {
    fn uri(&self) -> &str {
        SIMPLE_CASE_ACCENT_URI
    }
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        strip_marks(s).to_lowercase()
    }
}

/// Available collations keyed by URI.
pub struct CollationRegistry {
    by_uri: HashMap<String, Arc<dyn Collation>>,
}

impl Default for CollationRegistry {
    fn default() -> Self {
        let mut reg = Self {
            by_uri: HashMap::new(),
        };
        reg.insert(Arc::new(CodepointCollation));
        reg.insert(Arc::new(SimpleCaseCollation));
        reg.insert(Arc::new(SimpleAccentCollation));
        reg.insert(Arc::new(SimpleCaseAccentCollation));
        reg
    }
}

impl CollationRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, uri: &str) -> Option<Arc<dyn Collation>> {
        self.by_uri.get(uri).cloned()
    }
    pub fn insert(&mut self, collation: Arc<dyn Collation>) {
        self.by_uri.insert(collation.uri().to_string(), collation);
    }
    pub fn contains(&self, uri: &str) -> bool {
        self.by_uri.contains_key(uri)
    }

    /// Collation for `uri`, or FOCH0002 when it is not registered.
    pub fn resolve(&self, uri: &str) -> Result<Arc<dyn Collation>, Error> {
        self.get(uri).ok_or_else(|| {
            Error::from_code(ErrorCode::FOCH0002, format!("unsupported collation {uri:?}"))
        })
    }
}

impl fmt::Debug for CollationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut uris: Vec<&str> = self.by_uri.keys().map(String::as_str).collect();
        uris.sort_unstable();
        f.debug_struct("CollationRegistry").field("uris", &uris).finish()
    }
}

static ACTIVE: Mutex<Option<Arc<dyn Collation>>> = Mutex::new(None);

/// Collation currently in effect for locale-aware comparisons, the codepoint
/// collation when no scope is active.
pub fn active_collation() -> Arc<dyn Collation> {
    ACTIVE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| Arc::new(CodepointCollation))
}

/// Collation made active by an enclosing [`use_collation`] scope, if any.
pub fn scoped_collation() -> Option<Arc<dyn Collation>> {
    ACTIVE.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

/// URI of the collation in effect.
pub fn active_collation_uri() -> String {
    active_collation().uri().to_string()
}

/// Restores the previously active collation when dropped.
#[must_use = "the collation is restored as soon as the guard is dropped"]
pub struct CollationGuard {
    previous: Option<Arc<dyn Collation>>,
}

impl Drop for CollationGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        tracing::trace!(
            uri = previous.as_ref().map_or(CODEPOINT_URI, |c| c.uri()),
            "restoring collation"
        );
        *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = previous;
    }
}

impl fmt::Debug for CollationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollationGuard")
            .field("previous", &self.previous.as_ref().map(|c| c.uri().to_string()))
            .finish()
    }
}

/// Makes the collation `uri` active until the returned guard is dropped.
///
/// An unsupported collation leaves the active one untouched and fails with FOCH0002.
pub fn use_collation(registry: &CollationRegistry, uri: &str) -> Result<CollationGuard, Error> {
    let collation = registry.resolve(uri)?;
    let mut active = ACTIVE.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = active.replace(collation);
    tracing::trace!(uri, "switching collation");
    Ok(CollationGuard { previous })
}
