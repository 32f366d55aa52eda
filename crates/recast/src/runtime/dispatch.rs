//! Call resolution and the per-class call-site cache.
//!
//! This module implements the runtime's call-optimization machinery: the
//! piece that memoizes resolved call targets so repeated indirect sends on a
//! class skip the inheritance walk. Only the memoization side lives here in
//! full; actual invocation is a one-line call through the resolved [`Imp`].
//!
//! # Resolution Algorithm
//!
//! 1. If the receiver class carries a call-site cache slot, consult it
//! 2. On a hit, return the cached call site
//! 3. On a miss, walk the inheritance chain via `lookup_method`
//! 4. Memoize the result into the slot (when present) and return it
//!
//! # Thread Safety and Visibility
//!
//! The cache map sits behind an `RwLock`. Overwriting the map under the
//! write lock synchronizes-with every later read-lock acquisition, so a
//! dispatch that starts after a clear completes can never observe the
//! pre-clear contents. That release/acquire pairing is the visibility
//! guarantee the reload layer leans on.

use crate::error::{Error, Result};
use crate::runtime::Selector;
use crate::runtime::class::{Class, Imp};
use fxhash::FxHashMap;
use std::fmt;
use std::sync::RwLock;

/// A resolved call target: where the method was found and its entry point.
#[derive(Clone)]
pub struct CallSite {
    /// The class whose method table answered the lookup (may be an
    /// ancestor of the receiver class).
    pub defining_class: Class,
    /// The resolved implementation.
    pub imp: Imp,
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("defining_class", &self.defining_class.name())
            .field("imp", &(self.imp as usize as *const ()))
            .finish()
    }
}

/// The dispatch-cache slot of one dynamic-compiled class.
///
/// Owned by the class metadata: the runtime creates it at class
/// construction and nothing ever detaches it. External code may overwrite
/// the contents (that is the whole reload contract) but the slot itself is
/// permanent for the life of the class.
pub struct CallSiteCache {
    /// Name of the owning class, carried for error reporting.
    owner: String,
    /// Memoized call sites: selector hash -> CallSite.
    sites: RwLock<FxHashMap<u64, CallSite>>,
}

impl CallSiteCache {
    pub(crate) fn new(owner: &str) -> Self {
        CallSiteCache {
            owner: owner.to_string(),
            sites: RwLock::new(FxHashMap::default()),
        }
    }

    /// Returns the memoized call site for a selector, if any.
    ///
    /// Takes the read lock only; concurrent dispatches share it. A poisoned
    /// lock reads as a miss, which is always safe: the slow path re-resolves
    /// from the method tables.
    #[must_use]
    pub fn lookup(&self, selector: &Selector) -> Option<CallSite> {
        self.sites
            .read()
            .ok()
            .and_then(|sites| sites.get(&selector.hash()).cloned())
    }

    /// Memoizes a resolved call site for a selector.
    ///
    /// A poisoned lock skips the memoization; dispatch stays correct, just
    /// unaccelerated.
    pub fn memoize(&self, selector: &Selector, site: CallSite) {
        if let Ok(mut sites) = self.sites.write() {
            sites.insert(selector.hash(), site);
        }
    }

    /// Overwrites the slot contents with the empty value.
    ///
    /// This is a full reset: the whole map is replaced under the write
    /// lock, never pruned entry by entry, because a partial clear can leave
    /// the cache semantically inconsistent with the swapped-in methods.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentMetadata`] if the slot lock is
    /// poisoned. A clear that cannot complete must surface as a failure:
    /// stale dispatch targets may otherwise persist.
    pub fn clear(&self) -> Result<()> {
        let mut sites =
            self.sites
                .write()
                .map_err(|_| Error::InconsistentMetadata {
                    class: self.owner.clone(),
                })?;
        *sites = FxHashMap::default();
        Ok(())
    }

    /// Number of memoized call sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.read().map(|sites| sites.len()).unwrap_or(0)
    }

    /// Whether the slot currently holds the empty value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for CallSiteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSiteCache")
            .field("owner", &self.owner)
            .field("len", &self.len())
            .finish()
    }
}

/// Resolves a selector against a receiver class, memoizing the result.
///
/// This is the fast path the runtime takes for every indirect send. Host
/// classes (no slot) resolve through the inheritance walk every time.
///
/// # Errors
///
/// Returns [`Error::SelectorNotFound`] if neither the class nor any
/// ancestor defines a method for the selector.
pub fn resolve(class: &Class, selector: &Selector) -> Result<CallSite> {
    // Fast path: consult the slot
    if let Some(cache) = class.call_site_cache()
        && let Some(site) = cache.lookup(selector)
    {
        return Ok(site);
    }

    // Slow path: inheritance walk
    let (defining_class, method) =
        class
            .lookup_method(selector)
            .ok_or_else(|| Error::SelectorNotFound {
                class: class.name().to_string(),
                selector: selector.name().to_string(),
            })?;

    let site = CallSite {
        defining_class,
        imp: method.imp,
    };

    if let Some(cache) = class.call_site_cache() {
        cache.memoize(selector, site.clone());
    }

    Ok(site)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::class::Method;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_ID: AtomicUsize = AtomicUsize::new(0);

    fn unique_name(prefix: &str) -> String {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}_{id}")
    }

    fn imp_one(_args: &[i64]) -> i64 {
        1
    }

    fn imp_two(_args: &[i64]) -> i64 {
        2
    }

    fn class_with_method(prefix: &str, sel: &Selector, imp: Imp) -> Class {
        let class = Class::new_dynamic(&unique_name(prefix), None).unwrap();
        class
            .add_method(Method {
                selector: sel.clone(),
                imp,
            })
            .unwrap();
        class
    }

    #[test]
    fn test_resolve_memoizes() {
        let sel = Selector::from_str("compute").unwrap();
        let class = class_with_method("DispatchMemo", &sel, imp_one);

        assert!(class.call_site_cache().unwrap().is_empty());

        let site = resolve(&class, &sel).unwrap();
        assert_eq!((site.imp)(&[]), 1);
        assert_eq!(class.call_site_cache().unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_cache_hit() {
        let sel = Selector::from_str("compute").unwrap();
        let class = class_with_method("DispatchHit", &sel, imp_one);

        let _ = resolve(&class, &sel).unwrap();

        // Replacing the method without clearing the slot leaves the stale
        // target visible; that is the exact hazard the reload layer closes.
        class.replace_method(&sel, imp_two).unwrap();
        let stale = resolve(&class, &sel).unwrap();
        assert_eq!((stale.imp)(&[]), 1);
    }

    #[test]
    fn test_resolve_after_clear_sees_fresh_imp() {
        let sel = Selector::from_str("compute").unwrap();
        let class = class_with_method("DispatchFresh", &sel, imp_one);

        let _ = resolve(&class, &sel).unwrap();
        class.replace_method(&sel, imp_two).unwrap();
        class.call_site_cache().unwrap().clear().unwrap();

        let fresh = resolve(&class, &sel).unwrap();
        assert_eq!((fresh.imp)(&[]), 2);
    }

    #[test]
    fn test_resolve_host_class_never_caches() {
        let sel = Selector::from_str("compute").unwrap();
        let class = Class::new_host(&unique_name("DispatchHost"), None).unwrap();
        class
            .add_method(Method {
                selector: sel.clone(),
                imp: imp_one,
            })
            .unwrap();

        let site = resolve(&class, &sel).unwrap();
        assert_eq!((site.imp)(&[]), 1);
        assert!(class.call_site_cache().is_none());
    }

    #[test]
    fn test_resolve_selector_not_found() {
        let class = Class::new_dynamic(&unique_name("DispatchNone"), None).unwrap();
        let sel = Selector::from_str("ghost").unwrap();
        assert!(matches!(
            resolve(&class, &sel),
            Err(Error::SelectorNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_records_defining_class() {
        let sel = Selector::from_str("inherited").unwrap();
        let parent = class_with_method("DispatchSuper", &sel, imp_one);
        let child =
            Class::new_dynamic(&unique_name("DispatchSub"), Some(&parent)).unwrap();

        let site = resolve(&child, &sel).unwrap();
        assert_eq!(site.defining_class, parent);
        // Memoized on the receiver, not the defining class
        assert_eq!(child.call_site_cache().unwrap().len(), 1);
        assert!(parent.call_site_cache().unwrap().is_empty());
    }

    #[test]
    fn test_clear_is_full_reset() {
        let sel_a = Selector::from_str("first").unwrap();
        let sel_b = Selector::from_str("second").unwrap();
        let class = class_with_method("DispatchReset", &sel_a, imp_one);
        class
            .add_method(Method {
                selector: sel_b.clone(),
                imp: imp_two,
            })
            .unwrap();

        let _ = resolve(&class, &sel_a).unwrap();
        let _ = resolve(&class, &sel_b).unwrap();
        let cache = class.call_site_cache().unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear().unwrap();
        assert!(cache.is_empty());
        assert!(cache.lookup(&sel_a).is_none());
        assert!(cache.lookup(&sel_b).is_none());
    }
}
