//! Dispatch-cache invalidation, the core of reload support.
//!
//! When a class's definition is replaced in a running process, call targets
//! memoized before the swap still point at the old method bodies. The
//! invalidator closes that window: given the reloaded class, it locates the
//! class's dispatch-cache slot and overwrites it with the empty value. A
//! class without the slot (an ordinary host class sitting next to
//! dynamic-compiled sources) is a normal, non-fatal outcome. Anything else
//! that keeps the slot from being reset is escalated, because a swallowed
//! failure here silently reintroduces the stale-call bugs this exists to
//! prevent.
//!
//! # Contract
//!
//! The coordinator calls [`DispatchCacheInvalidator::clear_dispatch_cache`]
//! once per affected class, synchronously, after replacing the definition
//! and before allowing new dispatch to proceed. The call is single-shot,
//! constant-time, and idempotent; it never blocks on I/O, spawns work, or
//! retries internally.

use crate::error::Result;
use crate::reload::handle::ReloadedClass;
use crate::reload::introspect::{
    CALL_SITE_SLOT, MetadataIntrospection, SlotIntrospection,
};
use recast_log::debug;

/// Outcome of one invalidation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
    /// The slot was found and overwritten with the empty value.
    Cleared,
    /// The class carries no dispatch-cache slot; nothing to do.
    NotApplicable,
}

/// Clears the dispatch-cache slot of reloaded classes.
///
/// Stateless: safe to share, both calls on one instance and calls on
/// separate instances behave identically. The introspection provider is
/// injected so the outcome logic tests without real runtime metadata.
///
/// # Example
///
/// ```rust
/// use recast::reload::{DispatchCacheInvalidator, Invalidation, ReloadedClass};
/// use recast::runtime::Class;
///
/// let class = Class::new_dynamic("ExampleWidget", None).unwrap();
/// let invalidator = DispatchCacheInvalidator::new();
///
/// let outcome = invalidator
///     .clear_dispatch_cache(&ReloadedClass::from_class(class))
///     .unwrap();
/// assert_eq!(outcome, Invalidation::Cleared);
/// ```
#[derive(Debug, Default)]
pub struct DispatchCacheInvalidator<I = MetadataIntrospection> {
    introspection: I,
}

impl DispatchCacheInvalidator<MetadataIntrospection> {
    /// Creates an invalidator over the in-tree class metadata.
    #[must_use]
    pub fn new() -> Self {
        DispatchCacheInvalidator {
            introspection: MetadataIntrospection,
        }
    }
}

impl<I: SlotIntrospection> DispatchCacheInvalidator<I> {
    /// Creates an invalidator with a custom introspection provider.
    pub fn with_introspection(introspection: I) -> Self {
        DispatchCacheInvalidator { introspection }
    }

    /// Clears one reloaded class's dispatch-cache slot.
    ///
    /// Three outcomes:
    ///
    /// - `Ok(Invalidation::Cleared)` - slot found and fully reset
    /// - `Ok(Invalidation::NotApplicable)` - no slot on this class
    /// - `Err(_)` - the slot exists but could not be reset; the caller
    ///   must not declare the reload of this class complete
    ///
    /// The reset has metadata-publication visibility: once this returns,
    /// no thread performing dispatch on the class can observe the
    /// pre-clear contents.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::error::Error::SlotAccessDenied`],
    /// [`crate::error::Error::SlotWriteFailed`], and
    /// [`crate::error::Error::InconsistentMetadata`] from the provider
    /// unchanged. No failure besides slot absence is ever swallowed.
    pub fn clear_dispatch_cache(
        &self,
        handle: &ReloadedClass,
    ) -> Result<Invalidation> {
        let class = handle.class();
        match self.introspection.find_call_site_slot(class)? {
            Some(slot) => {
                self.introspection.clear_slot(&slot)?;
                debug!("cleared {} slot of class {}", slot.name(), class.name());
                Ok(Invalidation::Cleared)
            }
            None => {
                debug!(
                    "no {CALL_SITE_SLOT} slot on class {}: not a dynamic-compiled class?",
                    class.name()
                );
                Ok(Invalidation::NotApplicable)
            }
        }
    }

    /// Clears the slots of a whole reload batch, one class at a time.
    ///
    /// Classes are treated independently; no ordering is guaranteed across
    /// the batch, and a batch mixing related classes relies on each
    /// clear being idempotent rather than on sequencing.
    ///
    /// # Errors
    ///
    /// Stops at the first failing class and returns its error. Classes
    /// cleared before the failure stay cleared, which is safe: re-running
    /// the batch re-clears them with no further effect.
    pub fn clear_dispatch_caches(
        &self,
        handles: &[ReloadedClass],
    ) -> Result<Vec<Invalidation>> {
        handles
            .iter()
            .map(|handle| self.clear_dispatch_cache(handle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reload::introspect::SlotRef;
    use crate::runtime::Class;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_ID: AtomicUsize = AtomicUsize::new(0);

    fn unique_name(prefix: &str) -> String {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}_{id}")
    }

    /// Provider that finds a slot but is denied access when clearing it,
    /// standing in for a runtime that rejects external field access.
    struct DeniedIntrospection;

    impl SlotIntrospection for DeniedIntrospection {
        fn find_call_site_slot(&self, class: &Class) -> crate::error::Result<Option<SlotRef>> {
            Ok(Some(SlotRef::new(class.clone())))
        }

        fn clear_slot(&self, slot: &SlotRef) -> crate::error::Result<()> {
            Err(Error::SlotAccessDenied {
                class: slot.class().name().to_string(),
                slot: slot.name().to_string(),
            })
        }
    }

    #[test]
    fn test_cleared_on_dynamic_class() {
        let class = Class::new_dynamic(&unique_name("InvDyn"), None).unwrap();
        let invalidator = DispatchCacheInvalidator::new();

        let outcome = invalidator
            .clear_dispatch_cache(&ReloadedClass::from_class(class))
            .unwrap();
        assert_eq!(outcome, Invalidation::Cleared);
    }

    #[test]
    fn test_not_applicable_on_host_class() {
        let class = Class::new_host(&unique_name("InvHost"), None).unwrap();
        let invalidator = DispatchCacheInvalidator::new();

        let outcome = invalidator
            .clear_dispatch_cache(&ReloadedClass::from_class(class))
            .unwrap();
        assert_eq!(outcome, Invalidation::NotApplicable);
    }

    #[test]
    fn test_idempotent_outcomes() {
        let dynamic = Class::new_dynamic(&unique_name("InvTwiceDyn"), None).unwrap();
        let host = Class::new_host(&unique_name("InvTwiceHost"), None).unwrap();
        let invalidator = DispatchCacheInvalidator::new();

        let dyn_handle = ReloadedClass::from_class(dynamic);
        let host_handle = ReloadedClass::from_class(host);

        for _ in 0..2 {
            assert_eq!(
                invalidator.clear_dispatch_cache(&dyn_handle).unwrap(),
                Invalidation::Cleared
            );
            assert_eq!(
                invalidator.clear_dispatch_cache(&host_handle).unwrap(),
                Invalidation::NotApplicable
            );
        }
    }

    #[test]
    fn test_provider_failure_propagates() {
        let class = Class::new_dynamic(&unique_name("InvDenied"), None).unwrap();
        let invalidator =
            DispatchCacheInvalidator::with_introspection(DeniedIntrospection);

        let result =
            invalidator.clear_dispatch_cache(&ReloadedClass::from_class(class));
        assert!(matches!(result, Err(Error::SlotAccessDenied { .. })));
    }

    #[test]
    fn test_batch_mixed_outcomes() {
        let dynamic = Class::new_dynamic(&unique_name("InvBatchDyn"), None).unwrap();
        let host = Class::new_host(&unique_name("InvBatchHost"), None).unwrap();
        let invalidator = DispatchCacheInvalidator::new();

        let outcomes = invalidator
            .clear_dispatch_caches(&[
                ReloadedClass::from_class(dynamic),
                ReloadedClass::from_class(host),
            ])
            .unwrap();
        assert_eq!(
            outcomes,
            vec![Invalidation::Cleared, Invalidation::NotApplicable]
        );
    }
}
