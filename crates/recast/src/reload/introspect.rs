//! The runtime-introspection capability.
//!
//! Reaching a runtime-internal cache slot from outside the runtime is the
//! risky part of reload support, so it is kept behind a narrow trait:
//! find the named slot if the class has one, and overwrite its contents
//! with the empty value. The invalidator's outcome logic (absent is fine,
//! write failure is fatal) then tests independently of how slots are
//! actually reached.
//!
//! [`MetadataIntrospection`] is the in-tree provider over [`Class`]
//! metadata. An embedding with a different metadata surface supplies its
//! own `SlotIntrospection` and reuses the invalidator unchanged.

use crate::error::{Error, Result};
use crate::runtime::Class;
use std::fmt;

/// Well-known name of the dispatch-cache slot on dynamic-compiled classes.
pub const CALL_SITE_SLOT: &str = "$callSiteArray";

/// Opaque reference to one class's dispatch-cache slot.
///
/// Valid for the duration of one invalidation call. Holding a `SlotRef`
/// confers no ownership: the slot stays owned by the class metadata.
pub struct SlotRef {
    class: Class,
    name: &'static str,
}

impl SlotRef {
    pub(crate) fn new(class: Class) -> SlotRef {
        SlotRef {
            class,
            name: CALL_SITE_SLOT,
        }
    }

    /// The class owning the slot.
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The slot name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRef")
            .field("class", &self.class.name())
            .field("name", &self.name)
            .finish()
    }
}

/// Capability for locating and clearing a class's dispatch-cache slot.
pub trait SlotIntrospection {
    /// Locates the dispatch-cache slot of a class.
    ///
    /// Returns `Ok(None)` when the class has no such slot; that is a
    /// normal condition, not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotAccessDenied`] if the slot exists but cannot
    /// be reached, or [`Error::InconsistentMetadata`] if the class
    /// metadata cannot be read coherently.
    fn find_call_site_slot(&self, class: &Class) -> Result<Option<SlotRef>>;

    /// Overwrites the slot contents with the empty value.
    ///
    /// Must be a full reset with metadata-publication visibility: any
    /// dispatch starting after this returns observes the cleared slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotWriteFailed`] or
    /// [`Error::InconsistentMetadata`] if the overwrite cannot be
    /// performed. Such a failure means stale dispatch targets may persist
    /// and must not be swallowed.
    fn clear_slot(&self, slot: &SlotRef) -> Result<()>;
}

/// Slot introspection over [`Class`] metadata.
///
/// The only sanctioned external writer of the slot. It never creates or
/// removes slots; a class without one stays without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataIntrospection;

impl SlotIntrospection for MetadataIntrospection {
    fn find_call_site_slot(&self, class: &Class) -> Result<Option<SlotRef>> {
        Ok(class
            .call_site_cache()
            .map(|_| SlotRef::new(class.clone())))
    }

    fn clear_slot(&self, slot: &SlotRef) -> Result<()> {
        // A SlotRef is only handed out for classes that had the slot, so a
        // missing cache here means the metadata changed under us.
        let cache = slot.class().call_site_cache().ok_or_else(|| {
            Error::InconsistentMetadata {
                class: slot.class().name().to_string(),
            }
        })?;
        cache.clear()
    }
}
