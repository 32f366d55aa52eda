//! Reload support: what must happen to a class's dispatch cache after its
//! definition is hot-swapped.
//!
//! The modules here form the boundary a hot-swap coordinator programs
//! against:
//!
//! - [`handle`]: opaque references to freshly swapped classes
//! - [`introspect`]: the capability for reaching the runtime-internal slot
//! - [`invalidator`]: the cache-clearing operation itself
//!
//! Compilation, source tracking, and the swap trigger all live outside this
//! crate; the coordinator performs the swap and then drives the invalidator
//! once per affected class before declaring the reload complete.

pub mod handle;
pub mod introspect;
pub mod invalidator;

pub use handle::ReloadedClass;
pub use introspect::{
    CALL_SITE_SLOT, MetadataIntrospection, SlotIntrospection, SlotRef,
};
pub use invalidator::{DispatchCacheInvalidator, Invalidation};
