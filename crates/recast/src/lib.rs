//! recast: hot-reload support for a dynamic object runtime.
//!
//! When a class's compiled definition is replaced in a running process, the
//! call targets the runtime memoized for that class go stale. recast
//! provides the piece that keeps that from biting:
//!
//! - **Runtime metadata model**: classes, selectors, method tables, and the
//!   per-class call-site cache the dispatch machinery memoizes into
//! - **Reload layer**: opaque handles to swapped classes, a narrow
//!   introspection capability for reaching the cache slot, and the
//!   invalidator that resets it
//!
//! The invalidation contract is small and strict: a found slot is fully
//! reset, a missing slot is a benign outcome, and any other failure is
//! escalated to the caller rather than swallowed.
//!
//! # Example
//!
//! ```rust
//! use recast::reload::{DispatchCacheInvalidator, Invalidation, ReloadedClass};
//! use recast::runtime::{Class, Method, Selector, resolve};
//! use std::str::FromStr;
//!
//! fn old_body(_args: &[i64]) -> i64 { 1 }
//! fn new_body(_args: &[i64]) -> i64 { 2 }
//!
//! let class = Class::new_dynamic("Greeter", None).unwrap();
//! let sel = Selector::from_str("greet").unwrap();
//! class.add_method(Method { selector: sel.clone(), imp: old_body }).unwrap();
//!
//! // Dispatch memoizes the resolved target.
//! let site = resolve(&class, &sel).unwrap();
//! assert_eq!((site.imp)(&[]), 1);
//!
//! // A hot swap replaces the body, then the coordinator invalidates.
//! class.replace_method(&sel, new_body).unwrap();
//! let invalidator = DispatchCacheInvalidator::new();
//! let outcome = invalidator
//!     .clear_dispatch_cache(&ReloadedClass::from_class(class.clone()))
//!     .unwrap();
//! assert_eq!(outcome, Invalidation::Cleared);
//!
//! // Fresh dispatch resolves the new body.
//! let site = resolve(&class, &sel).unwrap();
//! assert_eq!((site.imp)(&[]), 2);
//! ```

pub mod error;
pub mod reload;
pub mod runtime;

// Re-export commonly used types
pub use error::{Error, Result};
pub use reload::{DispatchCacheInvalidator, Invalidation, ReloadedClass};
pub use runtime::{Class, Method, Selector};
