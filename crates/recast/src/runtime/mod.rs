//! recast runtime metadata model.
//!
//! This module provides the runtime-side substrate the reload layer
//! operates on:
//!
//! - [`selector`]: validated message selectors with precomputed hashes
//! - [`class`]: class metadata, method tables, and the call-site cache slot
//! - [`registry`]: process-wide class registration and lookup by name
//! - [`dispatch`]: call resolution and call-site memoization
//!
//! The model is deliberately small. It exists so the reload layer has real
//! metadata to introspect and tests need no embedded interpreter, not to be
//! a complete object runtime.

pub mod class;
pub mod dispatch;
pub mod registry;
pub mod selector;

pub use class::{Class, Imp, Method};
pub use dispatch::{CallSite, CallSiteCache, resolve};
pub use registry::{all_classes, class_from_name};
pub use selector::Selector;
