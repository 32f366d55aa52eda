//! Global class registry.
//!
//! Ensures unique class names and provides lookup by name. The registry is
//! what makes a reload handle resolvable: a hot-swap coordinator knows the
//! name of the class it just replaced and asks the registry for the current
//! definition.
//!
//! # Thread Safety
//!
//! The registry is a process-wide map behind an `RwLock`, initialized on
//! first use. Registration happens on whatever thread creates the class;
//! lookups may happen concurrently from any thread.

use crate::error::{Error, Result};
use crate::runtime::Class;
use fxhash::FxHashMap;
use std::sync::{OnceLock, RwLock};

static REGISTRY: OnceLock<RwLock<FxHashMap<String, Class>>> = OnceLock::new();

fn registry() -> &'static RwLock<FxHashMap<String, Class>> {
    REGISTRY.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// Registers a class under its name.
///
/// Called automatically by [`Class::new_dynamic`] and [`Class::new_host`].
///
/// # Errors
///
/// Returns [`Error::ClassAlreadyExists`] if the name is taken, or
/// [`Error::InconsistentMetadata`] if the registry lock is poisoned.
pub(crate) fn register_class(class: &Class) -> Result<()> {
    let mut classes =
        registry()
            .write()
            .map_err(|_| Error::InconsistentMetadata {
                class: class.name().to_string(),
            })?;
    if classes.contains_key(class.name()) {
        return Err(Error::ClassAlreadyExists {
            name: class.name().to_string(),
        });
    }
    classes.insert(class.name().to_string(), class.clone());
    Ok(())
}

/// Looks up a class by name.
///
/// Returns None if no class with that name has been registered.
#[must_use]
pub fn class_from_name(name: &str) -> Option<Class> {
    registry()
        .read()
        .ok()
        .and_then(|classes| classes.get(name).cloned())
}

/// Enumerates all registered classes.
#[must_use]
pub fn all_classes() -> Vec<Class> {
    registry()
        .read()
        .map(|classes| classes.values().cloned().collect())
        .unwrap_or_default()
}
