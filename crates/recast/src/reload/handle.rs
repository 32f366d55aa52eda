//! Reload handles.
//!
//! A [`ReloadedClass`] is the opaque token a hot-swap coordinator passes to
//! the invalidator. It refers to the class definition *after* replacement
//! and lives for the duration of one invalidation call; the invalidator
//! holds nothing beyond the call.

use crate::error::{Error, Result};
use crate::runtime::{Class, registry};
use std::fmt;

/// Handle to a class whose definition was just replaced in place.
#[derive(Clone)]
pub struct ReloadedClass {
    class: Class,
}

impl ReloadedClass {
    /// Resolves a handle from a class name via the registry.
    ///
    /// This is the path a coordinator takes when all it knows is the name
    /// of the source unit it just recompiled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassNotFound`] if no class with the name is
    /// registered.
    pub fn resolve(name: &str) -> Result<ReloadedClass> {
        registry::class_from_name(name)
            .map(|class| ReloadedClass { class })
            .ok_or_else(|| Error::ClassNotFound {
                name: name.to_string(),
            })
    }

    /// Wraps a class the coordinator already holds.
    #[must_use]
    pub fn from_class(class: Class) -> ReloadedClass {
        ReloadedClass { class }
    }

    /// The post-swap class definition.
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The class name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.class.name()
    }
}

impl fmt::Debug for ReloadedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReloadedClass").field(&self.name()).finish()
    }
}
