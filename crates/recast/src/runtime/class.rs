//! Class metadata for the recast runtime.
//!
//! This module implements the class model the reload layer operates on:
//! - Class registration and naming
//! - Single inheritance
//! - Method registration, replacement, and lookup
//! - The per-class call-site cache slot
//!
//! # Architecture
//!
//! A [`Class`] is a cheap handle (`Arc`) over shared, immutable-shaped
//! metadata. The method table is mutable behind an `RwLock` because a
//! hot-swap coordinator replaces method bodies in place while the process
//! runs. The call-site cache slot is created at class-construction time, or
//! never: classes produced by the dynamic-language compiler carry one, plain
//! host classes do not, and nothing adds or removes the slot later. This
//! mirrors how optimized-dispatch metadata behaves on a managed runtime,
//! where the slot is baked into the compiled form of the class.
//!
//! # Thread Safety
//!
//! Classes are freely shareable between threads. The method table and the
//! call-site cache each carry their own `RwLock`; no lock is held across
//! the two.

use crate::error::{Error, Result};
use crate::runtime::Selector;
use crate::runtime::dispatch::CallSiteCache;
use crate::runtime::registry;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Method implementation stand-in.
///
/// The reload core never calls through an `Imp`; it only needs method
/// identity to be observable so that stale-versus-fresh cache contents can
/// be distinguished. A plain function pointer is enough for that.
pub type Imp = fn(&[i64]) -> i64;

/// A method: selector plus implementation.
///
/// Methods are immutable after creation and safe to share between threads.
#[derive(Clone)]
pub struct Method {
    /// The selector this method answers to.
    pub selector: Selector,
    /// The implementation entry point.
    pub imp: Imp,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("selector", &self.selector)
            .field("imp", &(self.imp as usize as *const ()))
            .finish()
    }
}

/// Internal class data, shared by all handles to the same class.
pub(crate) struct ClassInner {
    /// Class name, unique within the registry.
    name: String,
    /// Superclass handle (None for a root class).
    super_class: Option<Class>,
    /// Method table: selector hash -> Method.
    /// Protected by `RwLock` for in-place replacement during hot swap.
    methods: RwLock<FxHashMap<u64, Method>>,
    /// The dispatch-cache slot. Present only on dynamic-compiled classes;
    /// fixed at construction, contents mutable through [`CallSiteCache`].
    call_sites: Option<CallSiteCache>,
}

/// A handle to a registered class.
///
/// Cloning is cheap and every clone refers to the same underlying metadata.
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// Creates and registers a dynamic-compiled class.
    ///
    /// Dynamic classes carry a call-site cache slot that the runtime's
    /// dispatch machinery memoizes resolved targets into.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique class name
    /// * `super_class` - Optional superclass (None for a root class)
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the name is taken.
    pub fn new_dynamic(name: &str, super_class: Option<&Class>) -> Result<Class> {
        Self::create(name, super_class, true)
    }

    /// Creates and registers an ordinary host class.
    ///
    /// Host classes have no call-site cache slot. They exist in the same
    /// registry as dynamic classes because a reload batch routinely mixes
    /// the two, and the reload layer must tolerate either kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the name is taken.
    pub fn new_host(name: &str, super_class: Option<&Class>) -> Result<Class> {
        Self::create(name, super_class, false)
    }

    fn create(name: &str, super_class: Option<&Class>, dynamic: bool) -> Result<Class> {
        let class = Class {
            inner: Arc::new(ClassInner {
                name: name.to_string(),
                super_class: super_class.cloned(),
                methods: RwLock::new(FxHashMap::default()),
                call_sites: dynamic.then(|| CallSiteCache::new(name)),
            }),
        };
        registry::register_class(&class)?;
        Ok(class)
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the superclass, if any.
    #[must_use]
    pub fn super_class(&self) -> Option<&Class> {
        self.inner.super_class.as_ref()
    }

    /// Whether this class carries a call-site cache slot.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.inner.call_sites.is_some()
    }

    /// Returns the call-site cache slot, or None on a host class.
    ///
    /// The slot itself is owned by the class metadata; callers may read or
    /// overwrite its contents but can never detach or replace the slot.
    #[must_use]
    pub fn call_site_cache(&self) -> Option<&CallSiteCache> {
        self.inner.call_sites.as_ref()
    }

    /// Adds a method to this class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InconsistentMetadata`] if the method table lock is
    /// poisoned.
    pub fn add_method(&self, method: Method) -> Result<()> {
        let mut methods = self.write_methods()?;
        methods.insert(method.selector.hash(), method);
        Ok(())
    }

    /// Replaces a method's implementation in place, returning the previous
    /// one.
    ///
    /// This is the metadata mutation a hot-swap coordinator performs. It
    /// deliberately leaves the call-site cache untouched: invalidating
    /// cached dispatch targets is the reload layer's contract, and keeping
    /// the two steps separate is what makes the stale window observable
    /// (and closable) at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodNotFound`] if no method with the selector is
    /// defined directly on this class, or [`Error::InconsistentMetadata`]
    /// if the method table lock is poisoned.
    pub fn replace_method(&self, selector: &Selector, imp: Imp) -> Result<Imp> {
        let mut methods = self.write_methods()?;
        match methods.get_mut(&selector.hash()) {
            Some(method) => {
                let previous = method.imp;
                method.imp = imp;
                Ok(previous)
            }
            None => Err(Error::MethodNotFound {
                class: self.name().to_string(),
                selector: selector.name().to_string(),
            }),
        }
    }

    /// Looks up a method by selector, walking the inheritance chain.
    ///
    /// Returns the defining class together with the method so dispatch can
    /// record where the resolution landed.
    #[must_use]
    pub fn lookup_method(&self, selector: &Selector) -> Option<(Class, Method)> {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            let found = class
                .inner
                .methods
                .read()
                .ok()
                .and_then(|methods| methods.get(&selector.hash()).cloned());
            if let Some(method) = found {
                return Some((class, method));
            }
            current = class.inner.super_class.clone();
        }
        None
    }

    /// Number of methods defined directly on this class.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.inner
            .methods
            .read()
            .map(|methods| methods.len())
            .unwrap_or(0)
    }

    fn write_methods(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, FxHashMap<u64, Method>>> {
        self.inner.methods.write().map_err(|_| Error::InconsistentMetadata {
            class: self.name().to_string(),
        })
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.inner.name)
            .field(
                "super_class",
                &self.inner.super_class.as_ref().map(Class::name),
            )
            .field("dynamic", &self.inner.call_sites.is_some())
            .finish()
    }
}

/// Pointer-identity equality: two handles are equal when they refer to the
/// same registered class.
impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Class {}
