//! Error types for the recast runtime.
//!
//! One crate-wide error enum covers both halves of the crate: metadata
//! construction errors from the runtime model, and the reload-time failures
//! the invalidation contract distinguishes (a slot that cannot be read, a
//! slot that cannot be written, and metadata observed in a torn state).

use std::fmt;

/// Errors that can occur in the recast runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Selector name is empty or contains whitespace or NUL.
    InvalidSelector {
        /// The rejected name.
        name: String,
    },

    /// Class name already exists in the registry.
    ClassAlreadyExists {
        /// The duplicate name.
        name: String,
    },

    /// No method with the given selector is defined directly on the class.
    MethodNotFound {
        /// The class searched.
        class: String,
        /// The selector looked up.
        selector: String,
    },

    /// No method with the given selector anywhere in the inheritance chain.
    SelectorNotFound {
        /// The receiver class.
        class: String,
        /// The selector looked up.
        selector: String,
    },

    /// No class with the given name is resolvable in the registry.
    ClassNotFound {
        /// The unresolved name.
        name: String,
    },

    /// The dispatch-cache slot exists but the introspection provider was
    /// denied access to it.
    SlotAccessDenied {
        /// The owning class.
        class: String,
        /// The slot name.
        slot: String,
    },

    /// The dispatch-cache slot exists but could not be overwritten.
    SlotWriteFailed {
        /// The owning class.
        class: String,
        /// The slot name.
        slot: String,
    },

    /// Class metadata was observed in an inconsistent state, e.g. a poisoned
    /// lock left behind by a thread that panicked mid-update.
    InconsistentMetadata {
        /// The class whose metadata is suspect.
        class: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSelector { name } => {
                write!(f, "Invalid selector name: {name:?}")
            }
            Error::ClassAlreadyExists { name } => {
                write!(f, "Class {name:?} already exists in registry")
            }
            Error::MethodNotFound { class, selector } => {
                write!(f, "No method {selector:?} defined on class {class:?}")
            }
            Error::SelectorNotFound { class, selector } => {
                write!(
                    f,
                    "Selector {selector:?} not found on class {class:?} or its ancestors"
                )
            }
            Error::ClassNotFound { name } => {
                write!(f, "Class {name:?} not resolvable in registry")
            }
            Error::SlotAccessDenied { class, slot } => {
                write!(f, "Access to slot {slot:?} on class {class:?} denied")
            }
            Error::SlotWriteFailed { class, slot } => {
                write!(f, "Failed to overwrite slot {slot:?} on class {class:?}")
            }
            Error::InconsistentMetadata { class } => {
                write!(f, "Metadata of class {class:?} is in an inconsistent state")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for recast runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
