//! Message selectors for the recast runtime.
//!
//! A selector names one message a class can respond to. Selectors are the
//! keys under which resolved call targets are memoized in a class's
//! call-site cache, so their hash is computed exactly once at construction
//! (with `FxHash`, fast for the short strings selectors tend to be) and
//! reused for every table lookup afterwards.
//!
//! # Example
//!
//! ```rust
//! use recast::runtime::Selector;
//! use std::str::FromStr;
//!
//! let sel = Selector::from_str("render").unwrap();
//! assert_eq!(sel.name(), "render");
//! ```

use crate::error::{Error, Result};
use fxhash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

/// A validated message selector with a precomputed hash.
///
/// Cloning is cheap: the name is reference-counted and the hash is copied.
///
/// # Thread Safety
///
/// Selectors are immutable after creation and safe to share between threads.
#[derive(Clone)]
pub struct Selector {
    /// Selector name, shared between clones.
    name: Arc<str>,
    /// `FxHash` of the name, computed at construction.
    hash: u64,
}

impl Selector {
    /// Returns the selector name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the precomputed hash used as the method-table and
    /// call-site-cache key.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl FromStr for Selector {
    type Err = Error;

    /// Parses and validates a selector name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if the name is empty, contains
    /// whitespace, or contains an interior NUL byte.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty()
            || s.chars().any(char::is_whitespace)
            || s.contains('\0')
        {
            return Err(Error::InvalidSelector {
                name: s.to_string(),
            });
        }

        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);

        Ok(Selector {
            name: Arc::from(s),
            hash: hasher.finish(),
        })
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.name == other.name
    }
}

impl Eq for Selector {}

impl Hash for Selector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("name", &self.name)
            .field("hash", &format_args!("{:#x}", self.hash))
            .finish()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
