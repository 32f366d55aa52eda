// Shared helpers for the reload integration tests.

use recast::runtime::{Class, Method, Selector};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

static TEST_ID: AtomicUsize = AtomicUsize::new(0);

/// Returns a class name no other test in the process uses.
pub fn unique_name(prefix: &str) -> String {
    let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

pub fn old_body(_args: &[i64]) -> i64 {
    1
}

pub fn new_body(_args: &[i64]) -> i64 {
    2
}

/// Creates a dynamic class answering each of the given selectors with
/// `old_body`.
pub fn dynamic_class_with_methods(prefix: &str, selectors: &[&str]) -> Class {
    let class = Class::new_dynamic(&unique_name(prefix), None).unwrap();
    for name in selectors {
        let selector = Selector::from_str(name).unwrap();
        class
            .add_method(Method {
                selector,
                imp: old_body,
            })
            .unwrap();
    }
    class
}
