// Invalidation fast-path benchmarks.
//
// Measures:
// - Clearing a populated slot vs an already-empty slot
// - The not-applicable path on a host class
// - Cached vs uncached call resolution, for context

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use recast::reload::{DispatchCacheInvalidator, ReloadedClass};
use recast::runtime::{Class, Method, Selector, resolve};
use std::str::FromStr;

fn noop_body(_args: &[i64]) -> i64 {
    0
}

fn dynamic_class_with_sites(name: &str, sites: usize) -> Class {
    let class = Class::new_dynamic(name, None).unwrap();
    for i in 0..sites {
        let selector = Selector::from_str(&format!("method{i}")).unwrap();
        class
            .add_method(Method {
                selector: selector.clone(),
                imp: noop_body,
            })
            .unwrap();
        resolve(&class, &selector).unwrap();
    }
    class
}

fn bench_clear_populated(c: &mut Criterion) {
    let class = dynamic_class_with_sites("BenchPopulated", 32);
    let handle = ReloadedClass::from_class(class.clone());
    let invalidator = DispatchCacheInvalidator::new();
    let selectors: Vec<Selector> = (0..32)
        .map(|i| Selector::from_str(&format!("method{i}")).unwrap())
        .collect();

    c.bench_function("clear_populated_slot", |b| {
        b.iter(|| {
            // Repopulate so every iteration clears a full slot.
            for selector in &selectors {
                resolve(&class, selector).unwrap();
            }
            black_box(invalidator.clear_dispatch_cache(&handle).unwrap())
        });
    });
}

fn bench_clear_empty(c: &mut Criterion) {
    let class = dynamic_class_with_sites("BenchEmpty", 0);
    let handle = ReloadedClass::from_class(class);
    let invalidator = DispatchCacheInvalidator::new();

    c.bench_function("clear_empty_slot", |b| {
        b.iter(|| black_box(invalidator.clear_dispatch_cache(&handle).unwrap()));
    });
}

fn bench_not_applicable(c: &mut Criterion) {
    let class = Class::new_host("BenchHost", None).unwrap();
    let handle = ReloadedClass::from_class(class);
    let invalidator = DispatchCacheInvalidator::new();

    c.bench_function("clear_host_class", |b| {
        b.iter(|| black_box(invalidator.clear_dispatch_cache(&handle).unwrap()));
    });
}

fn bench_resolution(c: &mut Criterion) {
    let class = dynamic_class_with_sites("BenchResolve", 1);
    let selector = Selector::from_str("method0").unwrap();

    c.bench_function("resolve_cached", |b| {
        b.iter(|| black_box(resolve(&class, &selector).unwrap()));
    });

    let cache = class.call_site_cache().unwrap();
    c.bench_function("resolve_uncached", |b| {
        b.iter(|| {
            cache.clear().unwrap();
            black_box(resolve(&class, &selector).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_clear_populated,
    bench_clear_empty,
    bench_not_applicable,
    bench_resolution
);
criterion_main!(benches);
