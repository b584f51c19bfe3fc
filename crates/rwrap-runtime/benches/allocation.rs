//! Allocation and collection benchmarks for the host runtime

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rwrap_runtime::{NativeTag, Runtime, RuntimeConfig};

fn bench_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate");

    for size in [0usize, 16, 1024] {
        group.bench_with_input(BenchmarkId::new("real", size), &size, |b, &size| {
            let rt = Runtime::new();
            b.iter(|| rt.allocate(NativeTag::Real, black_box(size)).unwrap());
        });
    }

    group.bench_function("make_string", |b| {
        let rt = Runtime::new();
        b.iter(|| rt.make_string(black_box("hello")).unwrap());
    });

    group.finish();
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    group.bench_function("rooted_list_256", |b| {
        let rt = Runtime::with_config(RuntimeConfig::default().with_gc_threshold(0));
        let list = rt.allocate(NativeTag::List, 256).unwrap();
        rt.preserve(list);
        for i in 0..256 {
            let element = rt.allocate(NativeTag::Integer, 4).unwrap();
            rt.set_vector_elt(list, i, element).unwrap();
        }

        b.iter(|| black_box(rt.collect()));
    });

    group.bench_function("protect_unprotect", |b| {
        let rt = Runtime::new();
        b.iter(|| {
            let guard = rt.protect(black_box(rwrap_runtime::Handle::NIL));
            guard.into_inner()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_allocate, bench_collect);
criterion_main!(benches);
