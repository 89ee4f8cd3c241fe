use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use unit_duration::{
    DurationGuard, DurationGuardConfig, ExtensionChain, TestContext, TestDescriptor, UnitTest,
};

fn body() -> u64 {
    black_box(42)
}

fn bench_baseline(c: &mut Criterion) {
    c.bench_function("baseline_no_extensions", |b| {
        b.iter(|| black_box(body()));
    });
}

fn bench_empty_chain(c: &mut Criterion) {
    let chain = ExtensionChain::new();

    c.bench_function("chain_empty", |b| {
        b.iter(|| {
            let ctx = TestContext::new(TestDescriptor::new("bench"));
            black_box(chain.execute(&ctx, body))
        });
    });
}

fn bench_guard_check(c: &mut Criterion) {
    let guard = DurationGuard::default();

    c.bench_function("guard_check_acceptable", |b| {
        b.iter(|| black_box(guard.check("bench", black_box(Duration::from_millis(3)))));
    });
}

fn bench_guarded_chain(c: &mut Criterion) {
    let guard = DurationGuardConfig::builder()
        .on_event(|_| {})
        .build()
        .unwrap()
        .guard();
    let chain = ExtensionChain::new().with(guard);

    c.bench_function("chain_with_guard", |b| {
        b.iter(|| {
            let ctx = TestContext::new(TestDescriptor::new("bench"));
            black_box(chain.execute(&ctx, body))
        });
    });
}

fn bench_unit_test(c: &mut Criterion) {
    let unit = UnitTest::builder().build();

    c.bench_function("unit_test_run", |b| {
        b.iter(|| black_box(unit.run("bench", body)));
    });

    c.bench_function("unit_test_run_ignoring_rules", |b| {
        b.iter(|| black_box(unit.run_ignoring_rules("bench", body)));
    });
}

fn bench_unit_test_async(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let unit = UnitTest::builder().build();

    c.bench_function("unit_test_run_async", |b| {
        b.to_async(&runtime).iter(|| async {
            let result = unit.run_async("bench", async { body() }).await;
            black_box(result)
        });
    });
}

criterion_group!(
    benches,
    bench_baseline,
    bench_empty_chain,
    bench_guard_check,
    bench_guarded_chain,
    bench_unit_test,
    bench_unit_test_async
);
criterion_main!(benches);
