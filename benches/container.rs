#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use froodi_mock::{Config, Container, Inject, Mock, MockRegistry, MockResolutionExt as _, MockingContainer, Registry};
use std::sync::Arc;

struct A(Arc<B>, Arc<C>);
struct B(i32);
struct C(Arc<CA>);
struct CA(Arc<CAA>);
struct CAA;

trait Clock: Send + Sync {}

type ClockService = Arc<dyn Clock>;

#[derive(Default)]
struct MockClock;

impl Clock for MockClock {}

impl Mock for MockClock {
    fn verify_all(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

#[inline]
fn registry(config: Config) -> Registry {
    Registry::new()
        .provide_with_config(|| Ok(CAA), config)
        .provide_with_config(|Inject(caa): Inject<CAA>| Ok(CA(caa)), config)
        .provide_with_config(|Inject(ca): Inject<CA>| Ok(C(ca)), config)
        .provide_with_config(|| Ok(B(2)), config)
        .provide_with_config(|Inject(b): Inject<B>, Inject(c): Inject<C>| Ok(A(b, c)), config)
}

#[inline]
fn mocks() -> MockRegistry {
    MockRegistry::new().mock::<ClockService, MockClock>(|mock| mock as ClockService)
}

#[inline]
fn container_close(container: &Container) {
    let _ = container.get::<A>().unwrap();

    container.close();
}

fn criterion_benchmark(c: &mut Criterion) {
    let cached = Container::new(registry(Config::default()));
    let unscoped = Container::new(registry(Config::unscoped()));
    let finalized = Container::new(
        registry(Config::default())
            .add_finalizer(|_: Arc<CAA>| {})
            .add_finalizer(|_: Arc<CA>| {})
            .add_finalizer(|_: Arc<C>| {})
            .add_finalizer(|_: Arc<B>| {})
            .add_finalizer(|_: Arc<A>| {}),
    );
    let mocking = MockingContainer::new(registry(Config::default()), mocks());

    c.bench_function("container_new", |b| b.iter(|| Container::new(registry(Config::default()))))
        .bench_function("container_get_with_cache", |b| b.iter(|| cached.get::<A>().unwrap()))
        .bench_function("container_get_unscoped", |b| b.iter(|| unscoped.get::<A>().unwrap()))
        .bench_function("container_close", |b| b.iter(|| container_close(&finalized)))
        .bench_function("container_close_without_finalizers", |b| b.iter(|| container_close(&cached)))
        .bench_function("mocking_container_get_bound", |b| b.iter(|| mocking.get::<A>().unwrap()))
        .bench_function("mocking_container_get_mock", |b| {
            b.iter(|| {
                let _ = mocking.get_mock::<ClockService>().unwrap();
                mocking.reset();
            })
        });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
