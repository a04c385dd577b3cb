//! Basic benchmarks for the `block_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use block_pool::BlockPool;
use criterion::{Criterion, criterion_group, criterion_main};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

const BLOCK_SIZE: usize = 32;
const CAPACITY_BYTES: usize = 4096;

fn new_pool() -> BlockPool {
    BlockPool::new(BLOCK_SIZE, CAPACITY_BYTES).unwrap()
}

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("bp_basic");

    let allocs_op = allocs.operation("build_one_page");
    group.bench_function("build_one_page", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(new_pool()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("acquire_first");
    group.bench_function("acquire_first", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(new_pool)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.acquire(black_box(BLOCK_SIZE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("acquire_release");
    group.bench_function("acquire_release", |b| {
        b.iter_custom(|iters| {
            let mut pool = new_pool();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let block = pool.acquire(black_box(BLOCK_SIZE)).unwrap();
                pool.release(black_box(block));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("drain_and_refill");
    group.bench_function("drain_and_refill", |b| {
        b.iter_custom(|iters| {
            let mut pool = new_pool();
            let mut blocks = Vec::with_capacity(pool.block_count());

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                while let Ok(block) = pool.acquire(black_box(BLOCK_SIZE)) {
                    blocks.push(block);
                }

                for block in blocks.drain(..) {
                    pool.release(block);
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("acquire_exhausted");
    group.bench_function("acquire_exhausted", |b| {
        b.iter_custom(|iters| {
            let mut pool = BlockPool::new(BLOCK_SIZE, BLOCK_SIZE).unwrap();
            let held = pool.acquire(BLOCK_SIZE).unwrap();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.acquire(black_box(BLOCK_SIZE)));
            }

            let elapsed = start.elapsed();

            pool.release(held);

            elapsed
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
