//! Benchmarks for the arena allocator.
//!
//! Compares the bump, free-list and heap-fallback paths, and a Lua-style
//! realloc churn against the system allocator.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use reflua::arena::{ArenaAllocator, ArenaConfig, DEFAULT_POOL_SIZE, MIN_BLOCK_SIZE};
use std::alloc::{Layout, alloc, dealloc};
use std::hint::black_box;
use std::ptr;

fn allocation_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena/paths");
    group.throughput(Throughput::Elements(1));

    group.bench_function("bump", |b| {
        let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(1024 * 1024));
        b.iter(|| {
            if arena.remaining() < MIN_BLOCK_SIZE {
                // SAFETY: bump blocks are never used after allocation.
                unsafe { arena.reset() };
            }
            black_box(arena.allocate(black_box(MIN_BLOCK_SIZE)))
        });
    });

    group.bench_function("free_list", |b| {
        let mut arena = ArenaAllocator::new(ArenaConfig::default());
        b.iter(|| {
            let block = arena.allocate(black_box(24));
            // SAFETY: block was just allocated with this size.
            unsafe { arena.deallocate(block, 24) };
        });
    });

    group.bench_function("heap_fallback", |b| {
        let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(0));
        b.iter(|| {
            let block = arena.allocate(black_box(256));
            // SAFETY: block was just allocated with this size.
            unsafe { arena.deallocate(block, 256) };
        });
    });

    group.bench_function("system", |b| {
        let layout = Layout::from_size_align(24, 8).unwrap();
        b.iter(|| unsafe {
            let block = alloc(black_box(layout));
            dealloc(block, layout);
        });
    });

    group.finish();
}

fn realloc_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena/realloc");

    for &count in &[16usize, 128] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(DEFAULT_POOL_SIZE));
                let mut blocks = Vec::with_capacity(count);
                // SAFETY: each block is resized and freed with the size it
                // was last allocated with.
                unsafe {
                    for i in 0..count {
                        let size = 16 + (i % 4) * 16;
                        blocks.push((arena.realloc(ptr::null_mut(), 0, size), size));
                    }
                    for (block, size) in blocks.iter_mut() {
                        *block = arena.realloc(*block, *size, *size * 2);
                        *size *= 2;
                    }
                    for (block, size) in blocks.drain(..) {
                        arena.realloc(block, size, 0);
                    }
                }
                black_box(arena.stats())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, allocation_paths, realloc_churn);
criterion_main!(benches);
