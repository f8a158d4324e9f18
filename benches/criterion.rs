use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use monocow::CowVec;

fn push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_16");
    group.bench_function("cowvec", |b| {
        b.iter(|| {
            let mut v = CowVec::new();
            for i in 0..16 {
                v.push(black_box(i));
            }
            v
        });
    });
    group.bench_function("vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for i in 0..16 {
                v.push(black_box(i));
            }
            v
        });
    });
    group.finish();
}

fn single(c: &mut Criterion) {
    let mut group = c.benchmark_group("single");
    group.bench_function("cowvec", |b| {
        b.iter(|| {
            let mut v = CowVec::new();
            v.push(black_box(1u64));
            v
        });
    });
    group.bench_function("vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            v.push(black_box(1u64));
            v
        });
    });
    group.finish();
}

fn clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone_64");
    group.bench_function("cowvec", |b| {
        let v: CowVec<u64> = (0..64).collect();
        b.iter(|| v.clone());
    });
    group.bench_function("vec", |b| {
        let v: Vec<u64> = (0..64).collect();
        b.iter(|| v.clone());
    });
    group.finish();
}

fn detach(c: &mut Criterion) {
    let mut group = c.benchmark_group("detach_64");
    group.bench_function("cowvec", |b| {
        let v: CowVec<u64> = (0..64).collect();
        b.iter_batched(
            || v.clone(),
            |mut copy| {
                copy[0] = 1;
                copy
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn insert_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_front_64");
    group.bench_function("cowvec", |b| {
        let v: CowVec<u64> = (0..64).collect();
        b.iter_batched(
            || v.clone(),
            |mut copy| {
                copy.insert(0, black_box(7));
                copy
            },
            BatchSize::SmallInput,
        );
    });
    group.bench_function("vec", |b| {
        let v: Vec<u64> = (0..64).collect();
        b.iter_batched(
            || v.clone(),
            |mut copy| {
                copy.insert(0, black_box(7));
                copy
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, push, single, clone, detach, insert_front);
criterion_main!(benches);
