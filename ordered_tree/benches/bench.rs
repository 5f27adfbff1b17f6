use core::hint::black_box;
use core::time::Duration;
use std::collections::BTreeMap;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use ordered_tree::OrderedTree;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub fn gen_random_ints(count: usize, key_max: i32) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let vec: Vec<i32> = (0..count).map(|_| rng.gen_range(0..key_max)).collect();
    assert_eq!(vec.len(), count);
    vec
}

pub fn gen_ascending_ints(count: usize) -> Vec<i32> {
    (0..count as i32).collect()
}

fn shuffled(keys: &[i32], seed: u64) -> Vec<i32> {
    let mut keys = keys.to_vec();
    keys.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    keys
}

fn add(c: &mut Criterion) {
    let mut g = c.benchmark_group("add");
    for count in [100, 1_000, 10_000] {
        let keys = gen_random_ints(count, i32::MAX);
        g.bench_with_input(BenchmarkId::new("ordered_tree", count), &keys, |b, keys| {
            b.iter(|| {
                let mut tree = OrderedTree::new();
                for &k in keys {
                    tree.add(k, k);
                }
                tree
            })
        });
        g.bench_with_input(BenchmarkId::new("std_btreemap", count), &keys, |b, keys| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for &k in keys {
                    map.insert(k, k);
                }
                map
            })
        });
    }

    // degenerates into a list
    for count in [100, 1_000] {
        let keys = gen_ascending_ints(count);
        g.bench_with_input(BenchmarkId::new("ordered_tree_ascending", count), &keys, |b, keys| {
            b.iter(|| keys.iter().map(|&k| (k, k)).collect::<OrderedTree<_, _>>())
        });
    }
    g.finish();
}

fn get(c: &mut Criterion) {
    let mut g = c.benchmark_group("get");
    for count in [100, 1_000, 10_000] {
        let keys = gen_random_ints(count, i32::MAX);
        let tree: OrderedTree<_, _> = keys.iter().map(|&k| (k, k)).collect();
        let access = shuffled(&keys, 2);
        g.bench_with_input(BenchmarkId::new("ordered_tree", count), &access, |b, access| {
            b.iter(|| {
                for k in access {
                    black_box(tree.get(black_box(k)));
                }
            })
        });
    }
    g.finish();
}

fn remove(c: &mut Criterion) {
    let mut g = c.benchmark_group("remove");
    for count in [100, 1_000, 10_000] {
        let keys = gen_random_ints(count, i32::MAX);
        let order = shuffled(&keys, 3);
        g.bench_with_input(BenchmarkId::new("ordered_tree", count), &order, |b, order| {
            b.iter_batched_ref(
                || keys.iter().map(|&k| (k, k)).collect::<OrderedTree<_, _>>(),
                |tree| {
                    for k in order {
                        black_box(tree.remove(k));
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(1))
        .warm_up_time(Duration::from_millis(100))
        ;
    targets = add, get, remove
);
criterion_main!(benches);
