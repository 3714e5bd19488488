use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use seesaw::TreeMap;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("map_insert", |b| {
        let mut map = TreeMap::new();
        b.iter(|| {
            for value in &values {
                map.insert(*value, *value);
            }
        })
    });

    let mut map = TreeMap::new();
    for value in &values {
        map.insert(*value, *value);
    }

    c.bench_function("map_get", |b| {
        b.iter(|| {
            for value in &values {
                black_box(map.get(value).ok());
            }
        })
    });

    c.bench_function("map_iter", |b| {
        b.iter(|| {
            for (k, v) in &map {
                black_box((k, v));
            }
        })
    });

    c.bench_function("map_keys", |b| {
        b.iter(|| {
            for k in map.keys() {
                black_box(k);
            }
        })
    });

    c.bench_function("map_remove", |b| {
        let mut map = map.clone();
        b.iter(|| {
            for value in &values {
                let _ = map.remove(value);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
