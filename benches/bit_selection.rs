//! Bloom Lab Benchmarks
//!
//! Add and query throughput of the bit-selection algorithms, measured with
//! Criterion outside the simulation loop.
//!
//! To run the benchmarks:
//! ```bash
//! cargo bench --features benchmarking
//! ```

use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput,
};

use bloom_lab_lib::data_structures::BitTable;
use bloom_lab_lib::hashing::{fastrange32, hash64, worm64};
use bloom_lab_lib::simulation::algorithms::{BitSelector, SelectorVisitor};
use bloom_lab_lib::simulation::{simulate, Algorithm, Geometry, SimulationParams};

const KEYS: u64 = 10_000;

/// Runs one add pass and one query pass over `KEYS` hashes.
struct AddQuery<'a> {
    geometry: &'a Geometry,
    hashes: &'a [u64],
    table: &'a mut BitTable,
}

impl SelectorVisitor for AddQuery<'_> {
    type Output = u64;

    fn visit<S: BitSelector>(self) -> u64 {
        let selector = S::prepare(self.geometry);
        self.table.clear();
        for &h in self.hashes {
            selector.add(self.table, self.geometry, h);
        }
        let table: &BitTable = self.table;
        self.hashes
            .iter()
            .map(|&h| u64::from(selector.query(table, self.geometry, h.rotate_left(1))))
            .sum()
    }
}

/// Benchmark add+query for a representative algorithm of each family.
fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_query");
    group.sampling_mode(SamplingMode::Flat);
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));
    group.throughput(Throughput::Elements(2 * KEYS));

    let hashes: Vec<u64> = (0..KEYS).map(|i| hash64(i, 0)).collect();
    let algorithms = [
        Algorithm::Worm64,
        Algorithm::RotPow2,
        Algorithm::CacheWorm64,
        Algorithm::CacheWorm64Block,
        Algorithm::CacheBlock64,
        Algorithm::DblOneMod,
        Algorithm::CacheRocksdbDynamic,
        Algorithm::CacheSimdFastrange32K8,
    ];

    for algorithm in algorithms {
        let k = algorithm.constraints().exact_k.unwrap_or(6);
        for bits in [1u32 << 16, 1 << 24] {
            let geometry = Geometry::new(bits, k).unwrap();
            if algorithm.check(&geometry).is_err() {
                continue;
            }
            let mut table = BitTable::with_words(geometry.len as usize).unwrap();
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), bits),
                &geometry,
                |b, geometry| {
                    b.iter(|| {
                        algorithm.dispatch(AddQuery {
                            geometry,
                            hashes: black_box(&hashes),
                            table: &mut table,
                        })
                    });
                },
            );
        }
    }
    group.finish();
}

/// Benchmark the range-reduction primitives.
fn bench_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");
    group.throughput(Throughput::Elements(1));

    group.bench_function("hash64", |b| {
        let mut v = 0u64;
        b.iter(|| {
            v = v.wrapping_add(1);
            hash64(black_box(v), 0)
        });
    });
    group.bench_function("worm64", |b| {
        let mut h = hash64(1, 0);
        b.iter(|| worm64(black_box(1_000_003), &mut h));
    });
    group.bench_function("fastrange32", |b| {
        let mut h = 0u32;
        b.iter(|| {
            h = h.wrapping_add(0x9e37_79b9);
            fastrange32(black_box(1_000_003), h)
        });
    });
    group.finish();
}

/// Benchmark a complete short simulation, including table rebuilds.
fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(10);
    let params = SimulationParams::new(1 << 20)
        .with_bits_per_key(10.0)
        .with_queries(200_000);
    group.bench_function("cache-worm64", |b| {
        b.iter(|| simulate(Algorithm::CacheWorm64, black_box(&params)))
    });
    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_hashing, bench_simulation);
criterion_main!(benches);
