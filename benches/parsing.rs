//! Benchmarking NAV parsing and store queries
//! using tiny files
extern crate criterion;
use criterion::{criterion_group, criterion_main, Criterion};

use rinex_nav::prelude::*;

fn nav_parsing(path: &str) -> EphemerisStore {
    EphemerisStore::from_file(path).unwrap()
}

fn benchmark(c: &mut Criterion) {
    let mut parsing_grp = c.benchmark_group("parsing");

    // Small RINEX NAV (V2)
    parsing_grp.bench_function("NAV/V2", |b| {
        b.iter(|| {
            nav_parsing("test_resources/NAV/V2/brdc1770.20n");
        })
    });

    // Small RINEX NAV (V3, mixed)
    parsing_grp.bench_function("NAV/V3", |b| {
        b.iter(|| {
            nav_parsing("test_resources/NAV/V3/MIXD00TST_R_20201770000_01D_MN.rnx");
        })
    });

    parsing_grp.finish();

    let mut query_grp = c.benchmark_group("query");
    let store = nav_parsing("test_resources/NAV/V3/MIXD00TST_R_20201770000_01D_MN.rnx");
    let g01 = SV::new(Constellation::GPS, 1);
    let t = GnssTime::from_gregorian(TimeSystem::GPS, 2020, 6, 25, 1, 0, 0.0).unwrap();

    query_grp.bench_function("find", |b| {
        b.iter(|| {
            let _ = store.find(g01, t).unwrap();
        })
    });

    query_grp.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
