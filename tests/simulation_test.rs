// Copyright (c) 2025 Bloom Lab Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the simulation pipeline, from parameters to the
//! printed statistics line.

use bloom_lab_lib::config::{ConfigLoader, LabConfig};
use bloom_lab_lib::error::simulation::SimulationError;
use bloom_lab_lib::simulation::{compare, simulate, Algorithm, Family, Plan, SimulationParams};
use test_case::test_case;

fn quick(bits: u32, bits_per_key: f64) -> SimulationParams {
    SimulationParams::new(bits)
        .with_bits_per_key(bits_per_key)
        .with_seed(7)
        .with_queries(100_000)
}

#[test_case(Algorithm::Worm64 ; "plain worm")]
#[test_case(Algorithm::CacheWorm64 ; "cache local worm")]
#[test_case(Algorithm::CacheWorm64Block ; "blocked worm")]
#[test_case(Algorithm::DblOneMod ; "double hashing")]
#[test_case(Algorithm::CacheRocksdbDynamic ; "rocksdb")]
#[test_case(Algorithm::CacheSimdFastrange32 ; "sector")]
fn test_rates_are_plausible(algorithm: Algorithm) {
    // Six bits per key derives k=4, a load where even the blocked layouts
    // stay well within twice the standard rate.
    let report = simulate(algorithm, &quick(1 << 16, 6.0)).unwrap();
    assert_eq!(report.k, 4);
    assert!(!report.bad, "{report}");
    assert!(report.false_positives > 0, "{report}");
}

#[test]
fn test_report_line_shape() {
    let report = simulate(Algorithm::CacheBlock64, &quick(1 << 14, 10.0)).unwrap();
    let line = report.to_string();
    assert!(line.starts_with("cache-block64 time: "), "{line}");
    assert!(line.contains(" sampled_fp_rate"), "{line}");
    assert!(line.contains(" expected_fp_rate: "), "{line}");
    assert!(line.contains(" cache_line_rate(64): "), "{line}");
}

#[test]
fn test_every_algorithm_runs_at_its_own_k() {
    for &algorithm in Algorithm::ALL {
        let k = algorithm.constraints().exact_k.unwrap_or(6);
        let params = SimulationParams::new(1 << 13).with_k(k).with_queries(2000);
        let report = simulate(algorithm, &params)
            .unwrap_or_else(|e| panic!("{algorithm}: {e}"));
        assert_eq!(report.queries, 2000);
        if algorithm.family() != Family::Plain {
            assert!(report.sampled_fp_rate < 0.5, "{report}");
        }
    }
}

#[test_case(Algorithm::LocalWorm64, 100, 40 ; "local worm many laps")]
#[test_case(Algorithm::LocalWorm64, 7, 3 ; "local worm tiny")]
#[test_case(Algorithm::LocalMul64, 100, 40 ; "local mul")]
#[test_case(Algorithm::Worm64, 100, 40 ; "plain worm")]
#[test_case(Algorithm::DblOneMod, 100, 40 ; "double hashing")]
#[test_case(Algorithm::RocksdbDynamic, 100, 40 ; "rocksdb")]
fn test_tables_below_one_line(algorithm: Algorithm, bits: u32, k: u32) {
    let params = SimulationParams::new(bits)
        .with_k(k)
        .with_seed(7)
        .with_queries(10_000);
    let report = simulate(algorithm, &params).unwrap_or_else(|e| panic!("{algorithm}: {e}"));
    assert_eq!(report.bits, bits);
    assert_eq!(report.queries, 10_000);
}

#[test]
fn test_constraint_errors_surface_before_running() {
    let params = SimulationParams::new(1000).with_k(20);
    assert!(matches!(
        Plan::new(Algorithm::CacheSimdFastrange32, &params),
        Err(SimulationError::TooManyProbes { max: 8, .. })
    ));
    assert!(matches!(
        Plan::new(Algorithm::DblPow2, &params),
        Err(SimulationError::RequiresPowerOfTwo { .. })
    ));
}

#[test]
fn test_compare_all_with_config_defaults() {
    let mut config = LabConfig::default();
    config.simulation.bits = 1 << 12;
    config.simulation.queries = 3000;
    config.simulation.k = 6;

    let outcome = compare(&[], &config.simulation.params(), 0).unwrap();
    // Only the k=8 specialization rejects k=6 on a power-of-two table.
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].algorithm, Algorithm::CacheSimdFastrange32K8);
    assert_eq!(outcome.reports.len(), Algorithm::ALL.len() - 1);
}

#[test]
fn test_json_report() {
    let report = simulate(Algorithm::DblPow2, &quick(1 << 12, 10.0)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["algorithm"], "dbl-pow2");
    assert_eq!(json["bits"], 4096);
    assert!(json["two_index_addl"].is_number());
    assert!(json["cache_line"].is_null());
}

#[test]
fn test_loader_without_file_gives_defaults() {
    let config = ConfigLoader::new(None::<&str>, "BLOOM_LAB_IT_NONE").load().unwrap();
    assert_eq!(config, LabConfig::default());
}
