//! Integration tests for the entropy probe and the cycle scan.

use bloom_lab_lib::probes::{cycles, entropy, CycleEvent, CycleScan, EntropyParams, WordWidth};

#[test]
fn test_entropy_run_is_reproducible() {
    let params = EntropyParams {
        seed: 2024,
        tests: Some(3),
        various_iterations: 5000,
        same_iterations: 5000,
        range_bits: 24,
        prime_multipliers: false,
    };
    let mut first = Vec::new();
    let mut second = Vec::new();
    assert_eq!(entropy::run(params, &mut first).unwrap(), 3);
    entropy::run(params, &mut second).unwrap();
    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("Various#")).count(), 3);
    assert_eq!(text.lines().filter(|l| l.starts_with("Same#")).count(), 3);
}

#[test]
fn test_entropy_different_seeds_differ() {
    let params = |seed| EntropyParams {
        seed,
        tests: Some(1),
        various_iterations: 100,
        same_iterations: 100,
        range_bits: 20,
        ..EntropyParams::default()
    };
    let mut a = Vec::new();
    let mut b = Vec::new();
    entropy::run(params(1), &mut a).unwrap();
    entropy::run(params(2), &mut b).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_cycle_scan_32_finds_square_roots_of_one() {
    // The square roots of 1 mod 2^32 are 1, 2^31 - 1, 2^31 + 1 and 2^32 - 1.
    let around = |v: u64| CycleScan::new(WordWidth::W32, Some(v - 2), Some(v + 3)).unwrap();
    for v in [0x7fff_ffffu64, 0x8000_0001] {
        let findings: Vec<_> = around(v)
            .filter_map(|e| match e {
                CycleEvent::Finding(f) => Some(f),
                CycleEvent::Progress(_) => None,
            })
            .collect();
        assert!(findings.iter().any(|f| f.multiplier == v && f.power == 2), "{v:#x}");
    }
}

#[test]
fn test_cycle_scan_output() {
    let scan = CycleScan::new(WordWidth::W64, None, Some(16)).unwrap();
    let mut out = Vec::new();
    let findings = cycles::run(scan, &mut out).unwrap();
    assert_eq!(findings, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0x1 ** 2 === 1 (mod 2**64)\n(0GB Bloom filter)\n"
    );
}
