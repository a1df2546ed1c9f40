//! Tests for the configuration module.
//!
//! Each test that touches environment variables uses its own prefix so
//! tests can run in parallel.

use super::test_utils::TestFixture;
use crate::config::{self, ConfigLoader, LabConfig, Validate};
use crate::error::config::ConfigError;
use crate::probes::WordWidth;
use crate::simulation::Algorithm;

/// Test that default configuration can be created and is valid.
#[test]
fn test_default_config_is_valid() {
    let config = LabConfig::default();
    assert!(config.validate().is_ok());
}

/// Test that validation reaches every section.
#[test]
fn test_config_validation() {
    let mut config = LabConfig::default();

    config.simulation.bits = 0;
    assert!(config.validate().is_err());

    config.simulation.bits = 1024;
    config.entropy.range_bits = 0;
    assert!(config.validate().is_err());

    config.entropy.range_bits = 32;
    config.log.level = "verbose".to_string();
    assert!(config.validate().is_err());

    config.log.level = "debug".to_string();
    config.cycles.start = Some(5);
    config.cycles.limit = Some(5);
    assert!(config.validate().is_err());

    config.cycles.limit = None;
    assert!(config.validate().is_ok());
}

/// Test loading configuration from a TOML file.
#[test]
fn test_load_config_from_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file(
            "lab.toml",
            r#"
            [simulation]
            algorithm = "cache-rocksdb-dynamic"
            bits = 65536
            bits_per_key = 10

            [compare]
            algorithms = ["worm64", "dbl-pow2"]
            workers = 3

            [cycles]
            width = "64"
            limit = 1000
            "#,
        )
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_FILE").load().unwrap();

    assert_eq!(config.simulation.algorithm, Algorithm::CacheRocksdbDynamic);
    assert_eq!(config.simulation.bits, 65536);
    assert_eq!(config.simulation.bits_per_key, 10.0);
    assert_eq!(config.compare.algorithms, vec![Algorithm::Worm64, Algorithm::DblPow2]);
    assert_eq!(config.compare.workers, 3);
    assert_eq!(config.cycles.width, WordWidth::W64);
    assert_eq!(config.cycles.limit, Some(1000));

    // Other values should be defaults
    assert_eq!(config.simulation.k, LabConfig::default().simulation.k);
    assert_eq!(config.entropy, LabConfig::default().entropy);
}

/// Test loading configuration from a JSON file.
#[test]
fn test_load_config_from_json() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("lab.json", r#"{ "entropy": { "seed": 17, "tests": 4, "prime_multipliers": true } }"#)
        .unwrap();

    let config = ConfigLoader::new(Some(&path), "TEST_JSON").load().unwrap();
    assert_eq!(config.entropy.seed, 17);
    assert_eq!(config.entropy.tests, Some(4));
    assert!(config.entropy.prime_multipliers);
}

/// Test environment variable overrides.
#[test]
fn test_env_var_override() {
    let mut fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("lab.toml", "[simulation]\nbits = 2048\nk = 4\n")
        .unwrap();

    fixture.set_env("TEST_ENV__SIMULATION__K", "9");
    fixture.set_env("TEST_ENV__SIMULATION__ALGORITHM", "worm32");
    fixture.set_env("TEST_ENV__LOG__JSON", "true");

    let config = ConfigLoader::new(Some(&path), "TEST_ENV").load().unwrap();

    assert_eq!(config.simulation.bits, 2048);
    assert_eq!(config.simulation.k, 9);
    assert_eq!(config.simulation.algorithm, Algorithm::Worm32);
    assert!(config.log.json);
}

/// Test that a missing file is reported as such.
#[test]
fn test_missing_file() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.temp_dir.path().join("absent.toml");
    let err = ConfigLoader::new(Some(&path), "TEST_MISSING").load().unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(p) if p == path));
}

/// Test that loading an invalid configuration file returns an error.
#[test]
fn test_load_invalid_config() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("invalid.toml", "[simulation\nbits = lots\"")
        .unwrap();
    let err = ConfigLoader::new(Some(&path), "TEST_INVALID").load().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

/// Test that an unknown algorithm name is rejected.
#[test]
fn test_unknown_algorithm() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("lab.toml", "[simulation]\nalgorithm = \"cuckoo\"\n")
        .unwrap();
    assert!(ConfigLoader::new(Some(&path), "TEST_UNKNOWN").load().is_err());
}

/// Test that values loaded from a file are still validated.
#[test]
fn test_loaded_values_validated() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture
        .write_file("lab.toml", "[simulation]\nk = 0\nbits_per_key = 0\n")
        .unwrap();
    let err = ConfigLoader::new(Some(&path), "TEST_VALIDATED").load().unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

/// Test that unsupported extensions are rejected before parsing.
#[test]
fn test_unsupported_extension() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.write_file("lab.ini", "bits=1").unwrap();
    let err = ConfigLoader::new(Some(&path), "TEST_EXT").load().unwrap_err();
    assert!(err.to_string().contains("Unsupported file extension"));
}

/// Test that generated configuration loads back unchanged.
#[test]
fn test_generated_config_round_trip() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.temp_dir.path().join("nested/dir/lab.toml");
    config::write_toml(&LabConfig::default(), &path).unwrap();

    let loaded = ConfigLoader::new(Some(&path), "TEST_GEN").load().unwrap();
    assert_eq!(loaded, LabConfig::default());
}
