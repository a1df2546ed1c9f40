//! Simulation result and its one-line rendering.

use std::fmt;

use serde::Serialize;

use crate::simulation::algorithms::Algorithm;
use crate::simulation::fp_model;
use crate::simulation::runner::{Plan, RunStats};

/// Format `value` like C's `%g`: six significant digits, trailing zeros
/// trimmed, scientific notation outside `1e-4 ..= 1e6`.
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Round to six significant digits first so the exponent reflects rounding.
    let sci = format!("{value:.5e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Cache-line annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheLineRate {
    /// Line size in bits
    pub bits: u32,
    /// Modelled false-positive rate
    pub rate: f64,
}

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Algorithm simulated
    pub algorithm: Algorithm,
    /// Table size in bits
    pub bits: u32,
    /// Probes per key
    pub k: u32,
    /// Keys added to each structure
    pub keys: u64,
    /// PRNG seed
    pub seed: u64,
    /// Queries performed
    pub queries: u64,
    /// Structures built during the run
    pub structures: u64,
    /// Wall time of the add/query loop in seconds
    pub elapsed_secs: f64,
    /// Queries that returned true
    pub false_positives: u64,
    /// `false_positives / queries`
    pub sampled_fp_rate: f64,
    /// Standard Bloom filter rate for the same m, n, k
    pub expected_fp_rate: f64,
    /// Sampled rate exceeds twice the expected rate
    pub bad: bool,
    /// Rate modelled for the algorithm's cache line, if any
    pub cache_line: Option<CacheLineRate>,
    /// Extra rate from two-index probing, if applicable
    pub two_index_addl: Option<f64>,
    /// Extra rate from using a 32-bit hash, if applicable
    pub narrow_hash_addl: Option<f64>,
    /// First power of `m_odd` that wraps to 0 or 1 below k, if any
    pub cycle_after: Option<u32>,
}

impl SimulationReport {
    /// Assemble a report from a finished run and fill in the model rates.
    pub fn new(plan: &Plan, stats: &RunStats) -> Self {
        let algorithm = plan.algorithm;
        let m = plan.geometry.m;
        let k = plan.geometry.k;
        let keys = plan.keys;
        let queries = plan.queries;
        let false_positives = stats.false_positives;
        let sampled_fp_rate = if queries == 0 {
            0.0
        } else {
            false_positives as f64 / queries as f64
        };
        let expected_fp_rate = fp_model::bffp(f64::from(m), keys as f64, f64::from(k));
        let profile = algorithm.fp_profile();

        let cache_line = profile.cache_line.and_then(|line| {
            let bits = line.bits(k);
            fp_model::cache_line_rate(m, keys, k, bits).map(|rate| CacheLineRate { bits, rate })
        });

        Self {
            algorithm,
            bits: m,
            k,
            keys,
            seed: plan.seed,
            queries,
            structures: stats.structures,
            elapsed_secs: stats.elapsed.as_secs_f64(),
            false_positives,
            sampled_fp_rate,
            expected_fp_rate,
            bad: sampled_fp_rate > expected_fp_rate * 2.0,
            cache_line,
            two_index_addl: profile.two_index.then(|| fp_model::two_index_addl(m, keys)),
            narrow_hash_addl: profile.narrow_hash.then(|| fp_model::narrow_hash_addl(keys)),
            cycle_after: plan.cycle_after,
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} time: {} sampled_fp_rate{}: {} expected_fp_rate: {}",
            self.algorithm,
            format_general(self.elapsed_secs),
            if self.bad { "(!BAD!)" } else { "" },
            format_general(self.sampled_fp_rate),
            format_general(self.expected_fp_rate),
        )?;
        if let Some(line) = &self.cache_line {
            write!(f, " cache_line_rate({}): {}", line.bits, format_general(line.rate))?;
        }
        if let Some(addl) = self.two_index_addl {
            write!(f, " 2idx_only_addl: {}", format_general(addl))?;
        }
        if let Some(addl) = self.narrow_hash_addl {
            write!(f, " 32bit_only_addl: {}", format_general(addl))?;
        }
        Ok(())
    }
}
