//! Entropy of chained multiplicative hashing.
//!
//! Each test takes an arithmetic progression of start values, mixes them
//! with [`mix32`] and runs them through chains of 32-bit multiplications,
//! keeping only the upper word of each product. Collisions among the
//! combined upper words show how much entropy the chain preserves.
//!
//! The "various" test uses a chain of different multipliers whose product
//! just exceeds the range, and a second chain where an extra
//! "interference" multiplication precedes each step. The "same" test
//! repeats one multiplier and ignores the order of the results.

use std::fmt;
use std::io::Write;

use fnv::FnvBuildHasher;
use hashbrown::HashSet;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data_structures::BitTable;
use crate::error::probe::ProbeError;
use crate::hashing::{mix32, nearest_prime};
use crate::simulation::report::format_general;

/// Parameters of an entropy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyParams {
    /// PRNG seed
    pub seed: u64,
    /// Number of tests; `None` runs forever
    pub tests: Option<u64>,
    /// Values pushed through each "various" chain
    pub various_iterations: u32,
    /// Values pushed through each "same" chain
    pub same_iterations: u32,
    /// Chains stop once their product exceeds `2^range_bits`
    pub range_bits: u32,
    /// Snap every multiplier down to a prime
    pub prime_multipliers: bool,
}

impl Default for EntropyParams {
    fn default() -> Self {
        Self {
            seed: 0,
            tests: None,
            various_iterations: 5_000_000,
            same_iterations: 1_000_000,
            range_bits: 32,
            prime_multipliers: false,
        }
    }
}

impl EntropyParams {
    /// Check ranges before any work starts.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if !(1..=32).contains(&self.range_bits) {
            return Err(ProbeError::InvalidRangeBits(self.range_bits));
        }
        if self.various_iterations == 0 {
            return Err(ProbeError::ZeroIterations("various_iterations"));
        }
        if self.same_iterations == 0 {
            return Err(ProbeError::ZeroIterations("same_iterations"));
        }
        Ok(())
    }
}

/// Outcome of a "various" test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariousOutcome {
    /// Test number, from 0
    pub test: u64,
    /// Multipliers of the chain
    pub configuration: Vec<u32>,
    /// Extra multiplier applied before each step; the first is always 1
    pub interference: Vec<u32>,
    /// Product of `configuration`
    pub product: u64,
    /// Repeated composites of the plain chain
    pub collisions: u64,
    /// Repeated composites of the interfered chain
    pub collisions_inter: u64,
}

impl fmt::Display for VariousOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Various#{}: ", self.test)?;
        let last = self.configuration.len().saturating_sub(1);
        for (i, (p, q)) in self.configuration.iter().zip(&self.interference).enumerate() {
            write!(f, "({q}*){p}{}", if i < last { "*" } else { " " })?;
        }
        writeln!(
            f,
            "({}) -> {} coll, {} inter",
            format_general(self.product as f64 / 4_294_967_296.0),
            self.collisions,
            self.collisions_inter
        )?;

        // Cumulative log2 of the chain, bracketing each configured factor.
        f.write_str("          ")?;
        let mut position = 0.0f64;
        for (p, q) in self.configuration.iter().zip(&self.interference) {
            position += f64::from(*q).log2();
            write!(f, "[{}", format_general(position))?;
            position += f64::from(*p).log2();
            write!(f, ",{}]", format_general(position))?;
        }
        Ok(())
    }
}

/// Outcome of a "same" test.
#[derive(Debug, Clone, PartialEq)]
pub struct SameOutcome {
    /// Test number, from 0
    pub test: u64,
    /// The repeated multiplier
    pub multiplicand: u32,
    /// Chain length
    pub power: u32,
    /// `log2(multiplicand^power)`
    pub product_bits: f64,
    /// `log2(2^range_bits * power!)`, the entropy expected when order is lost
    pub expected_bits: f64,
    pub collisions: u64,
}

impl fmt::Display for SameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Same#{}: {}**{} ({} bits vs. {}) -> {} coll",
            self.test,
            self.multiplicand,
            self.power,
            format_general(self.product_bits),
            format_general(self.expected_bits),
            self.collisions
        )
    }
}

/// Upper 32 bits of `cur * p`.
#[inline]
fn upper(cur: u32, p: u32) -> u32 {
    ((u64::from(cur) * u64::from(p)) >> 32) as u32
}

/// Seeded state shared by the tests of one run.
pub struct EntropyProbe {
    params: EntropyParams,
    rng: StdRng,
    seen_sparse: HashSet<u64, FnvBuildHasher>,
    next_test: u64,
}

impl EntropyProbe {
    /// Validate `params` and seed the generator.
    pub fn new(params: EntropyParams) -> Result<Self, ProbeError> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::seed_from_u64(params.seed),
            seen_sparse: HashSet::with_hasher(FnvBuildHasher::default()),
            next_test: 0,
        })
    }

    /// Random odd multiplier with its top set bit at a random position in
    /// `1..=max_inner_bits + 1`.
    fn random_odd(&mut self, inner_scale: u64) -> u32 {
        let inner_bits = (((self.rng.next_u64() >> 5) * inner_scale) >> 59) as u32;
        let top = 2u32 << inner_bits;
        let v = (self.rng.next_u64() as u32 & (top - 1)) | top | 1;
        self.snap(v)
    }

    fn snap(&self, v: u32) -> u32 {
        if self.params.prime_multipliers {
            nearest_prime(v)
        } else {
            v
        }
    }

    /// Smallest odd factor that takes `product` past `range`. Prime
    /// snapping rounds down, so candidates keep climbing until the snapped
    /// value still exceeds the range.
    fn closing_factor(&self, range: u64, product: u64) -> u32 {
        let mut candidate = (range / product + 1) | 1;
        loop {
            let p = self.snap(u32::try_from(candidate).unwrap_or(u32::MAX));
            if product * u64::from(p) > range || candidate >= u64::from(u32::MAX) {
                return p;
            }
            candidate += 2;
        }
    }

    /// Run the next pair of tests.
    pub fn next_test(&mut self) -> Result<(VariousOutcome, SameOutcome), ProbeError> {
        let test = self.next_test;
        self.next_test += 1;

        let mut start_val = self.rng.next_u64() as u32;
        let start_val_incr = (self.rng.next_u64() | 1) as u32;

        let various = self.various(test, &mut start_val, start_val_incr)?;
        let same = self.same(test, &mut start_val, start_val_incr);
        Ok((various, same))
    }

    fn various(&mut self, test: u64, start_val: &mut u32, incr: u32) -> Result<VariousOutcome, ProbeError> {
        let range = 1u64 << self.params.range_bits;
        let mut configuration = Vec::new();
        let mut interference = Vec::new();
        let mut product = 1u64;
        loop {
            let mut p = self.random_odd(31);
            let last = product * u64::from(p) > range;
            if last {
                p = self.closing_factor(range, product);
            }
            configuration.push(p);
            product *= u64::from(p);
            interference.push(self.random_odd(31));
            if last {
                break;
            }
        }
        interference[0] = 1;
        debug!(test, ?configuration, ?interference, product, "Various chain");

        let mut seen = BitTable::with_bits(product)?;
        let mut seen_inter = BitTable::with_bits(product)?;
        let mut collisions = 0u64;
        let mut collisions_inter = 0u64;

        for _ in 0..self.params.various_iterations {
            let mut cur = mix32(*start_val);
            let mut cur_inter = cur;
            let mut composite = 0u64;
            let mut composite_inter = 0u64;
            for (&p, &q) in configuration.iter().zip(&interference) {
                composite = composite * u64::from(p) + u64::from(upper(cur, p));
                cur = cur.wrapping_mul(p);

                cur_inter = cur_inter.wrapping_mul(q);
                composite_inter = composite_inter * u64::from(p) + u64::from(upper(cur_inter, p));
                cur_inter = cur_inter.wrapping_mul(p);
            }
            if seen.test_and_set(composite) {
                collisions += 1;
            }
            if seen_inter.test_and_set(composite_inter) {
                collisions_inter += 1;
            }
            *start_val = start_val.wrapping_add(incr);
        }

        Ok(VariousOutcome {
            test,
            configuration,
            interference,
            product,
            collisions,
            collisions_inter,
        })
    }

    fn same(&mut self, test: u64, start_val: &mut u32, incr: u32) -> SameOutcome {
        let range = 1u64 << self.params.range_bits;
        let multiplicand = self.random_odd(16);
        let mut power = 1u32;
        let mut product = u64::from(multiplicand);
        let mut expected_bits = f64::from(self.params.range_bits);
        while product < range {
            power += 1;
            expected_bits += f64::from(power).log2();
            product *= u64::from(multiplicand);
        }

        self.seen_sparse.clear();
        let mut vals = vec![0u32; power as usize];
        let mut collisions = 0u64;
        for _ in 0..self.params.same_iterations {
            let mut cur = mix32(*start_val);
            for val in vals.iter_mut() {
                *val = upper(cur, multiplicand);
                cur = cur.wrapping_mul(multiplicand);
            }
            vals.sort_unstable();
            let composite = vals.iter().fold(0u64, |acc, &v| {
                acc.wrapping_mul(u64::from(multiplicand)).wrapping_add(u64::from(v))
            });
            if !self.seen_sparse.insert(composite) {
                collisions += 1;
            }
            *start_val = start_val.wrapping_add(incr);
        }

        SameOutcome {
            test,
            multiplicand,
            power,
            product_bits: (product as f64).log2(),
            expected_bits,
            collisions,
        }
    }
}

/// Run tests until the configured count is reached (or forever), writing
/// each outcome as it completes.
pub fn run(params: EntropyParams, out: &mut impl Write) -> Result<u64, ProbeError> {
    let mut probe = EntropyProbe::new(params)?;
    info!(seed = params.seed, tests = ?params.tests, range_bits = params.range_bits, "Starting entropy probe");
    let mut completed = 0u64;
    while params.tests.map_or(true, |tests| completed < tests) {
        let (various, same) = probe.next_test()?;
        writeln!(out, "{various}")?;
        writeln!(out, "{same}")?;
        out.flush()?;
        completed += 1;
    }
    Ok(completed)
}
