//! The simulation loop.
//!
//! A run populates a fresh structure with `n` keys, answers `10 * n`
//! queries of keys never added, and repeats until the query budget is
//! spent. Every query that comes back true is a false positive.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data_structures::BitTable;
use crate::error::simulation::SimulationError;
use crate::hashing::hash64;
use crate::probes::cycles::cycle_after;
use crate::simulation::algorithms::{Algorithm, BitSelector, SelectorVisitor};
use crate::simulation::geometry::Geometry;
use crate::simulation::report::SimulationReport;

/// `ln 2`, the optimal ratio of k to bits per key.
const LN_2: f64 = 0.693_147_18;

/// Queries answered per structure, as a multiple of keys per structure.
const QUERIES_PER_KEY: u64 = 10;

/// Parameters of one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Table size in bits
    pub bits: u32,
    /// Probes per key; 0 derives it from `bits_per_key`
    pub k: u32,
    /// Bits per key; 0 derives keys per structure from `k`
    pub bits_per_key: f64,
    /// PRNG seed
    pub seed: u64,
    /// Total queries
    pub queries: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            bits: 1 << 20,
            k: 6,
            bits_per_key: 0.0,
            seed: 0,
            queries: 10_000_000,
        }
    }
}

impl SimulationParams {
    /// Parameters for an `m`-bit table with everything else defaulted.
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Set probes per key.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Set bits per key.
    pub fn with_bits_per_key(mut self, bits_per_key: f64) -> Self {
        self.bits_per_key = bits_per_key;
        self
    }

    /// Set the PRNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the total query count.
    pub fn with_queries(mut self, queries: u64) -> Self {
        self.queries = queries;
        self
    }

    /// Resolve `(keys per structure, k)`.
    ///
    /// With `bits_per_key == 0`, keys come from the optimal load for `k`.
    /// Otherwise keys are `bits / bits_per_key` and a zero `k` becomes the
    /// optimal probe count for that load.
    pub fn resolve(&self) -> Result<(u64, u32), SimulationError> {
        if self.bits == 0 {
            return Err(SimulationError::ZeroBits);
        }
        let b = self.bits_per_key;
        if !b.is_finite() || b < 0.0 {
            return Err(SimulationError::InvalidBitsPerKey(b.to_string()));
        }
        let m = f64::from(self.bits);
        let (keys, k) = if b == 0.0 {
            if self.k == 0 {
                return Err(SimulationError::MissingProbeCount);
            }
            ((LN_2 * m / f64::from(self.k) + 0.5) as u64, self.k)
        } else {
            let k = if self.k == 0 {
                (LN_2 * b + 0.5) as u32
            } else {
                self.k
            };
            ((m / b + 0.5) as u64, k)
        };
        if keys == 0 {
            return Err(SimulationError::NoKeys {
                bits: self.bits,
                k,
            });
        }
        Ok((keys, k))
    }
}

/// A validated simulation, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Algorithm to simulate
    pub algorithm: Algorithm,
    /// Derived table geometry
    pub geometry: Geometry,
    /// Keys added per structure
    pub keys: u64,
    /// PRNG seed
    pub seed: u64,
    /// Total queries
    pub queries: u64,
    /// First power of `m_odd` below k that wraps to 0 or 1
    pub cycle_after: Option<u32>,
}

impl Plan {
    /// Derive and validate everything a run needs.
    pub fn new(algorithm: Algorithm, params: &SimulationParams) -> Result<Self, SimulationError> {
        let (keys, k) = params.resolve()?;
        let geometry = Geometry::new(params.bits, k)?;
        algorithm.check(&geometry)?;
        let cycle_after = cycle_after(u64::from(geometry.m_odd), k);

        Ok(Self {
            algorithm,
            geometry,
            keys,
            seed: params.seed,
            queries: params.queries,
            cycle_after,
        })
    }

    /// Execute the plan.
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        info!(
            algorithm = %self.algorithm,
            bits = self.geometry.m,
            k = self.geometry.k,
            keys = self.keys,
            queries = self.queries,
            seed = self.seed,
            "Starting simulation"
        );
        if let Some(power) = self.cycle_after {
            warn!(
                m_odd = self.geometry.m_odd,
                power, "Multiplier m_odd cycles before k powers"
            );
        }

        let stats = self.algorithm.dispatch(Loop { plan: self })?;
        debug!(
            algorithm = %self.algorithm,
            elapsed = ?stats.elapsed,
            structures = stats.structures,
            false_positives = stats.false_positives,
            "Simulation finished"
        );
        Ok(SimulationReport::new(self, &stats))
    }
}

/// Raw counters from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Time spent in the add/query loop
    pub elapsed: Duration,
    /// Queries that returned true
    pub false_positives: u64,
    /// Structures built
    pub structures: u64,
}

struct Loop<'a> {
    plan: &'a Plan,
}

impl SelectorVisitor for Loop<'_> {
    type Output = Result<RunStats, SimulationError>;

    fn visit<S: BitSelector>(self) -> Self::Output {
        let plan = self.plan;
        let geometry = &plan.geometry;
        let selector = S::prepare(geometry);
        let mut table = BitTable::with_words(geometry.len as usize)?;
        let mut rng = StdRng::seed_from_u64(plan.seed);
        let rebuild_every = plan.keys.saturating_mul(QUERIES_PER_KEY);

        let mut remaining = 0u64;
        let mut false_positives = 0u64;
        let mut structures = 0u64;

        let start = Instant::now();
        for _ in 0..plan.queries {
            if remaining == 0 {
                table.clear();
                for _ in 0..plan.keys {
                    selector.add(&mut table, geometry, hash64(rng.next_u64(), 0));
                }
                remaining = rebuild_every;
                structures += 1;
            }
            remaining -= 1;
            if selector.query(&table, geometry, hash64(rng.next_u64(), 0)) {
                false_positives += 1;
            }
        }
        let elapsed = start.elapsed();

        Ok(RunStats {
            elapsed,
            false_positives,
            structures,
        })
    }
}

/// Validate and run one simulation.
pub fn simulate(
    algorithm: Algorithm,
    params: &SimulationParams,
) -> Result<SimulationReport, SimulationError> {
    Plan::new(algorithm, params)?.run()
}
