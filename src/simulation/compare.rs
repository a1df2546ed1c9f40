//! Run several algorithms with identical parameters and rank them by time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::simulation::SimulationError;
use crate::simulation::algorithms::Algorithm;
use crate::simulation::report::SimulationReport;
use crate::simulation::runner::{simulate, SimulationParams};

/// An algorithm left out of a comparison and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// The algorithm
    pub algorithm: Algorithm,
    /// Constraint it failed
    pub reason: SimulationError,
}

/// Reports sorted fastest first, plus whatever was skipped.
#[derive(Debug, Clone, Default)]
pub struct CompareOutcome {
    /// One report per simulated algorithm
    pub reports: Vec<SimulationReport>,
    /// Algorithms rejected by their constraints, by name
    pub skipped: Vec<Skipped>,
}

/// Simulate every algorithm in `algorithms` (all of them when empty) on up
/// to `workers` threads. Zero workers means one per CPU.
///
/// Algorithms whose constraints reject `params` are skipped; any other
/// error aborts the comparison.
pub fn compare(
    algorithms: &[Algorithm],
    params: &SimulationParams,
    workers: usize,
) -> Result<CompareOutcome, SimulationError> {
    let algorithms = if algorithms.is_empty() {
        Algorithm::ALL
    } else {
        algorithms
    };
    let workers = match workers {
        0 => num_cpus::get(),
        n => n,
    }
    .clamp(1, algorithms.len().max(1));
    debug!(count = algorithms.len(), workers, "Comparing algorithms");

    let next = AtomicUsize::new(0);
    let results = Mutex::new(Vec::with_capacity(algorithms.len()));

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(&algorithm) = algorithms.get(index) else {
                    break;
                };
                let result = simulate(algorithm, params);
                results.lock().push((algorithm, result));
            });
        }
    });

    let mut outcome = CompareOutcome::default();
    for (algorithm, result) in results.into_inner() {
        match result {
            Ok(report) => outcome.reports.push(report),
            Err(reason) if reason.is_constraint_violation() => {
                warn!(%algorithm, %reason, "Skipping algorithm");
                outcome.skipped.push(Skipped { algorithm, reason });
            }
            Err(e) => return Err(e),
        }
    }
    outcome
        .reports
        .sort_by(|a, b| a.elapsed_secs.total_cmp(&b.elapsed_secs));
    outcome.skipped.sort_by_key(|s| s.algorithm);
    Ok(outcome)
}
