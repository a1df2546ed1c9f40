//! Bloom Lab - Main entrypoint.
//!
//! Loads configuration, initializes logging and dispatches to the
//! simulation, comparison and probe subcommands. Statistics go to stdout,
//! logs to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use bloom_lab_lib::config::{self, ConfigLoader, LabConfig, LogConfig, Validate, ENV_PREFIX};
use bloom_lab_lib::error::{
    report_error, set_error_reporter, ErrorContext, LabError, LabResult, TracingErrorReporter,
};
use bloom_lab_lib::probes::{cycles, entropy, CycleScan, WordWidth};
use bloom_lab_lib::simulation::{self, Algorithm, Plan};

/// Command line arguments for Bloom Lab.
#[derive(Parser, Debug)]
#[clap(name = "bloom_lab", version, author, about)]
struct Cli {
    /// Path to configuration file
    #[clap(short, long, value_parser, global = true)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one algorithm and print its statistics line
    Simulate {
        /// Algorithm to simulate
        #[clap(short, long, value_enum)]
        algorithm: Option<Algorithm>,

        #[clap(flatten)]
        params: SimulationArgs,

        /// Print the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Simulate several algorithms with identical parameters, fastest first
    Compare {
        /// Algorithms to compare (comma separated); all when omitted
        #[clap(short, long, value_enum, value_delimiter = ',')]
        algorithms: Vec<Algorithm>,

        /// Worker threads; 0 for one per CPU
        #[clap(short, long)]
        workers: Option<usize>,

        #[clap(flatten)]
        params: SimulationArgs,

        /// Print the reports as JSON
        #[clap(long)]
        json: bool,
    },

    /// Measure entropy kept by chained multiplicative hashing
    Entropy {
        /// PRNG seed
        #[clap(short, long)]
        seed: Option<u64>,

        /// Number of tests; runs until interrupted when omitted
        #[clap(short, long)]
        tests: Option<u64>,

        /// Values per "various" test
        #[clap(long)]
        various_iterations: Option<u32>,

        /// Values per "same" test
        #[clap(long)]
        same_iterations: Option<u32>,

        /// Log2 of the range each chain must cover
        #[clap(long)]
        range_bits: Option<u32>,

        /// Snap multipliers down to the nearest prime
        #[clap(long)]
        prime_multipliers: bool,
    },

    /// Scan for multipliers whose small powers are 1 modulo the word size
    Cycles {
        /// Word width
        #[clap(short, long, value_enum)]
        width: Option<WordWidth>,

        /// First multiplier to examine
        #[clap(long)]
        start: Option<u64>,

        /// Exclusive end of the scan
        #[clap(long)]
        limit: Option<u64>,
    },

    /// List the available algorithms and their constraints
    List,

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Simulation parameters that override the `[simulation]` section.
#[derive(Args, Debug)]
struct SimulationArgs {
    /// Table size in bits (m)
    #[clap(short = 'm', long)]
    bits: Option<u32>,

    /// Probes per key; 0 derives it from bits per key
    #[clap(short, long)]
    k: Option<u32>,

    /// Bits per key; 0 derives the key count from k
    #[clap(short, long)]
    bits_per_key: Option<f64>,

    /// PRNG seed
    #[clap(short, long)]
    seed: Option<u64>,

    /// Total queries
    #[clap(short, long)]
    queries: Option<u64>,
}

impl SimulationArgs {
    fn apply(&self, config: &mut config::SimulationConfig) {
        if let Some(bits) = self.bits {
            config.bits = bits;
        }
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(bits_per_key) = self.bits_per_key {
            config.bits_per_key = bits_per_key;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(queries) = self.queries {
            config.queries = queries;
        }
    }
}

/// Initialize the logging system.
fn init_logging(log: &LogConfig) -> LabResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let json = log.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_line_number(log.source_location)
            .with_file(log.source_location)
            .with_thread_names(true)
    });
    let plain = (!log.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_line_number(log.source_location)
            .with_file(log.source_location)
            .with_thread_names(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| LabError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Apply command-line overrides to the loaded configuration.
fn apply_overrides(command: &Command, config: &mut LabConfig) {
    match command {
        Command::Simulate {
            algorithm, params, ..
        } => {
            if let Some(algorithm) = algorithm {
                config.simulation.algorithm = *algorithm;
            }
            params.apply(&mut config.simulation);
        }
        Command::Compare {
            algorithms,
            workers,
            params,
            ..
        } => {
            if !algorithms.is_empty() {
                config.compare.algorithms = algorithms.clone();
            }
            if let Some(workers) = workers {
                config.compare.workers = *workers;
            }
            params.apply(&mut config.simulation);
        }
        Command::Entropy {
            seed,
            tests,
            various_iterations,
            same_iterations,
            range_bits,
            prime_multipliers,
        } => {
            let entropy = &mut config.entropy;
            entropy.seed = seed.unwrap_or(entropy.seed);
            entropy.tests = tests.or(entropy.tests);
            entropy.various_iterations = various_iterations.unwrap_or(entropy.various_iterations);
            entropy.same_iterations = same_iterations.unwrap_or(entropy.same_iterations);
            entropy.range_bits = range_bits.unwrap_or(entropy.range_bits);
            entropy.prime_multipliers |= prime_multipliers;
        }
        Command::Cycles {
            width,
            start,
            limit,
        } => {
            let cycles = &mut config.cycles;
            cycles.width = width.unwrap_or(cycles.width);
            cycles.start = start.or(cycles.start);
            cycles.limit = limit.or(cycles.limit);
        }
        Command::List | Command::Validate | Command::GenConfig { .. } => {}
    }
}

fn run_simulate(config: &LabConfig, json: bool) -> LabResult<()> {
    let plan = Plan::new(config.simulation.algorithm, &config.simulation.params())?;
    let mut out = io::stdout().lock();
    if let Some(power) = plan.cycle_after {
        writeln!(out, "Cycle after {power}")?;
    }
    let report = plan.run()?;
    if json {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

fn run_compare(config: &LabConfig, json: bool) -> LabResult<()> {
    let outcome = simulation::compare(
        &config.compare.algorithms,
        &config.simulation.params(),
        config.compare.workers,
    )?;
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&outcome.reports)?)?;
    } else {
        for report in &outcome.reports {
            writeln!(out, "{report}")?;
        }
    }
    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            "Some algorithms do not support these parameters"
        );
    }
    Ok(())
}

fn run_list() -> LabResult<()> {
    let mut out = io::stdout().lock();
    for algorithm in Algorithm::ALL {
        writeln!(
            out,
            "{:<34} {:<16} {}",
            algorithm.name(),
            algorithm.family(),
            algorithm.constraints()
        )?;
    }
    Ok(())
}

fn execute(command: &Command, config: &LabConfig) -> LabResult<()> {
    match command {
        Command::Simulate { json, .. } => run_simulate(config, *json),
        Command::Compare { json, .. } => run_compare(config, *json),
        Command::Entropy { .. } => {
            entropy::run(config.entropy.params(), &mut io::stdout().lock())?;
            Ok(())
        }
        Command::Cycles { .. } => {
            let scan = CycleScan::new(config.cycles.width, config.cycles.start, config.cycles.limit)?;
            cycles::run(scan, &mut io::stdout().lock())?;
            Ok(())
        }
        Command::List => run_list(),
        Command::Validate => {
            info!("Configuration validated successfully");
            Ok(())
        }
        Command::GenConfig { output } => {
            info!("Generating default configuration");
            config::write_toml(&LabConfig::default(), output)?;
            info!("Default configuration written to {:?}", output);
            Ok(())
        }
    }
}

/// Main entry point for the application.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut lab_config = ConfigLoader::new(cli.config.as_deref(), ENV_PREFIX)
        .load()
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?;
    apply_overrides(&cli.command, &mut lab_config);
    lab_config
        .validate()
        .context("Invalid command-line overrides")?;

    init_logging(&lab_config.log)?;
    set_error_reporter(Arc::new(TracingErrorReporter));

    if let Err(error) = execute(&cli.command, &lab_config) {
        let component = match &cli.command {
            Command::Simulate { .. } => "simulate",
            Command::Compare { .. } => "compare",
            Command::Entropy { .. } => "entropy",
            Command::Cycles { .. } => "cycles",
            Command::List => "list",
            Command::Validate => "validate",
            Command::GenConfig { .. } => "gen-config",
        };
        report_error(ErrorContext::new(error, component).with_span_trace());
        process::exit(1);
    }

    Ok(())
}
