//! Tests for the error module.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::data_structures::BitTableError;
use crate::error::config::ConfigError;
use crate::error::probe::ProbeError;
use crate::error::simulation::SimulationError;
use crate::error::{report_error, set_error_reporter, ErrorContext, ErrorReporter, LabError, TracingErrorReporter};

/// Test that error context can be created and displayed properly.
#[test]
fn test_error_context_display() {
    let error = LabError::Custom("test error".to_string());
    let context = ErrorContext::new(error, "test_component").with_details("additional details");

    let display_string = format!("{context}");
    assert!(display_string.contains("test error"));
    assert!(display_string.contains("test_component"));
    assert!(display_string.contains("additional details"));
}

/// Test that component errors convert and keep their messages.
#[test]
fn test_error_conversions() {
    let err: LabError = SimulationError::MissingProbeCount.into();
    assert_eq!(
        err.to_string(),
        "Simulation error: Must specify non-zero for either k or bits per key"
    );

    let err: LabError = ConfigError::ValidationError("bad".to_string()).into();
    assert!(matches!(err, LabError::Config(_)));

    let err: LabError = ProbeError::InvalidRangeBits(40).into();
    assert_eq!(err.to_string(), "Probe error: Range bits must be between 1 and 32, got 40");

    let err: SimulationError = BitTableError::ZeroSize.into();
    assert_eq!(err, SimulationError::Table(BitTableError::ZeroSize));

    let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: LabError = ProbeError::from(io_error).into();
    assert!(err.to_string().contains("pipe closed"));
}

/// Test the constraint classification used by comparisons.
#[test]
fn test_constraint_violation_classification() {
    let violation = SimulationError::TooManyProbes {
        algorithm: "cache-simd-fastrange32",
        k: 9,
        max: 8,
    };
    assert!(violation.is_constraint_violation());
    assert_eq!(violation.to_string(), "cache-simd-fastrange32 supports at most k=8, got k=9");
    assert!(!SimulationError::ZeroBits.is_constraint_violation());
    assert!(!SimulationError::NoKeys { bits: 1, k: 30 }.is_constraint_violation());
}

/// Counts reports.
#[derive(Debug, Default)]
struct CountingReporter {
    reported: AtomicUsize,
}

impl ErrorReporter for CountingReporter {
    fn report(&self, _context: ErrorContext) {
        self.reported.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test that the global error reporter receives reports.
///
/// This is the only test that installs a global reporter.
#[test]
fn test_global_error_reporter() {
    let reporter = Arc::new(CountingReporter::default());
    assert!(set_error_reporter(reporter.clone()));
    assert!(!set_error_reporter(Arc::new(TracingErrorReporter)));

    report_error(ErrorContext::new(LabError::Custom("test error".to_string()), "test_component"));

    assert_eq!(reporter.reported.load(Ordering::SeqCst), 1);
}

/// Test that the tracing reporter accepts a context with a span trace.
#[test]
fn test_tracing_error_reporter() {
    let context = ErrorContext::new(LabError::Custom("test error".to_string()), "test_component")
        .with_span_trace();
    // No ErrorLayer is installed in tests, so nothing is captured.
    assert!(context.trace.is_none());
    TracingErrorReporter.report(context);
}
