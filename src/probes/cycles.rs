//! Multiplicative cycle scan.
//!
//! Worm hashing carries the low word of `h * m` forward, so with a fixed
//! range `m` the carried values cycle exactly when `m^i == 1 (mod 2^w)` for
//! some `i <= k`. The scan lists every such `m` for `2 <= i <= 32`.

use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::probe::ProbeError;

/// Largest power checked for each multiplier.
pub const MAX_POWER: u32 = 32;

/// Every 2^35 multipliers in the 64-bit scan, a progress marker is emitted.
const PROGRESS_MASK: u64 = 0x7_ffff_ffff;

/// First power of `multiplier` in `2..=k` that wraps to 0 or 1 modulo 2^64,
/// reported as the number of multiplications after the first.
///
/// A run whose `m_odd` cycles like this repeats probe positions within a
/// single key.
pub fn cycle_after(multiplier: u64, k: u32) -> Option<u32> {
    let mut p = multiplier;
    for i in 1..k {
        p = p.wrapping_mul(multiplier);
        if p <= 1 {
            return Some(i);
        }
    }
    None
}

/// Word size of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum WordWidth {
    #[value(name = "32")]
    #[serde(rename = "32")]
    W32,
    #[value(name = "64")]
    #[serde(rename = "64")]
    W64,
}

impl WordWidth {
    /// Width in bits.
    pub fn bits(self) -> u32 {
        match self {
            WordWidth::W32 => 32,
            WordWidth::W64 => 64,
        }
    }
}

impl fmt::Display for WordWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// `multiplier^power == 1 (mod 2^width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleFinding {
    /// Odd multiplier examined
    pub multiplier: u64,
    /// Smallest power in `2..=MAX_POWER` that reaches 1
    pub power: u32,
    /// Word the arithmetic wraps in
    pub width: WordWidth,
}

impl fmt::Display for CycleFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:x} ** {} === 1 (mod 2**{})",
            self.multiplier, self.power, self.width
        )
    }
}

/// Something worth printing during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    Finding(CycleFinding),
    /// The scan passed a multiple of 2^35 multipliers, which as a Bloom
    /// filter size in bits is this many gigabytes.
    Progress(u64),
}

impl fmt::Display for CycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleEvent::Finding(finding) => finding.fmt(f),
            CycleEvent::Progress(gigabytes) => write!(f, "({gigabytes}GB Bloom filter)"),
        }
    }
}

/// Smallest `i` in `2..=MAX_POWER` with `v^i == 1 (mod 2^32)`.
fn power_to_one_32(v: u32) -> Option<u32> {
    let mut p = v;
    (2..=MAX_POWER).find(|_| {
        p = p.wrapping_mul(v);
        p == 1
    })
}

/// Smallest `i` in `2..=MAX_POWER` with `v^i == 1 (mod 2^64)`.
fn power_to_one_64(v: u64) -> Option<u32> {
    let mut p = v;
    (2..=MAX_POWER).find(|_| {
        p = p.wrapping_mul(v);
        p == 1
    })
}

/// Iterator over the events of a scan.
///
/// The 32-bit scan covers every multiplier in `start..end`. The 64-bit scan
/// covers odd multipliers only, since even ones can never reach 1.
#[derive(Debug, Clone)]
pub struct CycleScan {
    width: WordWidth,
    next: u64,
    end: u64,
    done: bool,
    pending: Option<CycleEvent>,
}

impl CycleScan {
    /// Scan `start..limit`. Without a start the scan begins at 1; without a
    /// limit it runs to the end of the word.
    pub fn new(width: WordWidth, start: Option<u64>, limit: Option<u64>) -> Result<Self, ProbeError> {
        let word_end = match width {
            WordWidth::W32 => 1 << 32,
            WordWidth::W64 => u64::MAX,
        };
        let start = start.unwrap_or(1);
        let start = match width {
            WordWidth::W32 => start,
            WordWidth::W64 => start | 1,
        };
        let end = limit.map_or(word_end, |limit| limit.min(word_end));
        if start >= end {
            return Err(ProbeError::EmptyRange { start, end });
        }
        debug!(%width, start, end, "Cycle scan range");

        Ok(Self {
            width,
            next: start,
            end,
            done: false,
            pending: None,
        })
    }

    /// The next multiplier that will be examined, if any.
    pub fn position(&self) -> Option<u64> {
        (!self.done).then_some(self.next)
    }

    fn advance(&mut self) {
        let step = match self.width {
            WordWidth::W32 => 1,
            WordWidth::W64 => 2,
        };
        match self.next.checked_add(step) {
            Some(next) if next < self.end => self.next = next,
            _ => self.done = true,
        }
    }
}

impl Iterator for CycleScan {
    type Item = CycleEvent;

    fn next(&mut self) -> Option<CycleEvent> {
        if let Some(event) = self.pending.take() {
            return Some(event);
        }
        while !self.done {
            let v = self.next;
            self.advance();

            let power = match self.width {
                WordWidth::W32 => power_to_one_32(v as u32),
                WordWidth::W64 => power_to_one_64(v),
            };
            let progress = (self.width == WordWidth::W64 && v & PROGRESS_MASK == 1)
                .then_some(CycleEvent::Progress(v >> 33));

            if let Some(power) = power {
                self.pending = progress;
                return Some(CycleEvent::Finding(CycleFinding {
                    multiplier: v,
                    power,
                    width: self.width,
                }));
            }
            if progress.is_some() {
                return progress;
            }
        }
        None
    }
}

/// Run a scan, writing one line per event. Returns the number of findings.
pub fn run(scan: CycleScan, out: &mut impl Write) -> Result<u64, ProbeError> {
    info!(width = %scan.width, start = ?scan.position(), end = scan.end, "Starting cycle scan");
    let mut findings = 0u64;
    for event in scan {
        if matches!(event, CycleEvent::Finding(_)) {
            findings += 1;
        }
        writeln!(out, "{event}")?;
        out.flush()?;
    }
    info!(findings, "Cycle scan finished");
    Ok(findings)
}
