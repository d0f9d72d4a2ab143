//! Mock fuzz runner.
//!
//! Each target variable gets a fixed number of uniform random byte draws; the
//! sentinel byte counts as a simulated crash. The target code itself is never
//! executed. Around the loop the runner records wall-clock time plus the CPU
//! and resident-memory deltas reported by a [`ResourceProbe`].

use std::time::Instant;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::services::probe::ResourceProbe;

/// Iterations per variable when the caller does not choose.
pub const DEFAULT_ITERATIONS: u32 = 100;

/// Byte value treated as a simulated crash.
pub const CRASH_SENTINEL: u8 = 13;

/// Statistics for one fuzzed variable.
///
/// Field names are part of the persisted report format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzStat {
    pub variable: String,
    pub iterations: u32,
    /// Simulated crashes.
    pub errors: u32,
    /// Wall-clock seconds.
    pub duration: f64,
    /// Resident memory delta in KB; may be negative.
    pub memory_kb: f64,
    /// User + system CPU seconds.
    pub cpu_time: f64,
}

/// Runs the mock fuzz loop with an injected resource probe.
pub struct FuzzRunner<'a> {
    probe: &'a dyn ResourceProbe,
    iterations: u32,
}

impl<'a> FuzzRunner<'a> {
    pub fn new(probe: &'a dyn ResourceProbe) -> Self {
        Self { probe, iterations: DEFAULT_ITERATIONS }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Fuzz one variable using the thread-local RNG.
    pub fn fuzz_variable(&self, variable: &str) -> FuzzStat {
        self.fuzz_variable_with(&mut rand::thread_rng(), variable)
    }

    /// Fuzz one variable drawing bytes from `rng`.
    pub fn fuzz_variable_with<R: Rng + ?Sized>(&self, rng: &mut R, variable: &str) -> FuzzStat {
        let before = self.probe.snapshot();
        let start = Instant::now();

        let mut errors = 0u32;
        for _ in 0..self.iterations {
            let value: u8 = rng.gen();
            if value == CRASH_SENTINEL {
                errors += 1;
            }
        }

        let duration = start.elapsed().as_secs_f64();
        let delta = self.probe.snapshot().since(&before);

        let stat = FuzzStat {
            variable: variable.to_string(),
            iterations: self.iterations,
            errors,
            duration,
            memory_kb: delta.memory_kb,
            cpu_time: delta.cpu_time,
        };
        debug!(
            "fuzzed {}: {} iterations, {} errors, {:.6}s, {:.1} KB, {:.6}s cpu",
            stat.variable, stat.iterations, stat.errors, stat.duration, stat.memory_kb, stat.cpu_time
        );
        stat
    }

    /// Fuzz every target in order; duplicates are fuzzed again.
    pub fn fuzz_targets(&self, targets: &[String]) -> Vec<FuzzStat> {
        let mut rng = rand::thread_rng();
        targets.iter().map(|t| self.fuzz_variable_with(&mut rng, t)).collect()
    }
}
