#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Value-iteration solvers for the Mouse Maze grid world.
//!
//! Both solvers run synchronous (Jacobi) sweeps over a double-buffered
//! utility field: every free cell reads its neighbours from the frozen
//! `current` buffer and writes into `next`, the buffers are swapped once the
//! sweep completes, and the loop stops when the largest free-cell change
//! drops below the configured threshold. [`solve_sequential`] walks the grid
//! in row-major order on the calling thread; [`solve_parallel`] partitions
//! each sweep by row across a rayon thread pool. They share the Bellman
//! update from [`mouse_maze_core::transition`] and therefore agree bit for
//! bit.

mod parallel;
mod sequential;

use std::num::NonZeroUsize;

use mouse_maze_core::{ConfigError, DiscountFactor, GridError, UtilityGrid, DEFAULT_TOLERANCE};
use thiserror::Error;
use tracing::{debug, trace, warn};

pub use parallel::{solve_parallel, solve_parallel_with_observer};
pub use sequential::{solve_sequential, solve_sequential_with_observer};

const DEFAULT_MAX_SWEEPS: u32 = 100_000;

/// Decides when a solve stops sweeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopRule {
    /// Stop after the first sweep whose largest change is below the threshold.
    #[default]
    Converged,
    /// Run exactly this many sweeps regardless of the observed changes.
    FixedSweeps(u32),
}

/// Tuning knobs shared by both solvers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    discount: DiscountFactor,
    tolerance: f64,
    max_sweeps: u32,
    stop: StopRule,
    threads: Option<NonZeroUsize>,
}

impl SolverConfig {
    /// Creates a configuration for the provided discount factor with default
    /// tolerance, sweep bound, and stop rule.
    pub fn new(gamma: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            discount: DiscountFactor::new(gamma)?,
            ..Self::default()
        })
    }

    /// Replaces the convergence tolerance epsilon.
    pub fn with_tolerance(self, tolerance: f64) -> Result<Self, ConfigError> {
        if tolerance.is_finite() && tolerance > 0.0 {
            Ok(Self { tolerance, ..self })
        } else {
            Err(ConfigError::NonPositiveTolerance(tolerance))
        }
    }

    /// Replaces the bound on sweeps attempted before giving up on convergence.
    pub fn with_max_sweeps(self, max_sweeps: u32) -> Result<Self, ConfigError> {
        if max_sweeps == 0 {
            return Err(ConfigError::ZeroSweepBudget);
        }
        Ok(Self { max_sweeps, ..self })
    }

    /// Replaces the stop rule.
    pub fn with_stop(self, stop: StopRule) -> Result<Self, ConfigError> {
        if stop == StopRule::FixedSweeps(0) {
            return Err(ConfigError::ZeroSweepBudget);
        }
        Ok(Self { stop, ..self })
    }

    /// Pins the parallel solver's pool to the provided number of workers.
    ///
    /// `None` lets rayon pick its default.
    #[must_use]
    pub fn with_threads(self, threads: Option<NonZeroUsize>) -> Self {
        Self { threads, ..self }
    }

    /// Discount factor applied to future utility.
    #[must_use]
    pub const fn discount(&self) -> DiscountFactor {
        self.discount
    }

    /// Convergence tolerance epsilon.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Largest number of sweeps attempted under [`StopRule::Converged`].
    #[must_use]
    pub const fn max_sweeps(&self) -> u32 {
        self.max_sweeps
    }

    /// Active stop rule.
    #[must_use]
    pub const fn stop(&self) -> StopRule {
        self.stop
    }

    /// Worker count requested for the parallel solver.
    #[must_use]
    pub const fn threads(&self) -> Option<NonZeroUsize> {
        self.threads
    }

    /// Largest per-cell change that still counts as converged.
    #[must_use]
    pub fn convergence_threshold(&self) -> f64 {
        self.discount.convergence_threshold(self.tolerance)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            discount: DiscountFactor::default(),
            tolerance: DEFAULT_TOLERANCE,
            max_sweeps: DEFAULT_MAX_SWEEPS,
            stop: StopRule::Converged,
            threads: None,
        }
    }
}

/// Failures that stop a solve from returning utilities.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The sweep bound was reached before the threshold test passed.
    #[error("value iteration did not converge within {sweeps} sweeps (last change {max_delta:e})")]
    DidNotConverge {
        /// Sweeps performed before giving up.
        sweeps: u32,
        /// Largest change observed in the final sweep.
        max_delta: f64,
    },
    /// The worker pool for the parallel solver could not be created.
    #[error("failed to build solver thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// The solved buffer could not be wrapped as a utility grid.
    #[error("solved utilities do not match the reward grid")]
    Grid(#[from] GridError),
}

/// Progress report emitted after every sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepReport {
    /// One-based index of the sweep that just completed.
    pub sweep: u32,
    /// Largest absolute change over free cells during the sweep.
    pub max_delta: f64,
}

/// Result of a completed solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    utilities: UtilityGrid,
    sweeps: u32,
    max_delta: f64,
}

impl Solution {
    /// Converged utility field.
    #[must_use]
    pub fn utilities(&self) -> &UtilityGrid {
        &self.utilities
    }

    /// Number of sweeps performed.
    #[must_use]
    pub const fn sweeps(&self) -> u32 {
        self.sweeps
    }

    /// Largest free-cell change observed in the final sweep.
    #[must_use]
    pub const fn max_delta(&self) -> f64 {
        self.max_delta
    }

    /// Consumes the solution, yielding the utility field.
    #[must_use]
    pub fn into_utilities(self) -> UtilityGrid {
        self.utilities
    }
}

#[derive(Clone, Copy, Debug)]
struct SweepSummary {
    sweeps: u32,
    max_delta: f64,
}

impl SweepSummary {
    fn into_solution(self, utilities: UtilityGrid) -> Solution {
        Solution {
            utilities,
            sweeps: self.sweeps,
            max_delta: self.max_delta,
        }
    }
}

/// Drives sweeps until the stop rule is satisfied.
///
/// `sweep` performs one full sweep, swaps the buffers, and returns the largest
/// free-cell change it observed.
fn run_sweeps<S, F>(
    config: &SolverConfig,
    mut observer: F,
    mut sweep: S,
) -> Result<SweepSummary, SolveError>
where
    S: FnMut() -> f64,
    F: FnMut(SweepReport),
{
    let threshold = config.convergence_threshold();
    let mut sweeps: u32 = 0;

    loop {
        let max_delta = sweep();
        sweeps = sweeps.saturating_add(1);
        trace!(sweep = sweeps, max_delta, "sweep complete");
        observer(SweepReport {
            sweep: sweeps,
            max_delta,
        });

        match config.stop {
            StopRule::Converged => {
                if max_delta < threshold {
                    debug!(sweeps, max_delta, threshold, "value iteration converged");
                    return Ok(SweepSummary { sweeps, max_delta });
                }
                if sweeps >= config.max_sweeps {
                    warn!(sweeps, max_delta, threshold, "value iteration hit sweep bound");
                    return Err(SolveError::DidNotConverge { sweeps, max_delta });
                }
            }
            StopRule::FixedSweeps(limit) => {
                if sweeps >= limit {
                    debug!(sweeps, max_delta, "fixed sweep budget exhausted");
                    return Ok(SweepSummary { sweeps, max_delta });
                }
            }
        }
    }
}
