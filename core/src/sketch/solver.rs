//! Basic relaxation driver.
//!
//! Each iteration walks the active constraints in collection order, measuring
//! each one and then letting it apply its correction. Corrections made earlier
//! in a pass are visible to later constraints in the same pass (Gauss-Seidel
//! ordering), including to their measured error.

use super::constraints::SketchConstraint;
use super::entities::EntityStore;
use super::types::{SketchError, SketchResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

pub const BASIC_TOLERANCE: f64 = 1e-4;
pub const ENHANCED_TOLERANCE: f64 = 1e-6;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Convergence tolerance and iteration budget for one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl SolverConfig {
    pub fn new(tolerance: f64, max_iterations: usize) -> SketchResult<Self> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(SketchError::InvalidConfig(format!("tolerance must be positive and finite, got {}", tolerance)));
        }
        if max_iterations == 0 {
            return Err(SketchError::InvalidConfig("max_iterations must be at least 1".to_string()));
        }
        Ok(Self { tolerance, max_iterations })
    }

    pub fn basic() -> Self {
        Self { tolerance: BASIC_TOLERANCE, max_iterations: DEFAULT_MAX_ITERATIONS }
    }

    pub fn enhanced() -> Self {
        Self { tolerance: ENHANCED_TOLERANCE, max_iterations: DEFAULT_MAX_ITERATIONS }
    }

    pub fn with_tolerance(self, tolerance: f64) -> SketchResult<Self> {
        Self::new(tolerance, self.max_iterations)
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> SketchResult<Self> {
        Self::new(self.tolerance, max_iterations)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::basic()
    }
}

/// `|error|` of one constraint. NaN reads as infinitely violated so it can
/// never satisfy a tolerance check.
pub(crate) fn measured_error(constraint: &SketchConstraint, store: &EntityStore) -> f64 {
    let error = constraint.error(store).abs();
    if error.is_nan() {
        f64::INFINITY
    } else {
        error
    }
}

/// Largest error over the active constraints, `0.0` when none are active.
pub(crate) fn max_active_error(constraints: &[SketchConstraint], store: &EntityStore) -> f64 {
    constraints
        .iter()
        .filter(|c| c.is_active())
        .map(|c| measured_error(c, store))
        .fold(0.0, f64::max)
}

/// Error totals gathered during one relaxation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PassErrors {
    pub max: f64,
    pub total: f64,
}

/// Measures then corrects each active constraint in turn.
pub(crate) fn relaxation_pass(constraints: &[SketchConstraint], store: &mut EntityStore) -> PassErrors {
    let mut errors = PassErrors::default();
    for constraint in constraints.iter().filter(|c| c.is_active()) {
        let error = measured_error(constraint, store);
        errors.max = errors.max.max(error);
        errors.total += error;
        constraint.solve(store);
    }
    errors
}

/// One correction pass over the active constraints, in order, without measuring.
pub(crate) fn correction_pass(constraints: &[SketchConstraint], store: &mut EntityStore) {
    for constraint in constraints.iter().filter(|c| c.is_active()) {
        constraint.solve(store);
    }
}

pub struct SketchSolver;

impl SketchSolver {
    /// Iterates until the largest error seen during a pass drops below
    /// `config.tolerance`, or the budget runs out. Returns whether it converged.
    ///
    /// An already satisfied system converges on the first pass.
    pub fn solve(constraints: &[SketchConstraint], store: &mut EntityStore, config: &SolverConfig) -> bool {
        if constraints.is_empty() {
            return true;
        }

        for iteration in 1..=config.max_iterations {
            let errors = relaxation_pass(constraints, store);
            trace!(iteration, max_error = errors.max, total_error = errors.total, "basic solver pass");

            if errors.max < config.tolerance {
                debug!(iterations = iteration, max_error = errors.max, "basic solver converged");
                return true;
            }
        }

        warn!(
            max_iterations = config.max_iterations,
            max_error = max_active_error(constraints, store),
            "basic solver did not converge"
        );
        false
    }
}
