//! Enhanced relaxation driver.
//!
//! Same sequential local corrections as [`SketchSolver`](super::solver::SketchSolver),
//! with a result report, a stall-escape pass and a read-only health check.
//! No system of equations is assembled.

use super::constraints::SketchConstraint;
use super::entities::EntityStore;
use super::solver::{correction_pass, max_active_error, measured_error, relaxation_pass, SolverConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A single constraint above this error is reported as an issue.
pub const LARGE_ERROR_THRESHOLD: f64 = 1e3;
/// At or above this maximum error the system is flagged inconsistent.
pub const INCONSISTENT_ERROR_THRESHOLD: f64 = 1e6;
/// More active constraints than this is reported as a convergence risk.
pub const MANY_CONSTRAINTS_THRESHOLD: usize = 50;

/// Fraction of the tolerance below which a change in total error counts as a stall.
const STALL_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub converged: bool,
    /// Passes performed, 1-based. `0` for an empty collection.
    pub iterations: usize,
    /// Largest active error seen in the final pass, or recomputed after exhaustion.
    pub final_error: f64,
    pub message: String,
}

/// Read-only health report of a constraint collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintAnalysis {
    pub total_constraints: usize,
    pub active_constraints: usize,
    pub total_error: f64,
    pub max_error: f64,
    /// Heuristic only. Not a proof that the system is satisfiable.
    pub is_consistent: bool,
    pub issues: Vec<String>,
}

pub struct EnhancedSolver;

impl EnhancedSolver {
    /// Solves with the enhanced defaults (tolerance 1e-6, 100 passes).
    pub fn solve_default(constraints: &[SketchConstraint], store: &mut EntityStore) -> SolveResult {
        Self::solve(constraints, store, &SolverConfig::enhanced())
    }

    /// Runs relaxation passes until the largest error is within `config.tolerance`.
    ///
    /// When the summed error changes by less than a tenth of the tolerance between
    /// two passes, one extra correction pass runs straight away without re-measuring.
    pub fn solve(constraints: &[SketchConstraint], store: &mut EntityStore, config: &SolverConfig) -> SolveResult {
        if constraints.is_empty() {
            return SolveResult {
                converged: true,
                iterations: 0,
                final_error: 0.0,
                message: "No constraints to solve".to_string(),
            };
        }

        let mut previous_total: Option<f64> = None;

        for iteration in 1..=config.max_iterations {
            let errors = relaxation_pass(constraints, store);
            trace!(iteration, max_error = errors.max, total_error = errors.total, "enhanced solver pass");

            if errors.max <= config.tolerance {
                debug!(iterations = iteration, max_error = errors.max, "enhanced solver converged");
                return SolveResult {
                    converged: true,
                    iterations: iteration,
                    final_error: errors.max,
                    message: format!("Converged after {} iterations", iteration),
                };
            }

            if let Some(previous) = previous_total {
                if (errors.total - previous).abs() < config.tolerance * STALL_FRACTION {
                    debug!(iteration, total_error = errors.total, "progress stalled, running extra correction pass");
                    correction_pass(constraints, store);
                }
            }
            previous_total = Some(errors.total);
        }

        let final_error = max_active_error(constraints, store);
        warn!(max_iterations = config.max_iterations, final_error, "enhanced solver did not converge");
        SolveResult {
            converged: false,
            iterations: config.max_iterations,
            final_error,
            message: "Maximum iterations reached without convergence".to_string(),
        }
    }

    /// Measures every active constraint without moving anything.
    pub fn analyze(constraints: &[SketchConstraint], store: &EntityStore) -> ConstraintAnalysis {
        let mut active_constraints = 0;
        let mut total_error = 0.0;
        let mut max_error: f64 = 0.0;
        let mut issues = Vec::new();

        for constraint in constraints.iter().filter(|c| c.is_active()) {
            active_constraints += 1;
            let error = measured_error(constraint, store);
            total_error += error;
            max_error = max_error.max(error);

            if error > LARGE_ERROR_THRESHOLD {
                issues.push(format!(
                    "Large constraint error detected: {} {} error {}",
                    constraint.kind(),
                    constraint.id(),
                    error
                ));
            }
        }

        let mut is_consistent = max_error < INCONSISTENT_ERROR_THRESHOLD;

        if active_constraints == 0 && !constraints.is_empty() {
            issues.push("All constraints are inactive".to_string());
            is_consistent = false;
        }

        if active_constraints > MANY_CONSTRAINTS_THRESHOLD {
            issues.push("Large number of active constraints may cause convergence issues".to_string());
        }

        ConstraintAnalysis {
            total_constraints: constraints.len(),
            active_constraints,
            total_error,
            max_error,
            is_consistent,
            issues,
        }
    }
}
