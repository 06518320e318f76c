use super::constraints::{Constraint, ConstraintKind, SketchConstraint};
use super::enhanced::{ConstraintAnalysis, EnhancedSolver, SolveResult};
use super::entities::{EntityKind, EntityStore, PointId};
use super::solver::{SketchSolver, SolverConfig};
use crate::id::ConstraintId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SketchError {
    #[error("Polygon needs between 3 and 25 vertices, got {count}")]
    InvalidPolygon { count: usize },
    #[error("Polygon radius must be positive, got {0}")]
    InvalidPolygonRadius(f64),
    #[error("Radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),
    #[error("Unknown point {0:?}")]
    UnknownPoint(PointId),
    #[error("Unknown constraint {0}")]
    UnknownConstraint(ConstraintId),
    #[error("{kind} does not support a {first}/{second} pair")]
    UnsupportedPair { kind: ConstraintKind, first: EntityKind, second: EntityKind },
    #[error("{kind} needs at least 2 points, got {count}")]
    TooFewPoints { kind: ConstraintKind, count: usize },
    #[error("{kind} target must be finite, got {value}")]
    InvalidTarget { kind: ConstraintKind, value: f64 },
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

pub type SketchResult<T> = Result<T, SketchError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchOperation {
    AddConstraint { id: ConstraintId, kind: ConstraintKind },
    RemoveConstraint { id: ConstraintId, kind: ConstraintKind },
}

impl SketchOperation {
    /// Label shown in undo/redo menus.
    pub fn description(&self) -> String {
        match self {
            Self::AddConstraint { kind, .. } => format!("Add Constraint ({})", kind),
            Self::RemoveConstraint { kind, .. } => format!("Remove Constraint ({})", kind),
        }
    }
}

/// Outcome of [`Sketch::add_constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintAdded {
    pub id: ConstraintId,
    /// Whether the solve pass run right after adding converged.
    pub converged: bool,
}

/// Entities plus the constraints over them.
#[derive(Debug)]
pub struct Sketch {
    pub entities: EntityStore,
    constraints: Vec<SketchConstraint>,
    pub history: Vec<SketchOperation>,
    /// Used by [`Sketch::solve`] and the solve run on every add.
    config: SolverConfig,
    /// Used by [`Sketch::solve_enhanced`].
    enhanced_config: SolverConfig,
}

impl Default for Sketch {
    fn default() -> Self {
        Self {
            entities: EntityStore::default(),
            constraints: Vec::new(),
            history: Vec::new(),
            config: SolverConfig::basic(),
            enhanced_config: SolverConfig::enhanced(),
        }
    }
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the basic configuration. The enhanced one keeps its defaults.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn with_enhanced_config(mut self, config: SolverConfig) -> Self {
        self.enhanced_config = config;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn enhanced_config(&self) -> &SolverConfig {
        &self.enhanced_config
    }

    /// Adds an active constraint and immediately runs a basic solve pass.
    pub fn add_constraint(&mut self, constraint: impl Constraint + 'static) -> ConstraintAdded {
        self.push_constraint(SketchConstraint::new(constraint))
    }

    /// Same as [`Sketch::add_constraint`] for an already wrapped entry, keeping its id and active flag.
    pub fn push_constraint(&mut self, entry: SketchConstraint) -> ConstraintAdded {
        let (id, kind) = (entry.id(), entry.kind());
        self.constraints.push(entry);
        self.history.push(SketchOperation::AddConstraint { id, kind });
        let converged = self.solve();
        debug!(%id, %kind, converged, "added constraint");
        ConstraintAdded { id, converged }
    }

    /// Removes a constraint. Geometry is left where the last solve put it.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> SketchResult<SketchConstraint> {
        let index = self.index_of(id)?;
        let removed = self.constraints.remove(index);
        self.history.push(SketchOperation::RemoveConstraint { id, kind: removed.kind() });
        debug!(%id, kind = %removed.kind(), "removed constraint");
        Ok(removed)
    }

    pub fn set_constraint_active(&mut self, id: ConstraintId, active: bool) -> SketchResult<()> {
        let index = self.index_of(id)?;
        self.constraints[index].active = active;
        Ok(())
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_constraint(&mut self, id: ConstraintId) -> SketchResult<bool> {
        let index = self.index_of(id)?;
        let entry = &mut self.constraints[index];
        entry.active = !entry.active;
        Ok(entry.active)
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&SketchConstraint> {
        self.constraints.iter().find(|c| c.id() == id)
    }

    pub fn constraints(&self) -> &[SketchConstraint] {
        &self.constraints
    }

    pub fn active_constraints(&self) -> impl Iterator<Item = &SketchConstraint> {
        self.constraints.iter().filter(|c| c.is_active())
    }

    /// Basic relaxation with this sketch's configuration.
    pub fn solve(&mut self) -> bool {
        SketchSolver::solve(&self.constraints, &mut self.entities, &self.config)
    }

    /// Enhanced relaxation with this sketch's enhanced configuration.
    pub fn solve_enhanced(&mut self) -> SolveResult {
        EnhancedSolver::solve(&self.constraints, &mut self.entities, &self.enhanced_config)
    }

    pub fn analyze(&self) -> ConstraintAnalysis {
        EnhancedSolver::analyze(&self.constraints, &self.entities)
    }

    fn index_of(&self, id: ConstraintId) -> SketchResult<usize> {
        self.constraints
            .iter()
            .position(|c| c.id() == id)
            .ok_or(SketchError::UnknownConstraint(id))
    }
}
