//! Geometric constraints between sketch entities.
//!
//! Every constraint exposes the same two-sided contract:
//! `error()` measures how far the current geometry is from satisfying it
//! (non-negative, never mutates), and `solve()` applies one local corrective
//! step. Steps are mostly half-steps (successive under-relaxation); `Fixed`,
//! `Radius` and `Midpoint` snap, and the averaging constraints move all
//! participants to a shared target in one go.

mod coincident;
mod curves;
mod lines;
mod points;

pub use coincident::{Coincidence, Coincident};
pub use curves::{Concentric, EqualLength, Equality, Radius, Tangency, Tangent};
pub use lines::{Angle, AngleUnit, Parallel, Perpendicular, Symmetric};
pub use points::{Collinear, Fixed, Horizontal, Midpoint, Vertical};

use super::entities::{EntityRef, EntityStore};
use crate::id::ConstraintId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    Fixed,
    Horizontal,
    Vertical,
    Coincident,
    Collinear,
    Concentric,
    Parallel,
    Perpendicular,
    Tangent,
    EqualLength,
    Radius,
    Midpoint,
    Angle,
    Symmetric,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "FIXED",
            Self::Horizontal => "HORIZONTAL",
            Self::Vertical => "VERTICAL",
            Self::Coincident => "COINCIDENT",
            Self::Collinear => "COLLINEAR",
            Self::Concentric => "CONCENTRIC",
            Self::Parallel => "PARALLEL",
            Self::Perpendicular => "PERPENDICULAR",
            Self::Tangent => "TANGENT",
            Self::EqualLength => "EQUAL_LENGTH",
            Self::Radius => "RADIUS",
            Self::Midpoint => "MIDPOINT",
            Self::Angle => "ANGLE",
            Self::Symmetric => "SYMMETRIC",
        };
        f.write_str(name)
    }
}

/// One geometric relationship over entities in an [`EntityStore`].
///
/// Implementors hold only entity keys and scalar parameters. Keys that no longer
/// resolve make `error()` return `0.0` and `solve()` do nothing.
pub trait Constraint: fmt::Debug {
    fn kind(&self) -> ConstraintKind;

    /// Violation magnitude, `>= 0`. Must not mutate anything.
    fn error(&self, store: &EntityStore) -> f64;

    /// One corrective step that reduces (not necessarily zeroes) `error()`.
    fn solve(&self, store: &mut EntityStore);

    /// Entities this constraint reads and writes.
    fn references(&self) -> Vec<EntityRef>;
}

/// A constraint as it lives in a sketch: identity, soft-disable flag and the variant.
#[derive(Debug)]
pub struct SketchConstraint {
    id: ConstraintId,
    /// Inactive constraints stay in the collection but are skipped by the solvers.
    pub active: bool,
    constraint: Box<dyn Constraint>,
}

impl SketchConstraint {
    pub fn new(constraint: impl Constraint + 'static) -> Self {
        Self { id: ConstraintId::new(), active: true, constraint: Box::new(constraint) }
    }

    pub fn inactive(constraint: impl Constraint + 'static) -> Self {
        Self { active: false, ..Self::new(constraint) }
    }

    pub fn with_id(mut self, id: ConstraintId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn kind(&self) -> ConstraintKind {
        self.constraint.kind()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn error(&self, store: &EntityStore) -> f64 {
        self.constraint.error(store)
    }

    pub fn solve(&self, store: &mut EntityStore) {
        self.constraint.solve(store)
    }

    pub fn references(&self) -> Vec<EntityRef> {
        self.constraint.references()
    }

    pub fn constraint(&self) -> &dyn Constraint {
        self.constraint.as_ref()
    }
}

impl<C: Constraint + 'static> From<C> for SketchConstraint {
    fn from(constraint: C) -> Self {
        Self::new(constraint)
    }
}
