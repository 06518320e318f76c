pub mod constraints;
pub mod enhanced;
pub mod entities;
pub mod solver;
pub mod types;

pub use constraints::{Constraint, ConstraintKind, SketchConstraint};
pub use enhanced::{ConstraintAnalysis, EnhancedSolver, SolveResult};
pub use entities::{
    Arc, ArcId, Circle, CircleId, CurveRef, EntityKind, EntityRef, EntityStore, Line, LineId, Point, PointId, Polygon,
    PolygonId,
};
pub use solver::{SketchSolver, SolverConfig};
pub use types::{ConstraintAdded, Sketch, SketchError, SketchOperation, SketchResult};

#[cfg(test)]
mod tests_solver;




#[cfg(test)]
mod tests_symmetry;


#[cfg(test)]
mod tests_suppression;
