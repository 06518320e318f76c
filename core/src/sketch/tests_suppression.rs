//! Tests for soft-disabling constraints through the active flag

use crate::geometry::Point2;
use crate::id::ConstraintId;
use crate::sketch::constraints::{Fixed, Horizontal, SketchConstraint};
use crate::sketch::types::{Sketch, SketchError};

/// An inactive Horizontal constraint does not touch geometry
#[test]
fn test_inactive_constraint_ignored() {
    let mut sketch = Sketch::new();
    let line = sketch.entities.add_line_between([0.0, 0.0], [10.0, 5.0]);
    let horizontal = Horizontal::for_line(sketch.entities.line(line).unwrap());

    let added = sketch.push_constraint(SketchConstraint::inactive(horizontal));
    assert!(added.converged);

    let (start, end) = sketch.entities.line_endpoints(line).unwrap();
    assert!((start.y - end.y).abs() > 0.1, "Line should stay diagonal, y1={}, y2={}", start.y, end.y);
    assert_eq!(sketch.active_constraints().count(), 0);
    assert_eq!(sketch.constraints().len(), 1);
}

/// Re-activating a constraint brings it back into the next solve
#[test]
fn test_toggle_restores_constraint() {
    let mut sketch = Sketch::new();
    let line = sketch.entities.add_line_between([0.0, 0.0], [10.0, 5.0]);
    let horizontal = Horizontal::for_line(sketch.entities.line(line).unwrap());
    let id = sketch.push_constraint(SketchConstraint::inactive(horizontal)).id;

    assert_eq!(sketch.toggle_constraint(id), Ok(true));
    assert!(sketch.solve());

    let (start, end) = sketch.entities.line_endpoints(line).unwrap();
    assert_eq!(start.y, 2.5);
    assert_eq!(end.y, 2.5);

    assert_eq!(sketch.toggle_constraint(id), Ok(false));
    assert!(!sketch.constraint(id).unwrap().is_active());
}

/// Disabling one of two contradictory pins lets the sketch converge
#[test]
fn test_disable_breaks_conflict() {
    let mut sketch = Sketch::new();
    let p = sketch.entities.add_point(0.0, 0.0);
    sketch.add_constraint(Fixed::new(p, [0.0, 0.0]).unwrap());
    let second = sketch.add_constraint(Fixed::new(p, [10.0, 0.0]).unwrap());
    assert!(!second.converged);

    sketch.set_constraint_active(second.id, false).unwrap();
    assert!(sketch.solve());
    assert_eq!(sketch.entities.position(p).unwrap(), Point2::new(0.0, 0.0));

    let analysis = sketch.analyze();
    assert_eq!(analysis.total_constraints, 2);
    assert_eq!(analysis.active_constraints, 1);
}

#[test]
fn test_unknown_constraint_is_an_error() {
    let mut sketch = Sketch::new();
    let id = ConstraintId::new_deterministic("missing");
    assert_eq!(sketch.set_constraint_active(id, false), Err(SketchError::UnknownConstraint(id)));
    assert_eq!(sketch.toggle_constraint(id), Err(SketchError::UnknownConstraint(id)));
}
