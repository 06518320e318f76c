use crate::geometry::Point2;
use crate::sketch::constraints::{Constraint, Fixed, SketchConstraint, Symmetric};
use crate::sketch::entities::EntityStore;
use crate::sketch::solver::{SketchSolver, SolverConfig};
use approx::assert_abs_diff_eq;

#[test]
fn test_symmetry_vertical_axis() {
    let mut store = EntityStore::new();
    let axis = store.add_line_between([5.0, 0.0], [5.0, 10.0]);
    let axis_line = *store.line(axis).unwrap();
    let p1 = store.add_point(0.0, 5.0);
    // Should be at (10, 5) to mirror p1
    let p2 = store.add_point(8.0, 5.0);

    let constraints: Vec<SketchConstraint> = vec![
        Fixed::new(axis_line.start, [5.0, 0.0]).unwrap().into(),
        Fixed::new(axis_line.end, [5.0, 10.0]).unwrap().into(),
        Symmetric::new(p1, p2, axis).into(),
    ];

    assert!(SketchSolver::solve(&constraints, &mut store, &SolverConfig::default()));

    // Pair slides so the midpoint sits on x = 5 and keeps its separation.
    let pos1 = store.position(p1).unwrap();
    let pos2 = store.position(p2).unwrap();
    assert_abs_diff_eq!((pos1.x + pos2.x) * 0.5, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pos1.x, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pos2.x, 9.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pos1.y, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pos2.y, 5.0, epsilon = 1e-9);
}

#[test]
fn test_symmetry_turns_pair_perpendicular_to_axis() {
    let mut store = EntityStore::new();
    let axis = store.add_line_between([0.0, 0.0], [10.0, 0.0]);
    let p1 = store.add_point(2.0, 1.0);
    let p2 = store.add_point(4.0, -3.0);
    let c = Symmetric::new(p1, p2, axis);
    assert!(c.error(&store) > 1.0);

    c.solve(&mut store);

    let pos1 = store.position(p1).unwrap();
    let pos2 = store.position(p2).unwrap();
    let half = 5.0_f64.sqrt();
    assert_abs_diff_eq!(pos1.x, 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pos1.y, half, epsilon = 1e-12);
    assert_abs_diff_eq!(pos2.x, 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pos2.y, -half, epsilon = 1e-12);
    assert!(c.error(&store) < 1e-9);

    // The axis is a reference only.
    assert_eq!(store.line_endpoints(axis).unwrap(), (Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));
}

#[test]
fn test_alignment_weighs_more_than_offset() {
    let mut store = EntityStore::new();
    let axis = store.add_line_between([0.0, 0.0], [0.0, 10.0]);
    // Midpoint on the axis but pair lying along it
    let p1 = store.add_point(0.0, 2.0);
    let p2 = store.add_point(0.0, 4.0);
    let c = Symmetric::new(p1, p2, axis);
    assert_abs_diff_eq!(c.error(&store), 10.0, epsilon = 1e-12);
}

#[test]
fn test_collapsed_axis_is_a_no_op() {
    let mut store = EntityStore::new();
    let axis = store.add_line_between([1.0, 1.0], [1.0, 1.0]);
    let p1 = store.add_point(4.0, 5.0);
    let p2 = store.add_point(4.0, 5.0);
    let c = Symmetric::new(p1, p2, axis);

    // Distance from the midpoint to the axis start.
    assert_eq!(c.error(&store), 5.0);
    c.solve(&mut store);
    assert_eq!(store.position(p1).unwrap(), Point2::new(4.0, 5.0));
}
