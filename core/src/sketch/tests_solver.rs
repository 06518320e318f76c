use crate::geometry::Point2;
use crate::sketch::constraints::{Constraint, ConstraintKind, Fixed, Horizontal, Midpoint, Parallel, Radius, SketchConstraint, Vertical};
use crate::sketch::entities::EntityStore;
use crate::sketch::solver::{SketchSolver, SolverConfig, BASIC_TOLERANCE, DEFAULT_MAX_ITERATIONS};
use crate::sketch::types::SketchError;
use approx::assert_abs_diff_eq;

#[test]
fn test_empty_collection_converges() {
    let mut store = EntityStore::new();
    assert!(SketchSolver::solve(&[], &mut store, &SolverConfig::default()));
}

#[test]
fn test_fixed_snaps_in_one_step() {
    let mut store = EntityStore::new();
    let p = store.add_point(3.0, -4.0);
    let fixed = Fixed::new(p, [1.0, 1.0]).unwrap();

    assert!(fixed.error(&store) > 0.0);
    fixed.solve(&mut store);

    assert_eq!(store.position(p).unwrap(), Point2::new(1.0, 1.0));
    assert_eq!(fixed.error(&store), 0.0);
}

#[test]
fn test_fixed_rejects_non_finite_target() {
    let mut store = EntityStore::new();
    let p = store.add_point(0.0, 0.0);
    assert!(matches!(
        Fixed::new(p, [f64::NAN, 0.0]),
        Err(SketchError::InvalidTarget { kind: ConstraintKind::Fixed, .. })
    ));
    assert_eq!(
        Fixed::new(p, [0.0, f64::NEG_INFINITY]),
        Err(SketchError::InvalidTarget { kind: ConstraintKind::Fixed, value: f64::NEG_INFINITY })
    );
}

#[test]
fn test_fixed_at_current_pins_where_it_is() {
    let mut store = EntityStore::new();
    let p = store.add_point(2.5, 7.0);
    let fixed = Fixed::at_current(&store, p).unwrap();
    assert_eq!(fixed.target, Point2::new(2.5, 7.0));

    store.move_point(p, Point2::new(0.0, 0.0));
    fixed.solve(&mut store);
    assert_eq!(store.position(p).unwrap(), Point2::new(2.5, 7.0));
}

#[test]
fn test_horizontal_averages_y() {
    let mut store = EntityStore::new();
    let line = store.add_line_between([0.0, 0.0], [10.0, 4.0]);
    let horizontal = Horizontal::for_line(store.line(line).unwrap());

    assert_eq!(horizontal.error(&store), 4.0);
    horizontal.solve(&mut store);

    let (start, end) = store.line_endpoints(line).unwrap();
    assert_eq!(start.y, 2.0);
    assert_eq!(end.y, 2.0);
    assert_eq!((start.x, end.x), (0.0, 10.0));
    assert_eq!(horizontal.error(&store), 0.0);
}

#[test]
fn test_vertical_averages_x() {
    let mut store = EntityStore::new();
    let line = store.add_line_between([0.0, 0.0], [4.0, 10.0]);
    let vertical = Vertical::for_line(store.line(line).unwrap());

    assert_eq!(vertical.error(&store), 4.0);
    vertical.solve(&mut store);

    let (start, end) = store.line_endpoints(line).unwrap();
    assert_eq!(start.x, 2.0);
    assert_eq!(end.x, 2.0);
    assert_eq!((start.y, end.y), (0.0, 10.0));
    assert_eq!(vertical.error(&store), 0.0);
}

#[test]
fn test_midpoint_lands_exactly() {
    let mut store = EntityStore::new();
    let line = store.add_line_between([0.0, 0.0], [10.0, 6.0]);
    let m = store.add_point(-40.0, 13.0);
    let midpoint = Midpoint::of_line(m, store.line(line).unwrap());

    midpoint.solve(&mut store);
    assert_eq!(store.position(m).unwrap(), Point2::new(5.0, 3.0));
    assert_eq!(midpoint.error(&store), 0.0);
}

#[test]
fn test_radius_sets_exactly() {
    let mut store = EntityStore::new();
    let circle = store.add_circle_at([0.0, 0.0], 10.0).unwrap();
    let radius = Radius::new(circle, 20.0).unwrap();

    assert_eq!(radius.error(&store), 10.0);
    radius.solve(&mut store);
    assert_eq!(store.circle(circle).unwrap().radius, 20.0);
    assert_eq!(radius.error(&store), 0.0);
}

#[test]
fn test_contradictory_fixed_never_converges() {
    let mut store = EntityStore::new();
    let p = store.add_point(0.0, 0.0);
    let constraints: Vec<SketchConstraint> =
        vec![Fixed::new(p, [0.0, 0.0]).unwrap().into(), Fixed::new(p, [10.0, 0.0]).unwrap().into()];

    let converged = SketchSolver::solve(&constraints, &mut store, &SolverConfig::default());
    assert!(!converged);

    // Each pass ends on the last target, so the first one stays violated.
    assert_eq!(store.position(p).unwrap(), Point2::new(10.0, 0.0));
    assert_eq!(constraints[0].error(&store), 10.0);
}

#[test]
fn test_already_satisfied_converges_on_first_pass() {
    let mut store = EntityStore::new();
    let line = store.add_line_between([0.0, 3.0], [10.0, 3.0]);
    let constraints = vec![SketchConstraint::new(Horizontal::for_line(store.line(line).unwrap()))];
    let before = store.line_endpoints(line).unwrap();

    let one_pass = SolverConfig::basic().with_max_iterations(1).unwrap();
    assert!(SketchSolver::solve(&constraints, &mut store, &one_pass));
    assert_eq!(store.line_endpoints(line).unwrap(), before);

    // And again
    assert!(SketchSolver::solve(&constraints, &mut store, &one_pass));
}

#[test]
fn test_corrections_visible_within_the_same_pass() {
    let mut store = EntityStore::new();
    let a = store.add_point(0.0, 0.0);
    let b = store.add_point(10.0, 0.0);
    let m = store.add_point(0.0, 0.0);
    let constraints: Vec<SketchConstraint> = vec![Fixed::new(a, [5.0, 5.0]).unwrap().into(), Midpoint::new(m, a, b).into()];

    let one_pass = SolverConfig::basic().with_max_iterations(1).unwrap();
    SketchSolver::solve(&constraints, &mut store, &one_pass);

    // Midpoint already sees the snapped `a`.
    assert_eq!(store.position(m).unwrap(), Point2::new(7.5, 2.5));
}

#[test]
fn test_parallel_converges_within_budget() {
    let mut store = EntityStore::new();
    let l1 = store.add_line_between([0.0, 0.0], [10.0, 0.0]);
    let l2 = store.add_line_between([0.0, 5.0], [10.0, 9.0]);
    let constraints = vec![SketchConstraint::new(Parallel::new(l1, l2))];

    assert!(SketchSolver::solve(&constraints, &mut store, &SolverConfig::default()));
    assert!(constraints[0].error(&store) < BASIC_TOLERANCE);

    // Lengths survive the rotation.
    let (s1, e1) = store.line_endpoints(l1).unwrap();
    let (s2, e2) = store.line_endpoints(l2).unwrap();
    assert_abs_diff_eq!(nalgebra::distance(&s1, &e1), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(nalgebra::distance(&s2, &e2), 116.0_f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_inactive_constraints_are_skipped() {
    let mut store = EntityStore::new();
    let p = store.add_point(0.0, 0.0);
    let constraints = vec![SketchConstraint::inactive(Fixed::new(p, [3.0, 3.0]).unwrap())];

    assert!(SketchSolver::solve(&constraints, &mut store, &SolverConfig::default()));
    assert_eq!(store.position(p).unwrap(), Point2::new(0.0, 0.0));
}

#[test]
fn test_config_defaults_and_validation() {
    let config = SolverConfig::default();
    assert_eq!(config, SolverConfig::basic());
    assert_eq!(config.tolerance, BASIC_TOLERANCE);
    assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);

    assert!(matches!(SolverConfig::new(0.0, 10), Err(SketchError::InvalidConfig(_))));
    assert!(matches!(SolverConfig::new(f64::NAN, 10), Err(SketchError::InvalidConfig(_))));
    assert!(matches!(SolverConfig::new(1e-3, 0), Err(SketchError::InvalidConfig(_))));
    assert_eq!(SolverConfig::new(1e-3, 5).unwrap().max_iterations, 5);
}
