use super::{Constraint, ConstraintKind};
use crate::geometry::{cross_2d, midpoint, try_normalize, Point2};
use crate::sketch::entities::{EntityRef, EntityStore, Line, PointId};
use crate::sketch::types::{SketchError, SketchResult};

/// Pins a point to an absolute position. Snaps in a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed {
    pub point: PointId,
    pub target: Point2,
}

impl Fixed {
    /// Rejects a target with a non-finite coordinate.
    pub fn new(point: PointId, target: [f64; 2]) -> SketchResult<Self> {
        if let Some(value) = target.into_iter().find(|v| !v.is_finite()) {
            return Err(SketchError::InvalidTarget { kind: ConstraintKind::Fixed, value });
        }
        Ok(Self { point, target: Point2::new(target[0], target[1]) })
    }

    /// Pins the point where it currently is.
    pub fn at_current(store: &EntityStore, point: PointId) -> SketchResult<Self> {
        let target = store.position(point).ok_or(SketchError::UnknownPoint(point))?;
        Ok(Self { point, target })
    }
}

impl Constraint for Fixed {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Fixed
    }

    fn error(&self, store: &EntityStore) -> f64 {
        store
            .position(self.point)
            .map_or(0.0, |p| nalgebra::distance(&p, &self.target))
    }

    fn solve(&self, store: &mut EntityStore) {
        store.set_point(self.point, self.target);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.point)]
    }
}

/// Two points share a y coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub first: PointId,
    pub second: PointId,
}

impl Horizontal {
    pub fn new(first: PointId, second: PointId) -> Self {
        Self { first, second }
    }

    pub fn for_line(line: &Line) -> Self {
        Self::new(line.start, line.end)
    }
}

impl Constraint for Horizontal {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Horizontal
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match (store.position(self.first), store.position(self.second)) {
            (Some(a), Some(b)) => (a.y - b.y).abs(),
            _ => 0.0,
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some(a), Some(b)) = (store.position(self.first), store.position(self.second)) else {
            return;
        };
        let mid_y = (a.y + b.y) * 0.5;
        store.move_point(self.first, Point2::new(a.x, mid_y));
        store.move_point(self.second, Point2::new(b.x, mid_y));
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.first), EntityRef::Point(self.second)]
    }
}

/// Two points share an x coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertical {
    pub first: PointId,
    pub second: PointId,
}

impl Vertical {
    pub fn new(first: PointId, second: PointId) -> Self {
        Self { first, second }
    }

    pub fn for_line(line: &Line) -> Self {
        Self::new(line.start, line.end)
    }
}

impl Constraint for Vertical {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Vertical
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match (store.position(self.first), store.position(self.second)) {
            (Some(a), Some(b)) => (a.x - b.x).abs(),
            _ => 0.0,
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some(a), Some(b)) = (store.position(self.first), store.position(self.second)) else {
            return;
        };
        let mid_x = (a.x + b.x) * 0.5;
        store.move_point(self.first, Point2::new(mid_x, a.y));
        store.move_point(self.second, Point2::new(mid_x, b.y));
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.first), EntityRef::Point(self.second)]
    }
}

/// `point` sits halfway between `start` and `end`. Only `point` moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Midpoint {
    pub point: PointId,
    pub start: PointId,
    pub end: PointId,
}

impl Midpoint {
    pub fn new(point: PointId, start: PointId, end: PointId) -> Self {
        Self { point, start, end }
    }

    pub fn of_line(point: PointId, line: &Line) -> Self {
        Self::new(point, line.start, line.end)
    }

    fn target(&self, store: &EntityStore) -> Option<Point2> {
        Some(midpoint(&store.position(self.start)?, &store.position(self.end)?))
    }
}

impl Constraint for Midpoint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Midpoint
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match (store.position(self.point), self.target(store)) {
            (Some(p), Some(mid)) => nalgebra::distance(&p, &mid),
            _ => 0.0,
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        if let Some(mid) = self.target(store) {
            store.move_point(self.point, mid);
        }
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.point), EntityRef::Point(self.start), EntityRef::Point(self.end)]
    }
}

/// `third` lies on the line through `first` and `second`.
/// Error is twice the triangle area; only `third` moves, half-way per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collinear {
    pub first: PointId,
    pub second: PointId,
    pub third: PointId,
}

impl Collinear {
    pub fn new(first: PointId, second: PointId, third: PointId) -> Self {
        Self { first, second, third }
    }
}

impl Constraint for Collinear {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Collinear
    }

    fn error(&self, store: &EntityStore) -> f64 {
        let (Some(p1), Some(p2), Some(p3)) = (
            store.position(self.first),
            store.position(self.second),
            store.position(self.third),
        ) else {
            return 0.0;
        };
        cross_2d(&(p2 - p1), &(p3 - p1)).abs()
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some(p1), Some(p2), Some(p3)) = (
            store.position(self.first),
            store.position(self.second),
            store.position(self.third),
        ) else {
            return;
        };
        let Some(dir) = try_normalize(&(p2 - p1)) else {
            return;
        };
        let foot = p1 + dir * (p3 - p1).dot(&dir);
        store.move_point(self.third, p3 + (foot - p3) * 0.5);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.first), EntityRef::Point(self.second), EntityRef::Point(self.third)]
    }
}
