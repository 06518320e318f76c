use super::{Constraint, ConstraintKind};
use crate::geometry::{
    cross_2d, distance_point_to_line, midpoint, project_onto_line, rotate_about, segment_angle, segment_at_angle,
    try_normalize, wrap_angle, EPSILON,
};
use crate::sketch::entities::{EntityRef, EntityStore, LineId, PointId};
use crate::sketch::types::{SketchError, SketchResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Rotates a line about its own midpoint to `angle`, keeping its length.
fn rotate_line_to(store: &mut EntityStore, line: LineId, angle: f64) {
    if let Some((start, end)) = store.line_endpoints(line) {
        let (new_start, new_end) = segment_at_angle(&midpoint(&start, &end), nalgebra::distance(&start, &end), angle);
        store.set_line_endpoints(line, new_start, new_end);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallel {
    pub first: LineId,
    pub second: LineId,
}

impl Parallel {
    pub fn new(first: LineId, second: LineId) -> Self {
        Self { first, second }
    }
}

impl Constraint for Parallel {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Parallel
    }

    /// Cross product of the (unnormalised) direction vectors.
    fn error(&self, store: &EntityStore) -> f64 {
        match (store.line_endpoints(self.first), store.line_endpoints(self.second)) {
            (Some((s1, e1)), Some((s2, e2))) => cross_2d(&(e1 - s1), &(e2 - s2)).abs(),
            _ => 0.0,
        }
    }

    /// Rotates both lines about their midpoints onto the bisector of their directions.
    fn solve(&self, store: &mut EntityStore) {
        let (Some((s1, e1)), Some((s2, e2))) = (store.line_endpoints(self.first), store.line_endpoints(self.second))
        else {
            return;
        };
        if cross_2d(&(e1 - s1), &(e2 - s2)).abs() < EPSILON {
            return;
        }
        let angle1 = segment_angle(&s1, &e1);
        let angle2 = segment_angle(&s2, &e2);

        // Lines pointing roughly opposite ways are still parallel: fold the
        // difference into (-π/2, π/2] and keep the second line reversed.
        let mut diff = wrap_angle(angle1 - angle2);
        let reversed = diff.abs() > FRAC_PI_2;
        if reversed {
            diff = wrap_angle(diff - PI);
        }

        let bisector = angle1 - diff * 0.5;
        rotate_line_to(store, self.first, bisector);
        rotate_line_to(store, self.second, if reversed { bisector + PI } else { bisector });
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Line(self.first), EntityRef::Line(self.second)]
    }
}

/// Only the second line rotates; the first is the reference direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perpendicular {
    pub first: LineId,
    pub second: LineId,
}

impl Perpendicular {
    pub fn new(first: LineId, second: LineId) -> Self {
        Self { first, second }
    }
}

impl Constraint for Perpendicular {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Perpendicular
    }

    /// Dot product of the (unnormalised) direction vectors.
    fn error(&self, store: &EntityStore) -> f64 {
        match (store.line_endpoints(self.first), store.line_endpoints(self.second)) {
            (Some((s1, e1)), Some((s2, e2))) => (e1 - s1).dot(&(e2 - s2)).abs(),
            _ => 0.0,
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some((s1, e1)), Some((s2, e2))) = (store.line_endpoints(self.first), store.line_endpoints(self.second))
        else {
            return;
        };
        if (e1 - s1).dot(&(e2 - s2)).abs() < EPSILON {
            return;
        }
        let angle1 = segment_angle(&s1, &e1);
        let angle2 = segment_angle(&s2, &e2);

        // Of the two perpendicular directions, take the one the line is already closer to.
        let ccw = angle1 + FRAC_PI_2;
        let cw = angle1 - FRAC_PI_2;
        let target = if wrap_angle(angle2 - ccw).abs() <= wrap_angle(angle2 - cw).abs() { ccw } else { cw };
        rotate_line_to(store, self.second, target);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Line(self.first), EntityRef::Line(self.second)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

/// Counter-clockwise angle from `vertex -> first_arm` to `vertex -> second_arm`,
/// measured in `[0, 2π)`. Correction rotates `second_arm` about the vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub vertex: PointId,
    pub first_arm: PointId,
    pub second_arm: PointId,
    pub target: f64,
    pub unit: AngleUnit,
}

impl Angle {
    pub fn degrees(vertex: PointId, first_arm: PointId, second_arm: PointId, target: f64) -> SketchResult<Self> {
        Self::with_unit(vertex, first_arm, second_arm, target, AngleUnit::Degrees)
    }

    pub fn radians(vertex: PointId, first_arm: PointId, second_arm: PointId, target: f64) -> SketchResult<Self> {
        Self::with_unit(vertex, first_arm, second_arm, target, AngleUnit::Radians)
    }

    fn with_unit(
        vertex: PointId,
        first_arm: PointId,
        second_arm: PointId,
        target: f64,
        unit: AngleUnit,
    ) -> SketchResult<Self> {
        if !target.is_finite() {
            return Err(SketchError::InvalidTarget { kind: ConstraintKind::Angle, value: target });
        }
        Ok(Self { vertex, first_arm, second_arm, target, unit })
    }

    pub fn target_radians(&self) -> f64 {
        match self.unit {
            AngleUnit::Degrees => self.target.to_radians(),
            AngleUnit::Radians => self.target,
        }
    }

    /// Current angle, `None` if either arm has collapsed onto the vertex.
    fn measure(&self, store: &EntityStore) -> Option<f64> {
        let vertex = store.position(self.vertex)?;
        let u1 = try_normalize(&(store.position(self.first_arm)? - vertex))?;
        let u2 = try_normalize(&(store.position(self.second_arm)? - vertex))?;
        let angle = u1.dot(&u2).clamp(-1.0, 1.0).acos();
        if cross_2d(&u1, &u2) < 0.0 {
            Some(2.0 * PI - angle)
        } else {
            Some(angle)
        }
    }
}

impl Constraint for Angle {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Angle
    }

    fn error(&self, store: &EntityStore) -> f64 {
        let keys = [self.vertex, self.first_arm, self.second_arm];
        if keys.iter().any(|id| store.position(*id).is_none()) {
            return 0.0;
        }
        // A collapsed arm measures as zero.
        let current = self.measure(store).unwrap_or(0.0);
        (current - self.target_radians()).abs()
    }

    fn solve(&self, store: &mut EntityStore) {
        let Some(current) = self.measure(store) else {
            return;
        };
        let (Some(vertex), Some(arm)) = (store.position(self.vertex), store.position(self.second_arm)) else {
            return;
        };
        let step = (self.target_radians() - current) * 0.5;
        store.move_point(self.second_arm, rotate_about(&arm, &vertex, step));
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![
            EntityRef::Point(self.vertex),
            EntityRef::Point(self.first_arm),
            EntityRef::Point(self.second_arm),
        ]
    }
}

/// Two points mirror each other across a symmetry line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symmetric {
    pub first: PointId,
    pub second: PointId,
    pub axis: LineId,
}

/// Perpendicularity counts this much more than the midpoint's distance to the axis.
const PERPENDICULARITY_WEIGHT: f64 = 10.0;

impl Symmetric {
    pub fn new(first: PointId, second: PointId, axis: LineId) -> Self {
        Self { first, second, axis }
    }
}

impl Constraint for Symmetric {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Symmetric
    }

    fn error(&self, store: &EntityStore) -> f64 {
        let (Some(p1), Some(p2), Some((a, b))) = (
            store.position(self.first),
            store.position(self.second),
            store.line_endpoints(self.axis),
        ) else {
            return 0.0;
        };
        let mid = midpoint(&p1, &p2);
        let off_axis = distance_point_to_line(&a, &b, &mid);
        let alignment = match (try_normalize(&(p2 - p1)), try_normalize(&(b - a))) {
            (Some(seg), Some(axis)) => seg.dot(&axis).abs(),
            _ => 0.0,
        };
        off_axis + PERPENDICULARITY_WEIGHT * alignment
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some(p1), Some(p2), Some((a, b))) = (
            store.position(self.first),
            store.position(self.second),
            store.line_endpoints(self.axis),
        ) else {
            return;
        };
        let mid = midpoint(&p1, &p2);
        let Some(foot) = project_onto_line(&a, &b, &mid) else {
            return;
        };

        // Slide the pair so its midpoint sits on the axis.
        let shift = foot - mid;
        let (p1, p2) = (p1 + shift, p2 + shift);

        // Then turn it about that point to whichever axis normal is nearer.
        let axis_angle = segment_angle(&a, &b);
        let current = segment_angle(&p1, &p2);
        let mut target = axis_angle + FRAC_PI_2;
        if wrap_angle(current - target).abs() > FRAC_PI_2 {
            target = axis_angle - FRAC_PI_2;
        }
        let (new_first, new_second) = segment_at_angle(&foot, nalgebra::distance(&p1, &p2), target);
        store.move_point(self.first, new_first);
        store.move_point(self.second, new_second);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![EntityRef::Point(self.first), EntityRef::Point(self.second), EntityRef::Line(self.axis)]
    }
}
