use super::{Constraint, ConstraintKind};
use crate::geometry::{closest_point_on_segment, midpoint, signed_distance_to_line, try_normalize, EPSILON};
use crate::sketch::entities::{CurveRef, EntityRef, EntityStore, LineId};
use crate::sketch::types::{SketchError, SketchResult};

/// Which pair a [`Tangent`] constraint touches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tangency {
    /// Distance from the curve centre to the line segment equals the radius.
    /// Corrections still shift the line along its normal.
    LineCurve(LineId, CurveRef),
    /// External tangency: centre distance equals `r1 + r2`.
    CurveCurve(CurveRef, CurveRef),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tangent {
    pub tangency: Tangency,
}

impl Tangent {
    /// Resolves the pairing from two entity references, in either order.
    pub fn between(first: impl Into<EntityRef>, second: impl Into<EntityRef>) -> SketchResult<Self> {
        let (first, second) = (first.into(), second.into());
        let tangency = match (first, first.as_curve(), second, second.as_curve()) {
            (EntityRef::Line(line), _, _, Some(curve)) | (_, Some(curve), EntityRef::Line(line), _) => {
                Tangency::LineCurve(line, curve)
            }
            (_, Some(a), _, Some(b)) => Tangency::CurveCurve(a, b),
            _ => {
                return Err(SketchError::UnsupportedPair {
                    kind: ConstraintKind::Tangent,
                    first: first.kind(),
                    second: second.kind(),
                })
            }
        };
        Ok(Self { tangency })
    }
}

impl Constraint for Tangent {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Tangent
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match self.tangency {
            Tangency::LineCurve(line, curve) => {
                let (Some((start, end)), Some((_, center, radius))) = (store.line_endpoints(line), store.curve(curve))
                else {
                    return 0.0;
                };
                // A collapsed line has no tangent direction.
                let Some(nearest) = closest_point_on_segment(&start, &end, &center) else {
                    return 0.0;
                };
                (nalgebra::distance(&center, &nearest) - radius).abs()
            }
            Tangency::CurveCurve(a, b) => match (store.curve(a), store.curve(b)) {
                (Some((_, c1, r1)), Some((_, c2, r2))) => (nalgebra::distance(&c1, &c2) - (r1 + r2)).abs(),
                _ => 0.0,
            },
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        match self.tangency {
            Tangency::LineCurve(line, curve) => {
                let (Some((start, end)), Some((_, center, radius))) = (store.line_endpoints(line), store.curve(curve))
                else {
                    return;
                };
                let Some((signed, normal)) = signed_distance_to_line(&start, &end, &center) else {
                    return;
                };
                // Keep the line on the side of the centre it is already on.
                let target = if signed < 0.0 { -radius } else { radius };
                let shift = normal * ((signed - target) * 0.5);
                store.set_line_endpoints(line, start + shift, end + shift);
            }
            Tangency::CurveCurve(a, b) => {
                let (Some((_, c1, r1)), Some((id2, c2, r2))) = (store.curve(a), store.curve(b)) else {
                    return;
                };
                let Some(axis) = try_normalize(&(c2 - c1)) else {
                    return;
                };
                let gap = r1 + r2 - nalgebra::distance(&c1, &c2);
                store.move_point(id2, c2 + axis * (gap * 0.5));
            }
        }
    }

    fn references(&self) -> Vec<EntityRef> {
        match self.tangency {
            Tangency::LineCurve(line, curve) => vec![EntityRef::Line(line), curve.into()],
            Tangency::CurveCurve(a, b) => vec![a.into(), b.into()],
        }
    }
}

/// Two circles or arcs share a centre. Both centres move to their average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Concentric {
    pub first: CurveRef,
    pub second: CurveRef,
}

impl Concentric {
    pub fn new(first: impl Into<CurveRef>, second: impl Into<CurveRef>) -> Self {
        Self { first: first.into(), second: second.into() }
    }
}

impl Constraint for Concentric {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Concentric
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match (store.curve(self.first), store.curve(self.second)) {
            (Some((_, c1, _)), Some((_, c2, _))) => nalgebra::distance(&c1, &c2),
            _ => 0.0,
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        let (Some((id1, c1, _)), Some((id2, c2, _))) = (store.curve(self.first), store.curve(self.second)) else {
            return;
        };
        let center = midpoint(&c1, &c2);
        store.move_point(id1, center);
        store.move_point(id2, center);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![self.first.into(), self.second.into()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Equality {
    Lines(LineId, LineId),
    Radii(CurveRef, CurveRef),
}

/// Equal line lengths, or equal radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualLength {
    pub equality: Equality,
}

impl EqualLength {
    pub fn lines(first: LineId, second: LineId) -> Self {
        Self { equality: Equality::Lines(first, second) }
    }

    pub fn radii(first: impl Into<CurveRef>, second: impl Into<CurveRef>) -> Self {
        Self { equality: Equality::Radii(first.into(), second.into()) }
    }

    /// Two lines, or any two of circle/arc. Other pairs are rejected.
    pub fn between(first: impl Into<EntityRef>, second: impl Into<EntityRef>) -> SketchResult<Self> {
        let (first, second) = (first.into(), second.into());
        match (first, first.as_curve(), second, second.as_curve()) {
            (EntityRef::Line(a), _, EntityRef::Line(b), _) => Ok(Self::lines(a, b)),
            (_, Some(a), _, Some(b)) => Ok(Self::radii(a, b)),
            _ => Err(SketchError::UnsupportedPair {
                kind: ConstraintKind::EqualLength,
                first: first.kind(),
                second: second.kind(),
            }),
        }
    }
}

/// Scales a line about its midpoint to `length`. No-op for a collapsed line.
fn rescale_line(store: &mut EntityStore, line: LineId, length: f64) {
    let Some((start, end)) = store.line_endpoints(line) else {
        return;
    };
    let Some(dir) = try_normalize(&(end - start)) else {
        return;
    };
    let mid = midpoint(&start, &end);
    let half = dir * (length * 0.5);
    store.set_line_endpoints(line, mid - half, mid + half);
}

impl Constraint for EqualLength {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::EqualLength
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match self.equality {
            Equality::Lines(a, b) => match (store.line_endpoints(a), store.line_endpoints(b)) {
                (Some((s1, e1)), Some((s2, e2))) => (nalgebra::distance(&s1, &e1) - nalgebra::distance(&s2, &e2)).abs(),
                _ => 0.0,
            },
            Equality::Radii(a, b) => match (store.curve(a), store.curve(b)) {
                (Some((_, _, r1)), Some((_, _, r2))) => (r1 - r2).abs(),
                _ => 0.0,
            },
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        match self.equality {
            Equality::Lines(a, b) => {
                let (Some((s1, e1)), Some((s2, e2))) = (store.line_endpoints(a), store.line_endpoints(b)) else {
                    return;
                };
                let average = (nalgebra::distance(&s1, &e1) + nalgebra::distance(&s2, &e2)) * 0.5;
                if average < EPSILON {
                    return;
                }
                rescale_line(store, a, average);
                rescale_line(store, b, average);
            }
            Equality::Radii(a, b) => {
                let (Some((_, _, r1)), Some((_, _, r2))) = (store.curve(a), store.curve(b)) else {
                    return;
                };
                let average = (r1 + r2) * 0.5;
                store.set_curve_radius(a, average);
                store.set_curve_radius(b, average);
            }
        }
    }

    fn references(&self) -> Vec<EntityRef> {
        match self.equality {
            Equality::Lines(a, b) => vec![EntityRef::Line(a), EntityRef::Line(b)],
            Equality::Radii(a, b) => vec![a.into(), b.into()],
        }
    }
}

/// Drives a circle or arc radius to a fixed value in one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius {
    pub curve: CurveRef,
    pub target: f64,
}

impl Radius {
    /// Rejects a negative or non-finite target.
    pub fn new(curve: impl Into<CurveRef>, target: f64) -> SketchResult<Self> {
        if !(target.is_finite() && target >= 0.0) {
            return Err(SketchError::InvalidRadius(target));
        }
        Ok(Self { curve: curve.into(), target })
    }
}

impl Constraint for Radius {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Radius
    }

    fn error(&self, store: &EntityStore) -> f64 {
        store.curve(self.curve).map_or(0.0, |(_, _, radius)| (radius - self.target).abs())
    }

    fn solve(&self, store: &mut EntityStore) {
        store.set_curve_radius(self.curve, self.target);
    }

    fn references(&self) -> Vec<EntityRef> {
        vec![self.curve.into()]
    }
}
