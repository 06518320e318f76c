use super::{Constraint, ConstraintKind};
use crate::geometry::{centroid, distance_point_to_line, midpoint, project_onto_line, try_normalize, Point2};
use crate::sketch::entities::{CurveRef, EntityRef, EntityStore, LineId, PointId};
use crate::sketch::types::{SketchError, SketchResult};

/// Which entities a [`Coincident`] constraint joins.
#[derive(Debug, Clone, PartialEq)]
pub enum Coincidence {
    /// Two or more points collapse onto their centroid.
    Points(Vec<PointId>),
    /// Point lies on the infinite line through the segment.
    PointLine(PointId, LineId),
    /// Point lies on a circle, or on an arc's supporting circle.
    PointCurve(PointId, CurveRef),
    /// Segments share both endpoints, in whichever pairing is closer.
    LineLine(LineId, LineId),
    /// Curves share centre and radius.
    CurveCurve(CurveRef, CurveRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coincident {
    pub coincidence: Coincidence,
}

impl Coincident {
    pub fn points(points: Vec<PointId>) -> SketchResult<Self> {
        if points.len() < 2 {
            return Err(SketchError::TooFewPoints { kind: ConstraintKind::Coincident, count: points.len() });
        }
        Ok(Self { coincidence: Coincidence::Points(points) })
    }

    /// Resolves the pairing from two entity references, in either order.
    pub fn between(first: impl Into<EntityRef>, second: impl Into<EntityRef>) -> SketchResult<Self> {
        let (first, second) = (first.into(), second.into());
        let coincidence = match (first, second) {
            (EntityRef::Point(a), EntityRef::Point(b)) => Coincidence::Points(vec![a, b]),
            (EntityRef::Point(p), EntityRef::Line(l)) | (EntityRef::Line(l), EntityRef::Point(p)) => {
                Coincidence::PointLine(p, l)
            }
            (EntityRef::Line(a), EntityRef::Line(b)) => Coincidence::LineLine(a, b),
            _ => match (first, first.as_curve(), second, second.as_curve()) {
                (EntityRef::Point(p), _, _, Some(c)) | (_, Some(c), EntityRef::Point(p), _) => {
                    Coincidence::PointCurve(p, c)
                }
                (_, Some(c1), _, Some(c2)) => Coincidence::CurveCurve(c1, c2),
                _ => {
                    return Err(SketchError::UnsupportedPair {
                        kind: ConstraintKind::Coincident,
                        first: first.kind(),
                        second: second.kind(),
                    })
                }
            },
        };
        Ok(Self { coincidence })
    }
}

/// Line endpoints pair up either straight `(s1,s2),(e1,e2)` or crossed `(s1,e2),(e1,s2)`;
/// whichever has the smaller summed squared distance wins.
fn is_crossed_pairing(s1: &Point2, e1: &Point2, s2: &Point2, e2: &Point2) -> bool {
    let straight = nalgebra::distance_squared(s1, s2) + nalgebra::distance_squared(e1, e2);
    let crossed = nalgebra::distance_squared(s1, e2) + nalgebra::distance_squared(e1, s2);
    crossed < straight
}

impl Constraint for Coincident {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Coincident
    }

    fn error(&self, store: &EntityStore) -> f64 {
        match &self.coincidence {
            Coincidence::Points(ids) => {
                let Some(positions) = ids.iter().map(|id| store.position(*id)).collect::<Option<Vec<_>>>() else {
                    return 0.0;
                };
                let Some(center) = centroid(&positions) else {
                    return 0.0;
                };
                positions.iter().map(|p| nalgebra::distance(p, &center)).sum()
            }
            Coincidence::PointLine(point, line) => {
                match (store.position(*point), store.line_endpoints(*line)) {
                    (Some(p), Some((start, end))) => distance_point_to_line(&start, &end, &p),
                    _ => 0.0,
                }
            }
            Coincidence::PointCurve(point, curve) => match (store.position(*point), store.curve(*curve)) {
                (Some(p), Some((_, center, radius))) => (nalgebra::distance(&p, &center) - radius).abs(),
                _ => 0.0,
            },
            Coincidence::LineLine(a, b) => match (store.line_endpoints(*a), store.line_endpoints(*b)) {
                (Some((s1, e1)), Some((s2, e2))) => {
                    if is_crossed_pairing(&s1, &e1, &s2, &e2) {
                        nalgebra::distance(&s1, &e2) + nalgebra::distance(&e1, &s2)
                    } else {
                        nalgebra::distance(&s1, &s2) + nalgebra::distance(&e1, &e2)
                    }
                }
                _ => 0.0,
            },
            Coincidence::CurveCurve(a, b) => match (store.curve(*a), store.curve(*b)) {
                (Some((_, c1, r1)), Some((_, c2, r2))) => nalgebra::distance(&c1, &c2) + (r1 - r2).abs(),
                _ => 0.0,
            },
        }
    }

    fn solve(&self, store: &mut EntityStore) {
        match &self.coincidence {
            Coincidence::Points(ids) => {
                let Some(positions) = ids.iter().map(|id| store.position(*id)).collect::<Option<Vec<_>>>() else {
                    return;
                };
                if let Some(center) = centroid(&positions) {
                    for id in ids {
                        store.move_point(*id, center);
                    }
                }
            }
            Coincidence::PointLine(point, line) => {
                let (Some(p), Some((start, end))) = (store.position(*point), store.line_endpoints(*line)) else {
                    return;
                };
                let Some(foot) = project_onto_line(&start, &end, &p) else {
                    return;
                };
                // Point and line each cover half the gap.
                let half_gap = (foot - p) * 0.5;
                store.move_point(*point, p + half_gap);
                store.set_line_endpoints(*line, start - half_gap, end - half_gap);
            }
            Coincidence::PointCurve(point, curve) => {
                let (Some(p), Some((center_id, center, radius))) = (store.position(*point), store.curve(*curve)) else {
                    return;
                };
                let Some(dir) = try_normalize(&(p - center)) else {
                    return;
                };
                let on_curve = center + dir * radius;
                let half_gap = (on_curve - p) * 0.5;
                store.move_point(*point, p + half_gap);
                store.move_point(center_id, center - half_gap);
            }
            Coincidence::LineLine(a, b) => {
                let (Some(la), Some(lb)) = (store.line(*a).copied(), store.line(*b).copied()) else {
                    return;
                };
                let (Some((s1, e1)), Some((s2, e2))) = (store.line_endpoints(*a), store.line_endpoints(*b)) else {
                    return;
                };
                let pairs = if is_crossed_pairing(&s1, &e1, &s2, &e2) {
                    [(la.start, s1, lb.end, e2), (la.end, e1, lb.start, s2)]
                } else {
                    [(la.start, s1, lb.start, s2), (la.end, e1, lb.end, e2)]
                };
                for (id_a, pos_a, id_b, pos_b) in pairs {
                    let mid = midpoint(&pos_a, &pos_b);
                    store.move_point(id_a, mid);
                    store.move_point(id_b, mid);
                }
            }
            Coincidence::CurveCurve(a, b) => {
                let (Some((id1, c1, r1)), Some((id2, c2, r2))) = (store.curve(*a), store.curve(*b)) else {
                    return;
                };
                let center = midpoint(&c1, &c2);
                store.move_point(id1, center);
                store.move_point(id2, center);
                let radius = (r1 + r2) * 0.5;
                store.set_curve_radius(*a, radius);
                store.set_curve_radius(*b, radius);
            }
        }
    }

    fn references(&self) -> Vec<EntityRef> {
        match &self.coincidence {
            Coincidence::Points(ids) => ids.iter().map(|id| EntityRef::Point(*id)).collect(),
            Coincidence::PointLine(p, l) => vec![EntityRef::Point(*p), EntityRef::Line(*l)],
            Coincidence::PointCurve(p, c) => vec![EntityRef::Point(*p), (*c).into()],
            Coincidence::LineLine(a, b) => vec![EntityRef::Line(*a), EntityRef::Line(*b)],
            Coincidence::CurveCurve(a, b) => vec![(*a).into(), (*b).into()],
        }
    }
}
