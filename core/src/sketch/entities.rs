use super::types::{SketchError, SketchResult};
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::f64::consts::PI;
use std::fmt;

pub const POLYGON_MIN_VERTICES: usize = 3;
pub const POLYGON_MAX_VERTICES: usize = 25;

// Keys stay valid while their entity lives. A removed entity's key resolves to
// `None`, even after its slot has been reused.
new_key_type! {
    pub struct PointId;
    pub struct LineId;
    pub struct CircleId;
    pub struct ArcId;
    pub struct PolygonId;
}

/// A mutable 2D coordinate. Identity lives in its [`PointId`], not in its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Absolute repositioning.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Same effect as [`Point::move_to`]; used when pinning to an exact target.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl From<Point2> for Point {
    fn from(p: Point2) -> Self {
        Self::new(p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: PointId,
    pub end: PointId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: PointId,
    pub radius: f64,
}

/// Circular arc. Constraints treat it as its supporting circle; the angles only
/// matter to callers that render or trim it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: PointId,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Closed polygon through 3..=25 vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<PointId>,
}

impl Polygon {
    pub fn new(vertices: Vec<PointId>) -> SketchResult<Self> {
        if !(POLYGON_MIN_VERTICES..=POLYGON_MAX_VERTICES).contains(&vertices.len()) {
            return Err(SketchError::InvalidPolygon { count: vertices.len() });
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[PointId] {
        &self.vertices
    }

    /// Edges of the closed loop, last vertex wrapping back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (PointId, PointId)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Point,
    Line,
    Circle,
    Arc,
    Polygon,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Arc => "arc",
            Self::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// Reference to any sketch entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Point(PointId),
    Line(LineId),
    Circle(CircleId),
    Arc(ArcId),
    Polygon(PolygonId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Point(_) => EntityKind::Point,
            Self::Line(_) => EntityKind::Line,
            Self::Circle(_) => EntityKind::Circle,
            Self::Arc(_) => EntityKind::Arc,
            Self::Polygon(_) => EntityKind::Polygon,
        }
    }

    /// Circles and arcs, as a [`CurveRef`].
    pub fn as_curve(&self) -> Option<CurveRef> {
        match *self {
            Self::Circle(id) => Some(CurveRef::Circle(id)),
            Self::Arc(id) => Some(CurveRef::Arc(id)),
            Self::Point(_) | Self::Line(_) | Self::Polygon(_) => None,
        }
    }
}

impl From<PointId> for EntityRef {
    fn from(id: PointId) -> Self {
        Self::Point(id)
    }
}

impl From<LineId> for EntityRef {
    fn from(id: LineId) -> Self {
        Self::Line(id)
    }
}

impl From<CircleId> for EntityRef {
    fn from(id: CircleId) -> Self {
        Self::Circle(id)
    }
}

impl From<ArcId> for EntityRef {
    fn from(id: ArcId) -> Self {
        Self::Arc(id)
    }
}

impl From<PolygonId> for EntityRef {
    fn from(id: PolygonId) -> Self {
        Self::Polygon(id)
    }
}

/// Owns every entity of a sketch. Constraints hold keys into this store, never
/// references, so two constraints sharing a point key see each other's writes.
/// The solver only ever perturbs coordinates and radii in it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub points: SlotMap<PointId, Point>,
    pub lines: SlotMap<LineId, Line>,
    pub circles: SlotMap<CircleId, Circle>,
    pub arcs: SlotMap<ArcId, Arc>,
    pub polygons: SlotMap<PolygonId, Polygon>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    pub fn add_point(&mut self, x: f64, y: f64) -> PointId {
        self.points.insert(Point::new(x, y))
    }

    pub fn add_line(&mut self, start: PointId, end: PointId) -> SketchResult<LineId> {
        self.require_point(start)?;
        self.require_point(end)?;
        Ok(self.lines.insert(Line { start, end }))
    }

    /// Creates both endpoints and the line between them.
    pub fn add_line_between(&mut self, start: [f64; 2], end: [f64; 2]) -> LineId {
        let start = self.add_point(start[0], start[1]);
        let end = self.add_point(end[0], end[1]);
        self.lines.insert(Line { start, end })
    }

    pub fn add_circle(&mut self, center: PointId, radius: f64) -> SketchResult<CircleId> {
        self.require_point(center)?;
        Self::check_radius(radius)?;
        Ok(self.circles.insert(Circle { center, radius }))
    }

    /// Creates the centre point and the circle around it.
    pub fn add_circle_at(&mut self, center: [f64; 2], radius: f64) -> SketchResult<CircleId> {
        Self::check_radius(radius)?;
        let center = self.add_point(center[0], center[1]);
        Ok(self.circles.insert(Circle { center, radius }))
    }

    pub fn add_arc(&mut self, center: PointId, radius: f64, start_angle: f64, end_angle: f64) -> SketchResult<ArcId> {
        self.require_point(center)?;
        Self::check_radius(radius)?;
        Ok(self.arcs.insert(Arc { center, radius, start_angle, end_angle }))
    }

    pub fn add_polygon(&mut self, vertices: Vec<PointId>) -> SketchResult<PolygonId> {
        for v in &vertices {
            self.require_point(*v)?;
        }
        let polygon = Polygon::new(vertices)?;
        Ok(self.polygons.insert(polygon))
    }

    /// Regular polygon inscribed in a circle of `radius`; vertex `i` sits at angle `2πi/sides`.
    pub fn add_regular_polygon(&mut self, center: [f64; 2], radius: f64, sides: usize) -> SketchResult<PolygonId> {
        if !(POLYGON_MIN_VERTICES..=POLYGON_MAX_VERTICES).contains(&sides) {
            return Err(SketchError::InvalidPolygon { count: sides });
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SketchError::InvalidPolygonRadius(radius));
        }
        let vertices: Vec<PointId> = (0..sides)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / sides as f64;
                self.add_point(center[0] + radius * angle.cos(), center[1] + radius * angle.sin())
            })
            .collect();
        self.add_polygon(vertices)
    }

    fn require_point(&self, id: PointId) -> SketchResult<()> {
        if self.points.contains_key(id) {
            Ok(())
        } else {
            Err(SketchError::UnknownPoint(id))
        }
    }

    fn check_radius(radius: f64) -> SketchResult<()> {
        if radius.is_finite() && radius >= 0.0 {
            Ok(())
        } else {
            Err(SketchError::InvalidRadius(radius))
        }
    }

    // -------------------------------------------------------------------------
    // Access used by constraints
    // -------------------------------------------------------------------------

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn position(&self, id: PointId) -> Option<Point2> {
        self.points.get(id).map(Point::position)
    }

    /// Moves a point to an absolute position. Unknown keys are ignored.
    pub fn move_point(&mut self, id: PointId, to: Point2) {
        if let Some(p) = self.points.get_mut(id) {
            p.move_to(to.x, to.y);
        }
    }

    /// Pins a point to an exact target. Unknown keys are ignored.
    pub fn set_point(&mut self, id: PointId, to: Point2) {
        if let Some(p) = self.points.get_mut(id) {
            p.set(to.x, to.y);
        }
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id)
    }

    /// Start and end positions of a line.
    pub fn line_endpoints(&self, id: LineId) -> Option<(Point2, Point2)> {
        let line = self.lines.get(id)?;
        Some((self.position(line.start)?, self.position(line.end)?))
    }

    pub fn set_line_endpoints(&mut self, id: LineId, start: Point2, end: Point2) {
        if let Some(line) = self.lines.get(id).copied() {
            self.move_point(line.start, start);
            self.move_point(line.end, end);
        }
    }

    pub fn circle(&self, id: CircleId) -> Option<&Circle> {
        self.circles.get(id)
    }

    pub fn arc(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id)
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    /// Centre key, centre position and radius of a circle or arc.
    pub fn curve(&self, curve: CurveRef) -> Option<(PointId, Point2, f64)> {
        let (center, radius) = match curve {
            CurveRef::Circle(id) => self.circles.get(id).map(|c| (c.center, c.radius))?,
            CurveRef::Arc(id) => self.arcs.get(id).map(|a| (a.center, a.radius))?,
        };
        Some((center, self.position(center)?, radius))
    }

    pub fn set_curve_radius(&mut self, curve: CurveRef, radius: f64) {
        match curve {
            CurveRef::Circle(id) => {
                if let Some(c) = self.circles.get_mut(id) {
                    c.radius = radius;
                }
            }
            CurveRef::Arc(id) => {
                if let Some(a) = self.arcs.get_mut(id) {
                    a.radius = radius;
                }
            }
        }
    }
}

/// A circle or an arc: anything with a centre and a radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveRef {
    Circle(CircleId),
    Arc(ArcId),
}

impl From<CurveRef> for EntityRef {
    fn from(curve: CurveRef) -> Self {
        match curve {
            CurveRef::Circle(id) => EntityRef::Circle(id),
            CurveRef::Arc(id) => EntityRef::Arc(id),
        }
    }
}

impl From<CircleId> for CurveRef {
    fn from(id: CircleId) -> Self {
        Self::Circle(id)
    }
}

impl From<ArcId> for CurveRef {
    fn from(id: ArcId) -> Self {
        Self::Arc(id)
    }
}
