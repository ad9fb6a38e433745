use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction; coincident points give `ZERO`.
    pub fn normalized(self) -> Point {
        let len = self.length();
        if len <= f32::EPSILON {
            return Point::ZERO;
        }
        self.scale(1.0 / len)
    }
}

/// One side of a node rectangle. Screen coordinates: y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn outward(self) -> Point {
        match self {
            Side::Top => Point::new(0.0, -1.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Bottom => Point::new(0.0, 1.0),
            Side::Left => Point::new(-1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// True for sides whose outward vector lies on the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    pub fn midpoint(self, rect: &Placement) -> Point {
        match self {
            Side::Top => Point::new(rect.x + rect.width / 2.0, rect.y),
            Side::Right => Point::new(rect.x + rect.width, rect.y + rect.height / 2.0),
            Side::Bottom => Point::new(rect.x + rect.width / 2.0, rect.y + rect.height),
            Side::Left => Point::new(rect.x, rect.y + rect.height / 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict interior test against the rectangle grown by `pad` on every side.
    pub fn contains_point(&self, point: Point, pad: f32) -> bool {
        point.x > self.x - pad
            && point.x < self.x + self.width + pad
            && point.y > self.y - pad
            && point.y < self.y + self.height + pad
    }

    pub fn overlaps(&self, other: &Placement, pad: f32) -> bool {
        self.x - pad < other.x + other.width + pad
            && other.x - pad < self.x + self.width + pad
            && self.y - pad < other.y + other.height + pad
            && other.y - pad < self.y + self.height + pad
    }
}

/// How a route was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// First curve was clear.
    Direct,
    /// A widened retry was clear.
    Widened,
    /// Per-edge side search picked the sides.
    Fallback,
}

/// Cubic bezier geometry for one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub edge_id: String,
    pub source: String,
    pub target: String,
    pub start: Point,
    pub end: Point,
    pub c1: Point,
    pub c2: Point,
    pub source_side: Side,
    pub target_side: Side,
    pub kind: RouteKind,
}

impl Route {
    /// `count` samples at `t = i / (count + 1)`, endpoints excluded.
    pub fn interior_samples(&self, count: usize) -> Vec<Point> {
        interior_samples(self.start, self.c1, self.c2, self.end, count)
    }

    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.c1.x,
            self.c1.y,
            self.c2.x,
            self.c2.y,
            self.end.x,
            self.end.y
        )
    }
}

fn bezier_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

pub(crate) fn interior_samples(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    count: usize,
) -> Vec<Point> {
    let denom = (count + 1) as f32;
    (1..=count)
        .map(|i| bezier_point(p0, p1, p2, p3, i as f32 / denom))
        .collect()
}

pub(crate) fn polyline_length(start: Point, samples: &[Point], end: Point) -> f32 {
    let mut total = 0.0;
    let mut prev = start;
    for point in samples.iter().copied().chain(std::iter::once(end)) {
        total += prev.distance(point);
        prev = point;
    }
    total
}

/// Bounding box of a set of placements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

pub fn layout_bounds(placements: &BTreeMap<String, Placement>) -> Option<Bounds> {
    let mut iter = placements.values();
    let first = iter.next()?;
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x + first.width,
        max_y: first.y + first.height,
    };
    for rect in iter {
        bounds.min_x = bounds.min_x.min(rect.x);
        bounds.min_y = bounds.min_y.min(rect.y);
        bounds.max_x = bounds.max_x.max(rect.x + rect.width);
        bounds.max_y = bounds.max_y.max(rect.y + rect.height);
    }
    Some(bounds)
}

/// Result of running both phases over one diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramLayout {
    pub placements: BTreeMap<String, Placement>,
    pub routes: BTreeMap<String, Route>,
}
