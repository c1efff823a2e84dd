//! Renderable Path Geometry
//!
//! Curves are produced as a list of path commands in the caller's local
//! coordinate space (y grows downwards, like every 2D canvas). Generators
//! write through the [`PathSink`] trait so a renderer can plug in its own
//! path type; [`CurvePath`] is the default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the rectangle has a drawable, finite area
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Destination for generated path commands
pub trait PathSink {
    fn start_new_sub_path(&mut self, point: Point);

    fn line_to(&mut self, point: Point);

    fn quadratic_to(&mut self, control: Point, end: Point);

    fn close_sub_path(&mut self);

    /// Hint for the number of commands about to be written
    fn preallocate(&mut self, _commands: usize) {}
}

/// One path command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathElement {
    MoveTo { to: Point },
    LineTo { to: Point },
    QuadTo { control: Point, to: Point },
    Close,
}

impl PathElement {
    /// End point of the command, `None` for `Close`
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathElement::MoveTo { to } | PathElement::LineTo { to } => Some(to),
            PathElement::QuadTo { to, .. } => Some(to),
            PathElement::Close => None,
        }
    }
}

/// Default renderable curve: an owned list of path commands
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurvePath {
    elements: Vec<PathElement>,
}

impl CurvePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// End points of every drawing command, in order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.elements.iter().filter_map(PathElement::end_point)
    }

    pub fn first_point(&self) -> Option<Point> {
        self.points().next()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points().last()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.elements.last(), Some(PathElement::Close))
    }
}

impl PathSink for CurvePath {
    fn start_new_sub_path(&mut self, point: Point) {
        self.elements.push(PathElement::MoveTo { to: point });
    }

    fn line_to(&mut self, point: Point) {
        self.elements.push(PathElement::LineTo { to: point });
    }

    fn quadratic_to(&mut self, control: Point, end: Point) {
        self.elements.push(PathElement::QuadTo { control, to: end });
    }

    fn close_sub_path(&mut self) {
        self.elements.push(PathElement::Close);
    }

    fn preallocate(&mut self, commands: usize) {
        self.elements.reserve(commands);
    }
}
