//! Geometry for BPMN diagram interchange.
//!
//! Shapes are placed in the `bpmndi` coordinate space: the origin is the
//! top-left corner, `x` grows rightward and `y` grows downward. [`Bounds`]
//! map directly onto a `dc:Bounds` element, and edge waypoints are
//! [`Point`]s.

/// A position in diagram space.
///
/// ```
/// # use procflow_core::geometry::Point;
/// let corner = Point::new(300.0, 100.0);
/// let inside = corner.add_point(Point::new(50.0, 50.0));
/// assert_eq!((inside.x(), inside.y()), (350.0, 150.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Offset this point by `other`.
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

/// Width and height of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Component-wise maximum. A grown sub-process never shrinks below its
    /// registry size.
    pub fn max(self, other: Size) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Grow by `padding` on every side.
    pub fn add_padding(self, padding: Insets) -> Self {
        Self::new(
            self.width + 2.0 * padding.0,
            self.height + 2.0 * padding.0,
        )
    }
}

/// Equal padding on all four sides of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets(f32);

impl Insets {
    pub fn uniform(value: f32) -> Self {
        Self(value)
    }
}

/// An axis-aligned rectangle, stored as its two corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min: top_left,
            max: top_left.add_point(Point::new(size.width, size.height)),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min.x
    }

    pub fn min_y(self) -> f32 {
        self.min.y
    }

    pub fn max_x(self) -> f32 {
        self.max.x
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Whether `other` lies entirely inside. Shared edges count as inside.
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Whether the interiors overlap. Shapes that only touch do not.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// The smallest bounds covering both.
    ///
    /// ```
    /// # use procflow_core::geometry::{Bounds, Point, Size};
    /// let start = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(36.0, 36.0));
    /// let task = Bounds::new_from_top_left(Point::new(200.0, 0.0), Size::new(100.0, 80.0));
    ///
    /// let extent = start.merge(&task);
    /// assert_eq!((extent.width(), extent.height()), (300.0, 80.0));
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}
