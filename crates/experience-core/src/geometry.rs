//! Geometry primitives shared by every layout unit.
//!
//! All coordinates are in logical, density-independent units. Translating
//! them into platform pixels is the host's concern.

use glam::DVec2;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle from its origin and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from its four edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Create a rectangle from origin and size vectors.
    pub fn from_vecs(origin: DVec2, size: DVec2) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.x,
            height: size.y,
        }
    }

    /// A zero-area rectangle anchored at a point.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    /// Get the origin (top-left corner) as DVec2.
    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Get the size as DVec2.
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// A rectangle with no area (zero or negative width or height).
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Check whether `other` lies entirely within this rectangle.
    ///
    /// An empty rectangle contains nothing, not even another empty rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && self.left() <= other.left()
            && self.top() <= other.top()
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Compute intersection with another rectangle.
    ///
    /// Rectangles that merely share an edge do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.left().max(other.left());
        let y1 = self.top().max(other.top());
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x1 < x2 && y1 < y2 {
            Some(Rect::from_edges(x1, y1, x2, y2))
        } else {
            None
        }
    }

    /// Move the rectangle by the given amounts.
    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Express this rectangle relative to another rectangle's origin.
    pub fn relative_to(&self, origin: DVec2) -> Rect {
        Rect::from_vecs(self.origin() - origin, self.size())
    }

    /// Shrink the rectangle by the given insets on each edge.
    pub fn inset_by(&self, insets: &Insets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            self.width - insets.horizontal(),
            self.height - insets.vertical(),
        )
    }
}

/// How a [`Length`] value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitOfMeasure {
    /// Absolute logical units
    #[default]
    Points,
    /// Fraction of the containing dimension (1.0 = 100%)
    Percentage,
}

/// A length that is either absolute or proportional to its container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Length {
    pub unit: UnitOfMeasure,
    pub value: f64,
}

impl Length {
    pub const ZERO: Self = Self {
        unit: UnitOfMeasure::Points,
        value: 0.0,
    };

    pub fn points(value: f64) -> Self {
        Self { unit: UnitOfMeasure::Points, value }
    }

    pub fn percentage(value: f64) -> Self {
        Self { unit: UnitOfMeasure::Percentage, value }
    }

    /// Resolve to an absolute value, using `against` as the denominator for
    /// proportional lengths.
    pub fn resolve(&self, against: f64) -> f64 {
        match self.unit {
            UnitOfMeasure::Points => self.value,
            UnitOfMeasure::Percentage => self.value * against,
        }
    }
}

/// Fixed amounts on each edge of a rectangle.
///
/// Used both for a block's own insets and for padding contributed by
/// facets such as borders.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Insets {
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    /// Create uniform insets.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Total horizontal amount.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Total vertical amount.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl std::ops::Add for Insets {
    type Output = Insets;

    fn add(self, rhs: Insets) -> Insets {
        Insets {
            top: self.top + rhs.top,
            left: self.left + rhs.left,
            bottom: self.bottom + rhs.bottom,
            right: self.right + rhs.right,
        }
    }
}

impl std::iter::Sum for Insets {
    fn sum<I: Iterator<Item = Insets>>(iter: I) -> Insets {
        iter.fold(Insets::ZERO, |acc, i| acc + i)
    }
}

/// Alignment-anchor corrections for a block.
///
/// Horizontal offsets (`left`, `right`, `center`) resolve against the
/// container's width; vertical ones (`top`, `bottom`, `middle`) against its
/// height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offsets {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
    pub center: Length,
    pub middle: Length,
}

impl Offsets {
    pub fn with_top(mut self, top: Length) -> Self {
        self.top = top;
        self
    }

    pub fn with_bottom(mut self, bottom: Length) -> Self {
        self.bottom = bottom;
        self
    }

    pub fn with_left(mut self, left: Length) -> Self {
        self.left = left;
        self
    }

    pub fn with_right(mut self, right: Length) -> Self {
        self.right = right;
        self
    }

    pub fn with_center(mut self, center: Length) -> Self {
        self.center = center;
        self
    }

    pub fn with_middle(mut self, middle: Length) -> Self {
        self.middle = middle;
        self
    }
}
