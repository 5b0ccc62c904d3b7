//! Page-space boxes.
//!
//! Coordinates follow the extraction tool: `x` grows to the right and `y`
//! grows downward, so a box's `top` is numerically smaller than its
//! `bottom`.

use serde::{Deserialize, Serialize};

/// Axis-aligned box of a fragment, run or media region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

impl Rect {
    /// Box from its top-left corner and size.
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let word = Rect::new(72.0, 100.0, 34.5, 11.0);
    /// assert_eq!(word.right(), 106.5);
    /// assert_eq!(word.bottom(), 111.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanning `(left, top)` to `(right, bottom)`.
    pub fn from_points(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Left edge.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Bounding box of both boxes.
    ///
    /// A raised superscript pulls the top of its parent's box upward:
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let parent = Rect::new(100.0, 100.0, 40.0, 18.0);
    /// let script = Rect::new(140.5, 94.0, 6.0, 10.0);
    /// let merged = parent.union(&script);
    /// assert_eq!(merged.top(), 94.0);
    /// assert_eq!(merged.right(), 146.5);
    /// assert_eq!(merged.bottom(), 118.0);
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_points(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Distance from this box's right edge to `next`'s left edge.
    ///
    /// Negative when the boxes overlap horizontally.
    ///
    /// ```
    /// use layout_oxide::geometry::Rect;
    ///
    /// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect::new(13.0, 0.0, 10.0, 10.0);
    /// assert_eq!(a.horizontal_gap(&b), 3.0);
    /// assert_eq!(b.horizontal_gap(&a), -23.0);
    /// ```
    pub fn horizontal_gap(&self, next: &Rect) -> f32 {
        next.left() - self.right()
    }

    /// Whether every coordinate is finite and the size is non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}
