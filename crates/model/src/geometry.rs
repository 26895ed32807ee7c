//! Axis-indexed geometry types.
//!
//! Raw coordinates are device pixels; a [`Pointer`] is normalized to
//! `[0.0, 1.0]` per axis, with `None` on axes that are not tracked.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two screen axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// CSS property that positions a layer along this axis.
    pub fn position_property(self) -> &'static str {
        match self {
            Axis::X => "left",
            Axis::Y => "top",
        }
    }

    /// CSS property that carries the margin correction along this axis.
    pub fn margin_property(self) -> &'static str {
        match self {
            Axis::X => "margin-left",
            Axis::Y => "margin-top",
        }
    }
}

/// A value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Axes<T> {
    pub x: T,
    pub y: T,
}

impl<T> Axes<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// Apply `f` to each axis value.
    pub fn map<U>(self, mut f: impl FnMut(Axis, T) -> U) -> Axes<U> {
        Axes {
            x: f(Axis::X, self.x),
            y: f(Axis::Y, self.y),
        }
    }

    /// Iterate `(axis, value)` pairs, horizontal first.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        [(Axis::X, &self.x), (Axis::Y, &self.y)].into_iter()
    }
}

impl<T: Clone> Axes<T> {
    /// The same value on both axes.
    pub fn splat(value: T) -> Self {
        Self {
            x: value.clone(),
            y: value,
        }
    }
}

impl<T> Index<Axis> for Axes<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

impl<T> IndexMut<Axis> for Axes<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

/// A normalized pointer. Untracked axes are `None`.
pub type Pointer = Axes<Option<f64>>;

impl Axes<Option<f64>> {
    /// Resting pointer used before any sample has been seen.
    pub const CENTER: Pointer = Axes::new(Some(0.5), Some(0.5));

    /// A pointer with both axes set.
    pub fn at(x: f64, y: f64) -> Pointer {
        Axes::new(Some(x), Some(y))
    }

    /// Keep only the axes enabled in `mask`.
    pub fn masked(self, mask: Axes<bool>) -> Pointer {
        self.map(|axis, value| value.filter(|_| mask[axis]))
    }
}

/// A 2D point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Rectangle of a detection region in device pixels.
///
/// `position` is the content-box origin: the external measurement has
/// already added border and padding to the element offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionGeometry {
    pub position: Point2D,
    pub size: Size2D,
}

impl RegionGeometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: Point2D::new(x, y),
            size: Size2D::new(width, height),
        }
    }
}

/// Measured state of a rendered layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerGeometry {
    /// Outer size of the layer.
    pub size: Size2D,

    /// Current rendered position relative to the offset parent.
    pub position: Point2D,

    /// Outer size of the offset parent the layer is positioned in.
    pub container: Size2D,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_indexing() {
        let mut axes = Axes::new(1, 2);
        assert_eq!(axes[Axis::X], 1);
        axes[Axis::Y] = 5;
        assert_eq!(axes.y, 5);
    }

    #[test]
    fn test_pointer_masking() {
        let pointer = Pointer::at(0.2, 0.8).masked(Axes::new(true, false));
        assert_eq!(pointer, Axes::new(Some(0.2), None));
    }
}
