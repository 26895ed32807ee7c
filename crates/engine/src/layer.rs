//! Parallax layers: the forward and inverse pointer transforms.
//!
//! For a tracked axis the layer position is
//! `pos = factor * pointer + offset`. In ratio mode `pos` is a fraction of
//! the free space and renders as a percentage position with a margin of
//! `-pos * size`; in pixel mode the position stays pinned at the anchor
//! percentage and the whole movement goes into a `-pos` pixel margin.

use std::fmt;

use serde::{Deserialize, Serialize};

use parallax_model::geometry::{Axes, Axis, LayerGeometry, Pointer, Size2D};
use parallax_model::options::ParallaxOptions;

use crate::transform::{AxisTransform, AxisTransformConfig};

/// Placement of a layer along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPlacement {
    /// Position as a percentage of the containing block.
    pub position_percent: f64,
    /// Margin correction in pixels.
    pub margin_px: f64,
}

impl AxisPlacement {
    pub fn css_position(&self) -> String {
        format!("{}%", self.position_percent)
    }

    pub fn css_margin(&self) -> String {
        format!("{}px", self.margin_px)
    }
}

/// Per-tick output for one layer. Untracked axes are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerFrame {
    pub placements: Axes<Option<AxisPlacement>>,
}

impl LayerFrame {
    pub fn placement(&self, axis: Axis) -> Option<AxisPlacement> {
        self.placements[axis]
    }

    /// CSS declarations for this frame, as `(property, value)` pairs.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = Vec::with_capacity(4);
        for (axis, placement) in self.placements.iter() {
            if let Some(placement) = placement {
                declarations.push((axis.position_property(), placement.css_position()));
                declarations.push((axis.margin_property(), placement.css_margin()));
            }
        }
        declarations
    }
}

impl fmt::Display for LayerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declarations = self.css_declarations();
        if declarations.is_empty() {
            return f.write_str("(static)");
        }
        for (i, (property, value)) in declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{property}: {value};")?;
        }
        Ok(())
    }
}

/// One visual layer's transform state.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    config: Axes<AxisTransformConfig>,
    size: Size2D,
}

impl ParallaxLayer {
    pub fn new(config: Axes<AxisTransformConfig>, size: Size2D) -> Self {
        Self { config, size }
    }

    /// Build a layer from options. Configured `width`/`height` take
    /// precedence over the measured size.
    pub fn from_options(options: &ParallaxOptions, measured: Size2D) -> Self {
        let mut layer = Self::new(AxisTransformConfig::pair_from_options(options), measured);
        layer.set_size(measured, options);
        layer
    }

    /// Re-parse the transform configuration.
    pub fn set_parallax(&mut self, options: &ParallaxOptions) {
        self.config = AxisTransformConfig::pair_from_options(options);
    }

    /// Update the layer size, honouring size overrides in `options`.
    pub fn set_size(&mut self, measured: Size2D, options: &ParallaxOptions) {
        self.size = Size2D::new(
            options.size_override(Axis::X).unwrap_or(measured.width),
            options.size_override(Axis::Y).unwrap_or(measured.height),
        );
    }

    pub fn size(&self) -> Size2D {
        self.size
    }

    pub fn config(&self, axis: Axis) -> AxisTransformConfig {
        self.config[axis]
    }

    /// Axes that respond to the pointer.
    pub fn enabled_axes(&self) -> Axes<bool> {
        self.config.map(|_, config| config.transform.is_enabled())
    }

    /// Anchor-relative constant for an axis at the current size.
    pub fn offset(&self, axis: Axis) -> f64 {
        self.config[axis].offset(self.size.get(axis))
    }

    /// `factor * pointer + offset` for a tracked axis.
    pub fn position(&self, axis: Axis, pointer: f64) -> Option<f64> {
        let config = self.config[axis];
        if !config.transform.is_enabled() {
            return None;
        }
        Some(config.transform.factor() * pointer + self.offset(axis))
    }

    /// Forward transform: where the layer goes for `pointer`.
    pub fn update(&self, pointer: Pointer) -> LayerFrame {
        let placements = pointer.map(|axis, value| {
            let pos = self.position(axis, value?)?;
            let config = self.config[axis];
            Some(match config.transform {
                AxisTransform::Pixel(_) => AxisPlacement {
                    position_percent: config.origin * 100.0,
                    margin_px: 0.0 - pos,
                },
                _ => AxisPlacement {
                    position_percent: pos * 100.0,
                    margin_px: 0.0 - pos * self.size.get(axis),
                },
            })
        });
        LayerFrame { placements }
    }

    /// Inverse transform: the pointer that would put the layer where it
    /// currently renders.
    ///
    /// Axes that are untracked or cannot be solved (the layer fills its
    /// container, or the result is not finite) are `None`.
    pub fn pointer_from(&self, geometry: &LayerGeometry) -> Pointer {
        Axes::new((), ()).map(|axis, ()| {
            let config = self.config[axis];
            let rendered = geometry.position.get(axis);
            let container = geometry.container.get(axis);
            let size = self.size.get(axis);

            let pos = match config.transform {
                AxisTransform::Disabled => return None,
                AxisTransform::Ratio(_) => {
                    let free = container - size;
                    if free.abs() < f64::EPSILON {
                        return None;
                    }
                    rendered / free
                }
                AxisTransform::Pixel(_) => config.origin * container - rendered,
            };

            let pointer = (pos - self.offset(axis)) / config.transform.factor();
            pointer.is_finite().then_some(pointer)
        })
    }
}
