//! Parsing of per-axis transform configuration.
//!
//! The loose option values (`true`, `0.4`, `"40%"`, `"40px"`, `"left"`) are
//! resolved here, once, into [`AxisTransformConfig`]. Malformed values
//! degrade the affected axis to its documented default with a warning.

use parallax_common::error::{ParallaxError, ParallaxResult};
use parallax_model::geometry::{Axes, Axis};
use parallax_model::options::{AxisSpec, CoordSpec, OriginSpec, ParallaxOptions};

/// Anchor used when an origin string is not recognised.
pub const FALLBACK_ORIGIN: f64 = 1.0;

/// How an axis responds to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisTransform {
    /// The axis does not move.
    Disabled,
    /// Travel as a fraction of the free space (`1.0` = full travel).
    Ratio(f64),
    /// Travel an absolute number of pixels.
    Pixel(f64),
}

impl AxisTransform {
    /// Parse a configured axis value.
    ///
    /// A zero factor or extent parses as [`AxisTransform::Disabled`]: the
    /// axis then contributes nothing and the inverse never divides by zero.
    pub fn parse(spec: &AxisSpec) -> ParallaxResult<AxisTransform> {
        let transform = match spec {
            AxisSpec::Flag(true) => AxisTransform::Ratio(1.0),
            AxisSpec::Flag(false) => AxisTransform::Disabled,
            AxisSpec::Number(n) if n.is_finite() => AxisTransform::Ratio(*n),
            AxisSpec::Number(n) => {
                return Err(ParallaxError::config(format!("parallax factor {n} is not finite")))
            }
            AxisSpec::Text(text) => {
                if let Some(extent) = with_unit(text, "px") {
                    AxisTransform::Pixel(extent)
                } else if let Some(percent) = with_unit(text, "%") {
                    AxisTransform::Ratio(percent / 100.0)
                } else if let Ok(n) = text.trim().parse::<f64>() {
                    if !n.is_finite() {
                        return Err(ParallaxError::config(format!(
                            "parallax factor {text:?} is not finite"
                        )));
                    }
                    AxisTransform::Ratio(n)
                } else {
                    return Err(ParallaxError::config(format!(
                        "unrecognised parallax value {text:?}"
                    )));
                }
            }
        };

        Ok(match transform {
            AxisTransform::Ratio(f) | AxisTransform::Pixel(f) if f == 0.0 => {
                AxisTransform::Disabled
            }
            other => other,
        })
    }

    /// Multiplier applied to the pointer: a ratio, or a pixel count.
    pub fn factor(&self) -> f64 {
        match self {
            AxisTransform::Disabled => 0.0,
            AxisTransform::Ratio(f) | AxisTransform::Pixel(f) => *f,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, AxisTransform::Disabled)
    }
}

/// Immutable transform configuration for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisTransformConfig {
    pub transform: AxisTransform,
    /// Anchor in `[0, 1]`.
    pub origin: f64,
}

impl AxisTransformConfig {
    pub fn new(transform: AxisTransform, origin: f64) -> Self {
        Self {
            transform,
            origin: origin.clamp(0.0, 1.0),
        }
    }

    /// Resolve one axis from options, falling back on malformed values.
    pub fn from_options(options: &ParallaxOptions, axis: Axis) -> Self {
        let transform = AxisTransform::parse(options.parallax(axis)).unwrap_or_else(|e| {
            tracing::warn!(?axis, error = %e, "Disabling axis with malformed parallax value");
            AxisTransform::Disabled
        });
        let origin = parse_origin(options.origin(axis)).unwrap_or_else(|e| {
            tracing::warn!(?axis, error = %e, "Using fallback origin");
            FALLBACK_ORIGIN
        });
        Self::new(transform, origin)
    }

    /// Both axes from options.
    pub fn pair_from_options(options: &ParallaxOptions) -> Axes<AxisTransformConfig> {
        Axes::new(
            Self::from_options(options, Axis::X),
            Self::from_options(options, Axis::Y),
        )
    }

    /// Which axes respond to the pointer once parsed. Malformed values count
    /// as disabled, matching [`AxisTransformConfig::from_options`].
    pub fn enabled_axes(options: &ParallaxOptions) -> Axes<bool> {
        Axes::new(Axis::X, Axis::Y).map(|_, axis| {
            AxisTransform::parse(options.parallax(axis)).is_ok_and(|transform| transform.is_enabled())
        })
    }

    /// Anchor-relative constant added to the scaled pointer.
    ///
    /// `size` is the layer extent along this axis; only pixel mode uses it.
    pub fn offset(&self, size: f64) -> f64 {
        match self.transform {
            AxisTransform::Disabled => 0.0,
            AxisTransform::Ratio(f) => self.origin * (1.0 - f),
            AxisTransform::Pixel(extent) => self.origin * (size - extent),
        }
    }
}

/// Parse an anchor: a number, a keyword, or a percentage. Clamped to `[0, 1]`.
pub fn parse_origin(spec: &OriginSpec) -> ParallaxResult<f64> {
    let origin = match spec {
        OriginSpec::Number(n) if n.is_finite() => *n,
        OriginSpec::Number(n) => {
            return Err(ParallaxError::config(format!("origin {n} is not finite")))
        }
        OriginSpec::Text(text) => match text.trim() {
            "left" | "top" => 0.0,
            "center" | "middle" => 0.5,
            "right" | "bottom" => 1.0,
            other => with_unit(other, "%")
                .map(|percent| percent / 100.0)
                .ok_or_else(|| ParallaxError::config(format!("unrecognised origin {other:?}")))?,
        },
    };
    Ok(origin.clamp(0.0, 1.0))
}

/// Parse a freeze coordinate: a normalized number or a percentage string.
pub fn parse_coord(spec: &CoordSpec) -> ParallaxResult<f64> {
    let value = match spec {
        CoordSpec::Number(n) => *n,
        CoordSpec::Text(text) => match with_unit(text, "%") {
            Some(percent) => percent / 100.0,
            None => text.trim().parse::<f64>().map_err(|_| {
                ParallaxError::config(format!("unrecognised freeze coordinate {text:?}"))
            })?,
        },
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParallaxError::config("freeze coordinate is not finite"))
    }
}

/// A non-negative number followed by `unit`, optionally separated by whitespace.
fn with_unit(text: &str, unit: &str) -> Option<f64> {
    let number = text.trim().strip_suffix(unit)?.trim_end();
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    number.parse().ok()
}
