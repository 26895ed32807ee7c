//! The configuration surface as callers write it.
//!
//! Values here are deliberately loose (booleans, numbers, or strings such as
//! `"40px"` and `"50%"`). The engine parses them once, when a layer is bound,
//! into typed transforms; nothing downstream branches on the raw shape.

use serde::{Deserialize, Serialize};

use crate::geometry::Axis;

/// Per-axis parallax response as written in configuration.
///
/// Accepts `true`/`false`, a ratio number, a percentage string (`"50%"`),
/// or a pixel-length string (`"40px"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl Default for AxisSpec {
    fn default() -> Self {
        AxisSpec::Flag(true)
    }
}

/// Anchor point as written in configuration: a number, a keyword
/// (`left`, `center`, `middle`, `right`, `top`, `bottom`), or a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OriginSpec {
    Number(f64),
    Text(String),
}

impl Default for OriginSpec {
    fn default() -> Self {
        OriginSpec::Number(0.5)
    }
}

/// A freeze coordinate: a normalized number or a percentage string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordSpec {
    Number(f64),
    Text(String),
}

/// Global options shared by every layer bound to one detection region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxOptions {
    /// Detection-area target (an opaque handle for the geometry source).
    pub mouseport: String,

    pub xparallax: AxisSpec,
    pub yparallax: AxisSpec,

    pub xorigin: OriginSpec,
    pub yorigin: OriginSpec,

    /// Fraction of remaining distance retained per tick (0 instant, 1 never).
    pub decay: f64,

    /// Tick interval hint for the external scheduler (milliseconds).
    pub frame_duration: u64,

    /// Styling hook applied to a layer once its freeze has settled.
    pub freeze_class: String,

    /// Treat the region as active even while the pointer is outside it.
    pub active_outside: bool,

    /// Explicit layer size, overriding measurement.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        Self {
            mouseport: "body".to_string(),
            xparallax: AxisSpec::Flag(true),
            yparallax: AxisSpec::Flag(true),
            xorigin: OriginSpec::Number(0.5),
            yorigin: OriginSpec::Number(0.5),
            decay: 0.66,
            frame_duration: 30,
            freeze_class: "freeze".to_string(),
            active_outside: false,
            width: None,
            height: None,
        }
    }
}

impl ParallaxOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn parallax(&self, axis: Axis) -> &AxisSpec {
        match axis {
            Axis::X => &self.xparallax,
            Axis::Y => &self.yparallax,
        }
    }

    pub fn origin(&self, axis: Axis) -> &OriginSpec {
        match axis {
            Axis::X => &self.xorigin,
            Axis::Y => &self.yorigin,
        }
    }

    /// Explicit size override for an axis, if configured.
    pub fn size_override(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Options for one layer: these options with `overrides` applied on top.
    pub fn with_overrides(&self, overrides: &LayerOverrides) -> ParallaxOptions {
        let mut merged = self.clone();
        if let Some(spec) = &overrides.xparallax {
            merged.xparallax = spec.clone();
        }
        if let Some(spec) = &overrides.yparallax {
            merged.yparallax = spec.clone();
        }
        if let Some(spec) = &overrides.xorigin {
            merged.xorigin = spec.clone();
        }
        if let Some(spec) = &overrides.yorigin {
            merged.yorigin = spec.clone();
        }
        if let Some(decay) = overrides.decay {
            merged.decay = decay;
        }
        if overrides.width.is_some() {
            merged.width = overrides.width;
        }
        if overrides.height.is_some() {
            merged.height = overrides.height;
        }
        merged
    }
}

/// Per-layer option overrides, merged over [`ParallaxOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOverrides {
    pub xparallax: Option<AxisSpec>,
    pub yparallax: Option<AxisSpec>,
    pub xorigin: Option<OriginSpec>,
    pub yorigin: Option<OriginSpec>,
    pub decay: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let options = ParallaxOptions::default();
        assert_eq!(options.mouseport, "body");
        assert_eq!(options.decay, 0.66);
        assert_eq!(options.frame_duration, 30);
        assert_eq!(options.freeze_class, "freeze");
        assert_eq!(options.xorigin, OriginSpec::Number(0.5));
        assert!(!options.active_outside);
    }

    #[test]
    fn test_parse_mixed_value_shapes() {
        let json = r#"{
            "xparallax": "40px",
            "yparallax": 0.25,
            "xorigin": "left",
            "yorigin": "30%",
            "frameDuration": 16,
            "activeOutside": true
        }"#;
        let options = ParallaxOptions::from_json(json).unwrap();
        assert_eq!(options.xparallax, AxisSpec::Text("40px".to_string()));
        assert_eq!(options.yparallax, AxisSpec::Number(0.25));
        assert_eq!(options.xorigin, OriginSpec::Text("left".to_string()));
        assert_eq!(options.frame_duration, 16);
        assert!(options.active_outside);
        assert_eq!(options.decay, 0.66);
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let base = ParallaxOptions::default();
        let overrides = LayerOverrides {
            xparallax: Some(AxisSpec::Number(0.2)),
            decay: Some(0.9),
            ..Default::default()
        };
        let merged = base.with_overrides(&overrides);
        assert_eq!(merged.xparallax, AxisSpec::Number(0.2));
        assert_eq!(merged.yparallax, AxisSpec::Flag(true));
        assert_eq!(merged.decay, 0.9);
        assert_eq!(merged.freeze_class, "freeze");
    }
}
