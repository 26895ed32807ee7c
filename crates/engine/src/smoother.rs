//! Decay-based pointer easing.
//!
//! Each tick the distance to the target shrinks by the factor `decay`, so
//! `decay = 0` snaps immediately and values near 1 approach slowly. Pure
//! exponential decay never closes the gap, so an episode is declared
//! arrived once every tracked axis is within the caller's threshold
//! (normally one device pixel in normalized space). Arrival latches: an
//! arrived smoother follows its target exactly until it is replaced.

use parallax_model::geometry::{Axes, Axis, Pointer};
use parallax_model::options::ParallaxOptions;

use crate::transform::AxisTransformConfig;

/// One smoothing episode.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSmoother {
    pointer: Pointer,
    on_target: bool,
    decay: f64,
    enabled: Axes<bool>,
}

impl PointerSmoother {
    /// Start an episode at `start`. `decay` is clamped to `[0, 1]`.
    /// Disabled axes stay unset.
    pub fn new(enabled: Axes<bool>, decay: f64, start: Pointer) -> Self {
        Self {
            pointer: start.masked(enabled),
            on_target: false,
            decay: clamp_decay(decay),
            enabled,
        }
    }

    /// Start an episode configured from options, at `start` or the center.
    pub fn from_options(options: &ParallaxOptions, start: Option<Pointer>) -> Self {
        Self::new(
            AxisTransformConfig::enabled_axes(options),
            options.decay,
            start.unwrap_or(Pointer::CENTER),
        )
    }

    /// Replace the decay when an override is given.
    pub fn with_decay(mut self, decay: Option<f64>) -> Self {
        if let Some(decay) = decay {
            self.decay = clamp_decay(decay);
        }
        self
    }

    /// Advance one tick toward `target`. Returns whether the episode has arrived.
    pub fn update(&mut self, target: Pointer, threshold: Axes<f64>) -> bool {
        if self.on_target {
            self.pointer = target;
            return true;
        }

        if self.within(target, threshold) {
            tracing::trace!(?target, "Smoothing episode arrived");
            self.on_target = true;
            self.pointer = target;
            return true;
        }

        let decay = self.decay;
        let enabled = self.enabled;
        let current = self.pointer;
        self.pointer = target.map(|axis, goal| {
            if !enabled[axis] {
                return None;
            }
            match (goal, current[axis]) {
                (Some(goal), Some(now)) => Some(goal + decay * (now - goal)),
                (Some(goal), None) => Some(goal),
                (None, now) => now,
            }
        });
        false
    }

    /// Whether every tracked axis is closer to `target` than `threshold`.
    fn within(&self, target: Pointer, threshold: Axes<f64>) -> bool {
        Axis::BOTH.iter().all(|&axis| {
            if !self.enabled[axis] {
                return true;
            }
            match (target[axis], self.pointer[axis]) {
                (Some(goal), Some(now)) => (goal - now).abs() < threshold[axis],
                (None, _) => true,
                (Some(_), None) => false,
            }
        })
    }

    /// Current smoothed pointer.
    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Whether this episode has arrived.
    pub fn on_target(&self) -> bool {
        self.on_target
    }

    pub fn decay(&self) -> f64 {
        self.decay
    }
}

fn clamp_decay(decay: f64) -> f64 {
    if decay.is_nan() {
        return 0.0;
    }
    decay.clamp(0.0, 1.0)
}
