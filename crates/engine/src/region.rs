//! Detection regions: containment tracking and pointer normalization.
//!
//! Containment changes are edge-triggered by enter/leave notifications and
//! take effect immediately; normalization only happens when a tick asks for
//! it. A leave leaves the region in [`Containment::JustLeft`] so that the
//! next tick still sees the departure coordinates as its final sample.

use parallax_model::geometry::{Axes, Pointer, Point2D, RegionGeometry};
use parallax_model::options::ParallaxOptions;

use crate::transform::AxisTransformConfig;

/// Whether the pointer is within a detection region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Containment {
    #[default]
    Outside,
    Inside,
    /// Left since the last tick; one more sample is still owed.
    JustLeft,
}

/// A rectangular detection area.
#[derive(Debug, Clone)]
pub struct DetectionRegion {
    geometry: RegionGeometry,
    threshold: Axes<f64>,
    enabled: Axes<bool>,
    active_outside: bool,
    containment: Containment,
    leave_coords: Option<Point2D>,
    pointer: Pointer,
    active: bool,
}

impl DetectionRegion {
    /// Create a region tracking `enabled` axes.
    pub fn new(geometry: RegionGeometry, enabled: Axes<bool>, active_outside: bool) -> Self {
        let mut region = Self {
            geometry,
            threshold: Axes::splat(f64::INFINITY),
            enabled,
            active_outside,
            containment: Containment::Outside,
            leave_coords: None,
            pointer: Pointer::CENTER.masked(enabled),
            active: false,
        };
        region.update_geometry(geometry);
        region
    }

    pub fn from_options(options: &ParallaxOptions, geometry: RegionGeometry) -> Self {
        Self::new(
            geometry,
            AxisTransformConfig::enabled_axes(options),
            options.active_outside,
        )
    }

    /// Replace the measured rectangle and recompute the arrival threshold:
    /// the size of one device pixel in normalized space.
    ///
    /// A zero-sized axis gets an infinite threshold and never yields a
    /// normalized value.
    pub fn update_geometry(&mut self, geometry: RegionGeometry) {
        self.geometry = geometry;
        self.threshold = Axes::new(geometry.size.width, geometry.size.height).map(|axis, size| {
            if has_extent(size) {
                1.0 / size
            } else {
                tracing::warn!(?axis, size, "Detection region has no extent on axis");
                f64::INFINITY
            }
        });
    }

    /// The pointer entered the region.
    pub fn on_enter(&mut self) {
        tracing::debug!(from = ?self.containment, "Pointer entered detection region");
        self.containment = Containment::Inside;
        self.leave_coords = None;
    }

    /// The pointer left the region at `coords` (raw device pixels).
    pub fn on_leave(&mut self, coords: Point2D) {
        if self.containment != Containment::Inside {
            tracing::debug!(state = ?self.containment, "Ignoring leave while not inside");
            return;
        }
        tracing::debug!(x = coords.x, y = coords.y, "Pointer left detection region");
        self.containment = Containment::JustLeft;
        self.leave_coords = Some(coords);
    }

    /// Normalize a raw pointer against the region.
    ///
    /// Returns `None` while the region is not active. Each tracked axis is
    /// clamped into `[0, 1]`; untracked or zero-sized axes are `None`.
    /// After a leave, the cached departure coordinates are used exactly once.
    pub fn normalize(&mut self, raw: Point2D) -> Option<Pointer> {
        let coords = match self.containment {
            Containment::Inside => raw,
            Containment::JustLeft => {
                self.containment = Containment::Outside;
                self.leave_coords.take().unwrap_or(raw)
            }
            Containment::Outside if self.active_outside => raw,
            Containment::Outside => {
                self.active = false;
                return None;
            }
        };

        let geometry = self.geometry;
        let enabled = self.enabled;
        let pointer = Axes::new(coords.x, coords.y).map(|axis, value| {
            let size = geometry.size.get(axis);
            if !enabled[axis] || !has_extent(size) || !value.is_finite() {
                return None;
            }
            let ratio = (value - geometry.position.get(axis)) / size;
            Some(ratio.clamp(0.0, 1.0))
        });

        self.pointer = pointer;
        self.active = true;
        Some(pointer)
    }

    /// The most recent normalized pointer. Kept while inactive.
    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Per-axis arrival tolerance in normalized space.
    pub fn threshold(&self) -> Axes<f64> {
        self.threshold
    }

    /// Whether the last normalization produced a pointer.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn containment(&self) -> Containment {
        self.containment
    }

    pub fn geometry(&self) -> RegionGeometry {
        self.geometry
    }
}

fn has_extent(size: f64) -> bool {
    size.is_finite() && size > 0.0
}
