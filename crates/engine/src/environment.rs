//! Interfaces to the environment the engine runs in.
//!
//! The engine never measures or draws anything itself. Pointer samples land
//! in a shared [`RawPointer`] cell, geometry is read through
//! [`GeometrySource`], and per-tick placements are handed to a
//! [`RenderSink`].

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use parallax_common::error::{ParallaxError, ParallaxResult};
use parallax_model::geometry::{LayerGeometry, Point2D, RegionGeometry};

use crate::layer::LayerFrame;

/// Latest raw pointer sample, shared between the input side (writer) and
/// the tick side (reader). Last write wins; nothing is queued.
///
/// Single-threaded by construction. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct RawPointer(Rc<Cell<Point2D>>);

impl RawPointer {
    pub fn new(initial: Point2D) -> Self {
        Self(Rc::new(Cell::new(initial)))
    }

    /// Record a new sample.
    pub fn set(&self, point: Point2D) {
        self.0.set(point);
    }

    /// Read the most recent sample.
    pub fn get(&self) -> Point2D {
        self.0.get()
    }
}

/// Measures detection regions and layers.
pub trait GeometrySource {
    /// Content-box rectangle of the detection area named `port`.
    fn region_geometry(&self, port: &str) -> ParallaxResult<RegionGeometry>;

    /// Size, rendered position, and container size of a layer.
    fn layer_geometry(&self, layer: &str) -> ParallaxResult<LayerGeometry>;
}

/// Receives per-tick layer placements.
pub trait RenderSink {
    fn render(&mut self, layer: &str, frame: &LayerFrame);

    /// A layer's frozen indicator changed.
    fn set_frozen(&mut self, _layer: &str, _class: &str, _frozen: bool) {}
}

/// Fixed geometry, for offline replay and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    pub region: RegionGeometry,
    pub layers: HashMap<String, LayerGeometry>,
}

impl StaticGeometry {
    pub fn new(region: RegionGeometry) -> Self {
        Self {
            region,
            layers: HashMap::new(),
        }
    }

    pub fn with_layer(mut self, id: impl Into<String>, geometry: LayerGeometry) -> Self {
        self.layers.insert(id.into(), geometry);
        self
    }
}

impl GeometrySource for StaticGeometry {
    fn region_geometry(&self, _port: &str) -> ParallaxResult<RegionGeometry> {
        Ok(self.region)
    }

    fn layer_geometry(&self, layer: &str) -> ParallaxResult<LayerGeometry> {
        self.layers
            .get(layer)
            .copied()
            .ok_or_else(|| ParallaxError::geometry(format!("no geometry for layer {layer:?}")))
    }
}

/// A sink that keeps everything it is given.
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    pub frames: Vec<(String, LayerFrame)>,
    pub frozen: HashMap<String, bool>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent frame rendered for `layer`.
    pub fn last_frame(&self, layer: &str) -> Option<&LayerFrame> {
        self.frames
            .iter()
            .rev()
            .find(|(id, _)| id == layer)
            .map(|(_, frame)| frame)
    }

    pub fn is_frozen(&self, layer: &str) -> bool {
        self.frozen.get(layer).copied().unwrap_or(false)
    }

    /// Drain recorded frames, keeping frozen state.
    pub fn take_frames(&mut self) -> Vec<(String, LayerFrame)> {
        std::mem::take(&mut self.frames)
    }
}

impl RenderSink for FrameRecorder {
    fn render(&mut self, layer: &str, frame: &LayerFrame) {
        self.frames.push((layer.to_string(), *frame));
    }

    fn set_frozen(&mut self, layer: &str, _class: &str, frozen: bool) {
        self.frozen.insert(layer.to_string(), frozen);
    }
}
