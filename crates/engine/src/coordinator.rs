//! Per-tick orchestration of a detection region, the global smoother, and
//! every layer bound to them.
//!
//! Each tick is broadcast to every bound layer. The shared work (normalizing
//! the raw pointer and advancing the global smoother) runs once per distinct
//! timestamp, whichever layer sees the tick first. Each layer is then driven
//! by one smoother:
//!
//! 1. its freeze override, when frozen;
//! 2. otherwise its local episode, while one is running (initial seeding or
//!    resuming after an unfreeze);
//! 3. otherwise the global smoother.
//!
//! Layers detach from the tick loop once there is nothing left to animate:
//! a frozen layer when its override arrives, a live layer when the global
//! smoother has arrived and the region is no longer active.

use parallax_common::error::{ParallaxError, ParallaxResult};
use parallax_model::event::{FreezeCommand, TimestampMs, UnfreezeCommand};
use parallax_model::geometry::{Axes, Axis, Point2D, Pointer, RegionGeometry};
use parallax_model::options::{CoordSpec, LayerOverrides, ParallaxOptions};

use crate::environment::{GeometrySource, RawPointer, RenderSink};
use crate::layer::{LayerFrame, ParallaxLayer};
use crate::region::DetectionRegion;
use crate::smoother::PointerSmoother;
use crate::transform::parse_coord;

/// A layer to attach, with its option overrides.
#[derive(Debug, Clone, Default)]
pub struct LayerBinding {
    pub id: String,
    pub overrides: LayerOverrides,
}

impl LayerBinding {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            overrides: LayerOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: LayerOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Where a layer's pointer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStatus {
    /// Following the live pointer.
    Live,
    /// Easing toward a frozen target.
    Freezing,
    /// Settled on a frozen target; the freeze class is applied.
    Frozen,
}

/// A fixed target substituted for the live pointer, with its own episode.
#[derive(Debug, Clone)]
struct FreezeOverride {
    target: Pointer,
    smoother: PointerSmoother,
}

#[derive(Debug, Clone)]
struct LayerSlot {
    id: String,
    options: ParallaxOptions,
    layer: ParallaxLayer,
    local: Option<PointerSmoother>,
    freeze: Option<FreezeOverride>,
    bound: bool,
    status: LayerStatus,
}

impl LayerSlot {
    /// The smoother currently driving this layer, if it is not the global one.
    fn own_smoother(&self) -> Option<&PointerSmoother> {
        self.freeze
            .as_ref()
            .map(|freeze| &freeze.smoother)
            .or(self.local.as_ref())
    }

    fn bind(&mut self) {
        if !self.bound {
            tracing::debug!(layer = %self.id, "Layer bound to tick loop");
        }
        self.bound = true;
    }

    fn unbind(&mut self) {
        tracing::debug!(layer = %self.id, status = ?self.status, "Layer detached from tick loop");
        self.bound = false;
    }
}

/// Drives a set of layers sharing one detection region.
#[derive(Debug)]
pub struct FrameCoordinator {
    options: ParallaxOptions,
    raw: RawPointer,
    region: DetectionRegion,
    global: PointerSmoother,
    last_timestamp: Option<TimestampMs>,
    layers: Vec<LayerSlot>,
}

impl FrameCoordinator {
    /// Set up the region, the global smoother, and every layer.
    ///
    /// Each layer starts with a local episode seeded from where it currently
    /// renders, so its first tick does not jump. Layers start unbound; they
    /// join the tick loop on region entry, freeze, or unfreeze. With
    /// `active_outside` the region is always active, so layers start bound.
    /// Geometry failures degrade to empty geometry with a warning.
    pub fn new(
        options: ParallaxOptions,
        raw: RawPointer,
        geometry: &dyn GeometrySource,
        bindings: impl IntoIterator<Item = LayerBinding>,
    ) -> Self {
        let region_geometry = geometry
            .region_geometry(&options.mouseport)
            .unwrap_or_else(|e| {
                tracing::warn!(port = %options.mouseport, error = %e, "Region measurement failed");
                RegionGeometry::default()
            });
        let region = DetectionRegion::from_options(&options, region_geometry);
        let global = PointerSmoother::from_options(&options, None);

        let layers = bindings
            .into_iter()
            .map(|binding| Self::attach(&options, geometry, binding))
            .collect::<Vec<_>>();

        tracing::info!(
            port = %options.mouseport,
            layers = layers.len(),
            "Parallax coordinator ready"
        );

        Self {
            options,
            raw,
            region,
            global,
            last_timestamp: None,
            layers,
        }
    }

    fn attach(
        options: &ParallaxOptions,
        geometry: &dyn GeometrySource,
        binding: LayerBinding,
    ) -> LayerSlot {
        let layer_options = options.with_overrides(&binding.overrides);
        let measured = geometry.layer_geometry(&binding.id).unwrap_or_else(|e| {
            tracing::warn!(layer = %binding.id, error = %e, "Layer measurement failed");
            Default::default()
        });

        let layer = ParallaxLayer::from_options(&layer_options, measured.size);
        let seed = layer
            .pointer_from(&measured)
            .map(|axis, value| value.or(Pointer::CENTER[axis]));
        tracing::debug!(layer = %binding.id, ?seed, "Seeded layer from rendered position");

        LayerSlot {
            local: Some(PointerSmoother::from_options(&layer_options, Some(seed))),
            id: binding.id,
            options: layer_options,
            layer,
            freeze: None,
            bound: options.active_outside,
            status: LayerStatus::Live,
        }
    }

    /// The pointer entered the detection region.
    ///
    /// Starts a new global episode from the current global pointer and binds
    /// every layer that is not frozen.
    pub fn on_enter(&mut self) {
        self.region.on_enter();
        self.global = PointerSmoother::from_options(&self.options, Some(self.global.pointer()));
        for slot in self.layers.iter_mut().filter(|slot| slot.freeze.is_none()) {
            slot.bind();
        }
    }

    /// The pointer left the detection region at `coords`.
    pub fn on_leave(&mut self, coords: Point2D) {
        self.region.on_leave(coords);
    }

    /// Record a raw pointer sample.
    pub fn on_pointer(&self, point: Point2D) {
        self.raw.set(point);
    }

    /// Re-measure the region and every layer.
    pub fn refresh_geometry(&mut self, geometry: &dyn GeometrySource) {
        match geometry.region_geometry(&self.options.mouseport) {
            Ok(region) => self.region.update_geometry(region),
            Err(e) => tracing::warn!(error = %e, "Region re-measurement failed"),
        }
        for slot in &mut self.layers {
            match geometry.layer_geometry(&slot.id) {
                Ok(measured) => slot.layer.set_size(measured.size, &slot.options),
                Err(e) => tracing::warn!(layer = %slot.id, error = %e, "Layer re-measurement failed"),
            }
        }
    }

    /// Replace the region rectangle directly.
    pub fn set_region_geometry(&mut self, geometry: RegionGeometry) {
        self.region.update_geometry(geometry);
    }

    /// Replace a layer's overrides and re-parse its transform.
    ///
    /// A running local episode restarts from its current pointer so that it
    /// tracks the new axes.
    pub fn set_parallax(&mut self, id: &str, overrides: &LayerOverrides) -> ParallaxResult<()> {
        let options = self.options.with_overrides(overrides);
        let slot = find_slot(&mut self.layers, id)?;
        slot.layer.set_parallax(&options);
        slot.local = slot
            .local
            .as_ref()
            .map(|local| PointerSmoother::from_options(&options, Some(local.pointer())));
        tracing::debug!(layer = %id, enabled = ?slot.layer.enabled_axes(), "Layer parallax updated");
        slot.options = options;
        Ok(())
    }

    /// Freeze a layer on a fixed target.
    ///
    /// Omitted or malformed coordinates keep the layer's current pointer on
    /// that axis. The new episode starts where the layer currently is.
    pub fn freeze(&mut self, id: &str, command: &FreezeCommand) -> ParallaxResult<()> {
        let global_pointer = self.global.pointer();
        let options = &self.options;
        let slot = find_slot(&mut self.layers, id)?;

        let current = slot
            .own_smoother()
            .map(PointerSmoother::pointer)
            .unwrap_or(global_pointer);
        let resolve = |axis: Axis, spec: Option<&CoordSpec>| {
            spec.and_then(|spec| {
                parse_coord(spec)
                    .map_err(|e| {
                        tracing::warn!(layer = %id, ?axis, error = %e, "Ignoring freeze coordinate");
                    })
                    .ok()
            })
            .or(current[axis])
        };
        let target = Axes::new(
            resolve(Axis::X, command.x.as_ref()),
            resolve(Axis::Y, command.y.as_ref()),
        );

        tracing::debug!(layer = %id, ?target, decay = ?command.decay, "Freezing layer");
        slot.freeze = Some(FreezeOverride {
            target,
            smoother: PointerSmoother::from_options(options, Some(current))
                .with_decay(command.decay),
        });
        slot.local = None;
        slot.status = LayerStatus::Freezing;
        slot.bind();
        Ok(())
    }

    /// Release a frozen layer back to the live pointer.
    ///
    /// A new episode eases from the frozen position toward the live pointer.
    /// Unfreezing a layer that is not frozen does nothing.
    pub fn unfreeze(
        &mut self,
        id: &str,
        command: UnfreezeCommand,
        sink: &mut dyn RenderSink,
    ) -> ParallaxResult<()> {
        let options = &self.options;
        let slot = find_slot(&mut self.layers, id)?;
        let Some(freeze) = slot.freeze.take() else {
            tracing::debug!(layer = %id, "Unfreeze ignored: layer is not frozen");
            return Ok(());
        };

        let resume = freeze.smoother.pointer();
        tracing::debug!(layer = %id, ?resume, decay = ?command.decay, "Unfreezing layer");
        slot.local =
            Some(PointerSmoother::from_options(options, Some(resume)).with_decay(command.decay));
        slot.status = LayerStatus::Live;
        sink.set_frozen(&slot.id, &options.freeze_class, false);
        slot.bind();
        Ok(())
    }

    /// Deliver a tick to every bound layer. Returns how many layers rendered.
    pub fn tick(&mut self, timestamp: TimestampMs, sink: &mut dyn RenderSink) -> usize {
        let mut rendered = 0;
        for index in 0..self.layers.len() {
            if self.layers[index].bound {
                self.tick_slot(index, timestamp, sink);
                rendered += 1;
            }
        }
        rendered
    }

    /// Deliver a tick to one layer.
    ///
    /// Returns `Ok(None)` when the layer is not bound to the tick loop.
    pub fn tick_layer(
        &mut self,
        id: &str,
        timestamp: TimestampMs,
        sink: &mut dyn RenderSink,
    ) -> ParallaxResult<Option<LayerFrame>> {
        let index = self
            .layers
            .iter()
            .position(|slot| slot.id == id)
            .ok_or_else(|| ParallaxError::unknown_layer(id))?;
        if !self.layers[index].bound {
            return Ok(None);
        }
        Ok(Some(self.tick_slot(index, timestamp, sink)))
    }

    /// Run the shared region and global-smoother update once per timestamp.
    fn process_shared(&mut self, timestamp: TimestampMs) {
        if self.last_timestamp == Some(timestamp) {
            return;
        }
        self.last_timestamp = Some(timestamp);

        self.region.normalize(self.raw.get());
        if self.region.is_active() || !self.global.on_target() {
            self.global
                .update(self.region.pointer(), self.region.threshold());
        }
    }

    fn tick_slot(
        &mut self,
        index: usize,
        timestamp: TimestampMs,
        sink: &mut dyn RenderSink,
    ) -> LayerFrame {
        self.process_shared(timestamp);

        let threshold = self.region.threshold();
        let live = self.region.pointer();
        let region_active = self.region.is_active();
        let freeze_class = &self.options.freeze_class;
        let global = &self.global;
        let slot = &mut self.layers[index];

        let pointer = if let Some(freeze) = slot.freeze.as_mut() {
            let arrived = freeze.smoother.update(freeze.target, threshold);
            let pointer = freeze.smoother.pointer();
            if arrived && slot.status != LayerStatus::Frozen {
                slot.status = LayerStatus::Frozen;
                sink.set_frozen(&slot.id, freeze_class, true);
                slot.unbind();
            }
            pointer
        } else if let Some(local) = slot.local.as_mut() {
            let arrived = local.update(live, threshold);
            let pointer = local.pointer();
            if arrived {
                tracing::debug!(layer = %slot.id, "Layer handed over to global pointer");
                slot.local = None;
            }
            pointer
        } else {
            if global.on_target() && !region_active {
                slot.unbind();
            }
            global.pointer()
        };

        let frame = slot.layer.update(pointer);
        sink.render(&slot.id, &frame);
        frame
    }

    pub fn options(&self) -> &ParallaxOptions {
        &self.options
    }

    pub fn region(&self) -> &DetectionRegion {
        &self.region
    }

    pub fn global_smoother(&self) -> &PointerSmoother {
        &self.global
    }

    /// Layer ids in binding order.
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|slot| slot.id.as_str())
    }

    pub fn layer(&self, id: &str) -> Option<&ParallaxLayer> {
        self.slot(id).map(|slot| &slot.layer)
    }

    pub fn status(&self, id: &str) -> Option<LayerStatus> {
        self.slot(id).map(|slot| slot.status)
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.slot(id).is_some_and(|slot| slot.bound)
    }

    /// Whether any layer still participates in the tick loop.
    pub fn has_bound_layers(&self) -> bool {
        self.layers.iter().any(|slot| slot.bound)
    }

    /// The pointer currently driving a layer.
    pub fn layer_pointer(&self, id: &str) -> Option<Pointer> {
        let slot = self.slot(id)?;
        Some(
            slot.own_smoother()
                .map(PointerSmoother::pointer)
                .unwrap_or_else(|| self.global.pointer()),
        )
    }

    fn slot(&self, id: &str) -> Option<&LayerSlot> {
        self.layers.iter().find(|slot| slot.id == id)
    }
}

fn find_slot<'a>(layers: &'a mut [LayerSlot], id: &str) -> ParallaxResult<&'a mut LayerSlot> {
    layers
        .iter_mut()
        .find(|slot| slot.id == id)
        .ok_or_else(|| ParallaxError::unknown_layer(id))
}
