//! Replay an event script through a frame coordinator.

use std::path::PathBuf;

use anyhow::Context;
use parallax_common::clock::RateController;
use parallax_common::config::SimulationDefaults;
use parallax_engine::{FrameCoordinator, FrameRecorder, LayerBinding, RawPointer, StaticGeometry};
use parallax_model::event::{
    parse_script, EventKind, FreezeCommand, ScriptEvent, TimestampMs, UnfreezeCommand,
};
use parallax_model::geometry::{LayerGeometry, Point2D, RegionGeometry, Size2D};
use parallax_model::options::LayerOverrides;

/// A `--layer` argument: `ID` or `ID=JSON_OVERRIDES`.
#[derive(Debug, Clone)]
pub struct LayerArg {
    pub id: String,
    pub overrides: LayerOverrides,
}

impl LayerArg {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (id, overrides) = match raw.split_once('=') {
            Some((id, json)) => {
                let overrides = serde_json::from_str(json)
                    .map_err(|e| format!("invalid overrides for layer {id:?}: {e}"))?;
                (id, overrides)
            }
            None => (raw, LayerOverrides::default()),
        };
        if id.trim().is_empty() {
            return Err("layer id must not be empty".to_string());
        }
        Ok(Self {
            id: id.trim().to_string(),
            overrides,
        })
    }
}

pub struct SimulateArgs {
    pub script: PathBuf,
    pub options: Option<PathBuf>,
    pub layers: Vec<LayerArg>,
    pub auto_tick: bool,
    pub settle_ticks: usize,
    pub json: bool,
}

pub fn run(args: SimulateArgs, defaults: &SimulationDefaults) -> anyhow::Result<()> {
    let options = super::load_options(args.options.as_deref())?;
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script at {}", args.script.display()))?;
    let events = parse_script(&content)
        .with_context(|| format!("Failed to parse script at {}", args.script.display()))?;

    let geometry = synthetic_geometry(defaults, &args.layers);
    let frame_duration = if options.frame_duration > 0 {
        options.frame_duration
    } else {
        defaults.frame_duration_ms
    };
    let coordinator = FrameCoordinator::new(
        options,
        RawPointer::default(),
        &geometry,
        args.layers
            .iter()
            .map(|layer| LayerBinding::new(&layer.id).with_overrides(layer.overrides.clone())),
    );

    let mut replay = Replay {
        coordinator,
        sink: FrameRecorder::new(),
        json: args.json,
        ticks: 0,
        frames: 0,
    };
    let mut rate = args.auto_tick.then(|| RateController::new(frame_duration));
    let mut last_t = 0;

    for event in &events {
        if let Some(rate) = rate.as_mut() {
            // Ticks with no bound layer render nothing, so the gap is skipped.
            while replay.coordinator.has_bound_layers() {
                let Some(t) = rate.next_tick_before(event.timestamp_ms) else {
                    break;
                };
                replay.tick(t);
            }
        }
        replay.apply(event)?;
        if let Some(rate) = rate.as_mut() {
            if rate.should_tick(event.timestamp_ms) {
                replay.tick(event.timestamp_ms);
            }
        }
        last_t = last_t.max(event.timestamp_ms);
    }

    let mut settle = 0;
    while replay.coordinator.has_bound_layers() && settle < args.settle_ticks {
        settle += 1;
        replay.tick(last_t.saturating_add((settle as u64).saturating_mul(frame_duration)));
    }
    if replay.coordinator.has_bound_layers() {
        tracing::warn!(settle_ticks = args.settle_ticks, "Layers still moving after settle ticks");
    }

    tracing::info!(
        events = events.len(),
        ticks = replay.ticks,
        frames = replay.frames,
        "Replay finished"
    );
    Ok(())
}

/// Region and layers laid out from config defaults. Each layer is centred
/// in a container the size of the region, so it seeds at the middle.
fn synthetic_geometry(defaults: &SimulationDefaults, layers: &[LayerArg]) -> StaticGeometry {
    let region = RegionGeometry::new(
        defaults.region_x,
        defaults.region_y,
        defaults.region_width,
        defaults.region_height,
    );
    let container = region.size;
    layers.iter().fold(StaticGeometry::new(region), |geometry, layer| {
        let size = Size2D::new(
            layer.overrides.width.unwrap_or(defaults.layer_width),
            layer.overrides.height.unwrap_or(defaults.layer_height),
        );
        geometry.with_layer(
            layer.id.clone(),
            LayerGeometry {
                size,
                position: Point2D::new(
                    (container.width - size.width) / 2.0,
                    (container.height - size.height) / 2.0,
                ),
                container,
            },
        )
    })
}

struct Replay {
    coordinator: FrameCoordinator,
    sink: FrameRecorder,
    json: bool,
    ticks: u64,
    frames: u64,
}

impl Replay {
    fn apply(&mut self, event: &ScriptEvent) -> anyhow::Result<()> {
        match &event.kind {
            EventKind::Pointer { x, y } => self.coordinator.on_pointer(Point2D::new(*x, *y)),
            EventKind::Enter => self.coordinator.on_enter(),
            EventKind::Leave { x, y } => self.coordinator.on_leave(Point2D::new(*x, *y)),
            EventKind::Tick => self.tick(event.timestamp_ms),
            EventKind::Freeze { layer, x, y, decay } => {
                let command = FreezeCommand {
                    x: x.clone(),
                    y: y.clone(),
                    decay: *decay,
                };
                for id in self.targets(layer.as_deref()) {
                    self.coordinator.freeze(&id, &command)?;
                }
            }
            EventKind::Unfreeze { layer, decay } => {
                let command = UnfreezeCommand { decay: *decay };
                for id in self.targets(layer.as_deref()) {
                    self.coordinator.unfreeze(&id, command, &mut self.sink)?;
                }
            }
            EventKind::Resize { .. } => {
                if let Some(region) = event.kind.region_geometry() {
                    self.coordinator.set_region_geometry(region);
                }
            }
        }
        Ok(())
    }

    /// The named layer, or every layer when none is named.
    fn targets(&self, layer: Option<&str>) -> Vec<String> {
        match layer {
            Some(id) => vec![id.to_string()],
            None => self.coordinator.layer_ids().map(str::to_string).collect(),
        }
    }

    fn tick(&mut self, t: TimestampMs) {
        self.ticks += 1;
        self.coordinator.tick(t, &mut self.sink);
        for (layer, frame) in self.sink.take_frames() {
            self.frames += 1;
            let frozen = self.sink.is_frozen(&layer);
            if self.json {
                let line = serde_json::json!({
                    "t": t,
                    "layer": layer,
                    "frozen": frozen,
                    "frame": frame,
                });
                println!("{line}");
            } else {
                let marker = if frozen { " [frozen]" } else { "" };
                println!("t={t:>6}ms  {layer:<12} {frame}{marker}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_model::options::ParallaxOptions;

    #[test]
    fn test_layer_arg_plain_id() {
        let arg = LayerArg::parse("sky").unwrap();
        assert_eq!(arg.id, "sky");
        assert_eq!(arg.overrides, LayerOverrides::default());
    }

    #[test]
    fn test_layer_arg_with_overrides() {
        let arg = LayerArg::parse(r#"hills={"xparallax":"40px","decay":0.8}"#).unwrap();
        assert_eq!(arg.id, "hills");
        assert_eq!(arg.overrides.decay, Some(0.8));
        assert!(arg.overrides.xparallax.is_some());
    }

    #[test]
    fn test_layer_arg_rejects_bad_input() {
        assert!(LayerArg::parse("=").is_err());
        assert!(LayerArg::parse("sky={not json").is_err());
    }

    #[test]
    fn test_synthetic_layers_are_centred() {
        let defaults = SimulationDefaults::default();
        let geometry = synthetic_geometry(&defaults, &[LayerArg::parse("sky").unwrap()]);
        let sky = geometry.layers["sky"];
        assert_eq!(sky.position.x, (1280.0 - 1600.0) / 2.0);
        assert_eq!(sky.container, geometry.region.size);
    }

    fn replay(layers: &[&str]) -> Replay {
        let defaults = SimulationDefaults::default();
        let args: Vec<LayerArg> = layers.iter().map(|id| LayerArg::parse(id).unwrap()).collect();
        let geometry = synthetic_geometry(&defaults, &args);
        Replay {
            coordinator: FrameCoordinator::new(
                ParallaxOptions::default(),
                RawPointer::default(),
                &geometry,
                layers.iter().map(|id| LayerBinding::new(*id)),
            ),
            sink: FrameRecorder::new(),
            json: false,
            ticks: 0,
            frames: 0,
        }
    }

    fn event(kind: EventKind) -> ScriptEvent {
        ScriptEvent {
            timestamp_ms: 0,
            kind,
        }
    }

    #[test]
    fn test_resize_event_replaces_region() {
        let mut replay = replay(&["sky"]);
        let resize = EventKind::Resize {
            x: 10.0,
            y: 0.0,
            width: 640.0,
            height: 360.0,
        };
        replay.apply(&event(resize)).unwrap();
        assert_eq!(
            replay.coordinator.region().geometry(),
            RegionGeometry::new(10.0, 0.0, 640.0, 360.0)
        );
        assert!((replay.coordinator.region().threshold().x - 1.0 / 640.0).abs() < 1e-12);
    }

    #[test]
    fn test_freeze_without_layer_targets_all() {
        let mut replay = replay(&["sky", "hills"]);
        let freeze = EventKind::Freeze {
            layer: None,
            x: None,
            y: None,
            decay: None,
        };
        replay.apply(&event(freeze)).unwrap();
        assert!(replay.coordinator.is_bound("sky"));
        assert!(replay.coordinator.is_bound("hills"));

        let unknown = EventKind::Unfreeze {
            layer: Some("clouds".to_string()),
            decay: None,
        };
        assert!(replay.apply(&event(unknown)).is_err());
    }
}
