use parallax_engine::{
    FrameCoordinator, FrameRecorder, LayerBinding, LayerStatus, RawPointer, StaticGeometry,
};
use parallax_model::event::{FreezeCommand, UnfreezeCommand};
use parallax_model::geometry::{Axes, Axis, LayerGeometry, Point2D, RegionGeometry, Size2D};
use parallax_model::options::{AxisSpec, CoordSpec, LayerOverrides, OriginSpec, ParallaxOptions};

const LAYER: &str = "hills";

fn geometry() -> StaticGeometry {
    StaticGeometry::new(RegionGeometry::new(0.0, 0.0, 200.0, 100.0)).with_layer(
        LAYER,
        LayerGeometry {
            size: Size2D::new(400.0, 200.0),
            position: Point2D::new(-100.0, -50.0),
            container: Size2D::new(200.0, 100.0),
        },
    )
}

fn setup(options: ParallaxOptions, overrides: LayerOverrides) -> (FrameCoordinator, RawPointer) {
    let raw = RawPointer::default();
    let coordinator = FrameCoordinator::new(
        options,
        raw.clone(),
        &geometry(),
        [LayerBinding::new(LAYER).with_overrides(overrides)],
    );
    (coordinator, raw)
}

fn x_percent(sink: &FrameRecorder) -> f64 {
    sink.last_frame(LAYER)
        .and_then(|frame| frame.placement(Axis::X))
        .expect("layer should have rendered an x placement")
        .position_percent
}

/// Tick until the layer detaches or `limit` ticks pass. Returns the next timestamp.
fn run_until_detached(
    coordinator: &mut FrameCoordinator,
    sink: &mut FrameRecorder,
    mut t: u64,
    limit: usize,
) -> u64 {
    for _ in 0..limit {
        if !coordinator.is_bound(LAYER) {
            break;
        }
        coordinator.tick(t, sink);
        t += 30;
    }
    t
}

#[test]
fn ratio_layer_renders_documented_position() {
    let options = ParallaxOptions {
        decay: 0.0,
        ..Default::default()
    };
    let overrides = LayerOverrides {
        xparallax: Some(AxisSpec::Number(0.5)),
        xorigin: Some(OriginSpec::Number(0.5)),
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, overrides);
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(200.0, 50.0));
    coordinator.tick(0, &mut sink);

    assert!((x_percent(&sink) - 75.0).abs() < 1e-9);
}

#[test]
fn frozen_layer_converges_on_target_and_ignores_live_pointer() {
    let options = ParallaxOptions {
        decay: 0.5,
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(0.0, 0.0));
    let mut t = 0;
    for _ in 0..40 {
        coordinator.tick(t, &mut sink);
        t += 30;
    }
    assert!(x_percent(&sink).abs() < 1.0);

    let command = FreezeCommand {
        x: Some(CoordSpec::Text("50%".to_string())),
        ..Default::default()
    };
    coordinator.freeze(LAYER, &command).unwrap();
    assert_eq!(coordinator.status(LAYER), Some(LayerStatus::Freezing));

    // The live pointer sweeps to the far corner; the frozen layer must not follow.
    raw.set(Point2D::new(200.0, 100.0));
    let mut previous = (x_percent(&sink) - 50.0).abs();
    for _ in 0..60 {
        if !coordinator.is_bound(LAYER) {
            break;
        }
        coordinator.tick(t, &mut sink);
        t += 30;
        let distance = (x_percent(&sink) - 50.0).abs();
        assert!(distance <= previous);
        previous = distance;
    }

    assert!(!coordinator.is_bound(LAYER));
    assert_eq!(coordinator.status(LAYER), Some(LayerStatus::Frozen));
    assert!(sink.is_frozen(LAYER));
    assert!((x_percent(&sink) - 50.0).abs() < 1e-9);

    // The global pointer kept tracking the live position meanwhile.
    let global = coordinator.global_smoother().pointer();
    assert!(global.x.unwrap() > 0.9);
}

#[test]
fn unfreeze_resumes_from_frozen_position_toward_live_pointer() {
    let options = ParallaxOptions {
        decay: 0.5,
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(200.0, 100.0));
    let command = FreezeCommand {
        x: Some(CoordSpec::Number(0.2)),
        y: Some(CoordSpec::Number(0.2)),
        decay: Some(0.0),
    };
    coordinator.freeze(LAYER, &command).unwrap();
    let t = run_until_detached(&mut coordinator, &mut sink, 0, 10);
    assert_eq!(coordinator.status(LAYER), Some(LayerStatus::Frozen));
    assert!((x_percent(&sink) - 20.0).abs() < 1e-9);

    coordinator
        .unfreeze(LAYER, UnfreezeCommand { decay: Some(0.5) }, &mut sink)
        .unwrap();
    assert_eq!(coordinator.status(LAYER), Some(LayerStatus::Live));
    assert!(!sink.is_frozen(LAYER));
    assert!(coordinator.is_bound(LAYER));

    coordinator.tick(t, &mut sink);
    // Halfway from 20% toward 100%.
    assert!((x_percent(&sink) - 60.0).abs() < 1e-9);

    for i in 1..40 {
        coordinator.tick(t + i * 30, &mut sink);
    }
    assert!((x_percent(&sink) - 100.0).abs() < 1e-9);
}

#[test]
fn layer_detaches_after_pointer_leaves_and_motion_settles() {
    let (mut coordinator, raw) = setup(ParallaxOptions::default(), LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(100.0, 50.0));
    let mut t = 0;
    for _ in 0..10 {
        coordinator.tick(t, &mut sink);
        t += 30;
    }

    raw.set(Point2D::new(500.0, 500.0));
    coordinator.on_leave(Point2D::new(200.0, 100.0));
    coordinator.tick(t, &mut sink);
    assert!(coordinator.region().is_active());

    run_until_detached(&mut coordinator, &mut sink, t + 30, 200);
    assert!(!coordinator.is_bound(LAYER));
    assert!(!coordinator.has_bound_layers());
    assert!(!coordinator.region().is_active());

    // Settled on the leave position, not on the far-away live pointer.
    assert!((x_percent(&sink) - 100.0).abs() < 1e-9);

    // Re-entry starts a fresh global episode and rebinds the layer.
    coordinator.on_enter();
    assert!(!coordinator.global_smoother().on_target());
    assert!(coordinator.is_bound(LAYER));
}

#[test]
fn pixel_layer_first_frame_matches_rendered_position() {
    let container = Size2D::new(1000.0, 600.0);
    let geometry = StaticGeometry::new(RegionGeometry::new(0.0, 0.0, 200.0, 100.0)).with_layer(
        LAYER,
        LayerGeometry {
            size: Size2D::new(200.0, 100.0),
            // 50% anchor minus a 92px margin: pointer 0.3 on a 40px track.
            position: Point2D::new(408.0, 0.0),
            container,
        },
    );
    let options = ParallaxOptions {
        xparallax: AxisSpec::Text("40px".to_string()),
        yparallax: AxisSpec::Flag(false),
        decay: 1.0,
        ..Default::default()
    };
    let raw = RawPointer::default();
    let mut coordinator =
        FrameCoordinator::new(options, raw.clone(), &geometry, [LayerBinding::new(LAYER)]);
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(200.0, 50.0));
    coordinator.tick(0, &mut sink);

    let x = sink.last_frame(LAYER).unwrap().placement(Axis::X).unwrap();
    let rendered = x.position_percent / 100.0 * container.width + x.margin_px;
    assert!((rendered - 408.0).abs() < 1e-9);
    assert!(sink.last_frame(LAYER).unwrap().placement(Axis::Y).is_none());
}

#[test]
fn frozen_layer_stays_unbound_on_region_entry() {
    let (mut coordinator, _raw) = setup(ParallaxOptions::default(), LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator
        .freeze(LAYER, &FreezeCommand {
            decay: Some(0.0),
            ..Default::default()
        })
        .unwrap();
    run_until_detached(&mut coordinator, &mut sink, 0, 10);
    assert_eq!(coordinator.status(LAYER), Some(LayerStatus::Frozen));

    coordinator.on_enter();
    assert!(!coordinator.is_bound(LAYER));
}

#[test]
fn unparseable_axis_is_untracked_everywhere() {
    let options = ParallaxOptions {
        xparallax: AxisSpec::Text("-5px".to_string()),
        yparallax: AxisSpec::Text("5 apples".to_string()),
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(150.0, 50.0));
    coordinator.tick(0, &mut sink);

    assert_eq!(coordinator.region().pointer(), Axes::new(None, None));
    assert_eq!(coordinator.global_smoother().pointer(), Axes::new(None, None));
    let frame = sink.last_frame(LAYER).unwrap();
    assert!(frame.placement(Axis::X).is_none());
    assert!(frame.placement(Axis::Y).is_none());

    // Nothing to converge, so the layer detaches as soon as the pointer leaves.
    coordinator.on_leave(Point2D::new(150.0, 50.0));
    run_until_detached(&mut coordinator, &mut sink, 30, 5);
    assert!(!coordinator.is_bound(LAYER));
}

#[test]
fn refresh_geometry_recomputes_pixel_offset_and_threshold() {
    let layer_at = |width: f64| LayerGeometry {
        size: Size2D::new(width, 100.0),
        position: Point2D::new(0.0, 0.0),
        container: Size2D::new(1000.0, 600.0),
    };
    let before = StaticGeometry::new(RegionGeometry::new(0.0, 0.0, 200.0, 100.0))
        .with_layer(LAYER, layer_at(200.0));
    let after = StaticGeometry::new(RegionGeometry::new(0.0, 0.0, 400.0, 100.0))
        .with_layer(LAYER, layer_at(400.0));

    let options = ParallaxOptions {
        xparallax: AxisSpec::Text("40px".to_string()),
        yparallax: AxisSpec::Flag(false),
        decay: 0.0,
        ..Default::default()
    };
    let raw = RawPointer::default();
    let mut coordinator =
        FrameCoordinator::new(options, raw.clone(), &before, [LayerBinding::new(LAYER)]);
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(200.0, 50.0));
    coordinator.tick(0, &mut sink);
    // Offset 0.5 * (200 - 40) plus the full 40px of travel.
    let x = sink.last_frame(LAYER).unwrap().placement(Axis::X).unwrap();
    assert_eq!(x.position_percent, 50.0);
    assert!((x.margin_px + 120.0).abs() < 1e-9);

    coordinator.refresh_geometry(&after);
    let layer = coordinator.layer(LAYER).unwrap();
    assert_eq!(layer.size().width, 400.0);
    assert!((layer.offset(Axis::X) - 180.0).abs() < 1e-9);
    assert!((coordinator.region().threshold().x - 1.0 / 400.0).abs() < 1e-12);

    // The same raw pointer is now halfway across the wider region.
    coordinator.tick(30, &mut sink);
    let x = sink.last_frame(LAYER).unwrap().placement(Axis::X).unwrap();
    assert!((x.margin_px + 200.0).abs() < 1e-9);
}

#[test]
fn set_parallax_switches_layer_to_new_transform() {
    let options = ParallaxOptions {
        decay: 0.0,
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    raw.set(Point2D::new(200.0, 50.0));
    coordinator.tick(0, &mut sink);
    assert!((x_percent(&sink) - 100.0).abs() < 1e-9);

    let overrides = LayerOverrides {
        xparallax: Some(AxisSpec::Number(0.5)),
        xorigin: Some(OriginSpec::Number(0.5)),
        ..Default::default()
    };
    coordinator.set_parallax(LAYER, &overrides).unwrap();
    coordinator.tick(30, &mut sink);
    assert!((x_percent(&sink) - 75.0).abs() < 1e-9);

    assert!(coordinator.set_parallax("missing", &overrides).is_err());
}

#[test]
fn active_outside_tracks_without_entry() {
    let options = ParallaxOptions {
        active_outside: true,
        decay: 0.0,
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();
    assert!(coordinator.is_bound(LAYER));

    // Right of the region: clamped to the far edge.
    raw.set(Point2D::new(300.0, 50.0));
    coordinator.tick(0, &mut sink);
    assert!(coordinator.region().is_active());
    assert!((x_percent(&sink) - 100.0).abs() < 1e-9);

    raw.set(Point2D::new(-50.0, 50.0));
    let mut t = 30;
    for _ in 0..20 {
        coordinator.tick(t, &mut sink);
        t += 30;
    }
    assert!(coordinator.is_bound(LAYER));
    assert!(x_percent(&sink).abs() < 1e-9);
}

#[test]
fn region_resize_renormalizes_pointer() {
    let options = ParallaxOptions {
        decay: 0.0,
        ..Default::default()
    };
    let (mut coordinator, raw) = setup(options, LayerOverrides::default());
    let mut sink = FrameRecorder::new();

    coordinator.on_enter();
    coordinator.set_region_geometry(RegionGeometry::new(0.0, 0.0, 400.0, 100.0));
    raw.set(Point2D::new(200.0, 50.0));
    coordinator.tick(0, &mut sink);

    assert_eq!(coordinator.region().pointer().x, Some(0.5));
    assert!((x_percent(&sink) - 50.0).abs() < 1e-9);
}
