//! Show how an options file is interpreted.

use std::path::PathBuf;

use parallax_engine::transform::{AxisTransform, AxisTransformConfig};
use parallax_model::geometry::Axis;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating options at: {}", path.display());
    let options = super::load_options(Some(&path))?;

    println!("  Mouseport: {}", options.mouseport);
    println!("  Decay: {}", options.decay);
    println!("  Frame duration: {}ms", options.frame_duration);
    println!("  Freeze class: {}", options.freeze_class);
    println!("  Active outside: {}", options.active_outside);

    for axis in Axis::BOTH {
        let config = AxisTransformConfig::from_options(&options, axis);
        let response = match config.transform {
            AxisTransform::Disabled => "disabled".to_string(),
            AxisTransform::Ratio(f) => format!("ratio {f}"),
            AxisTransform::Pixel(px) => format!("{px}px travel"),
        };
        println!(
            "  {:?} axis: {} (origin {}) from {:?}",
            axis,
            response,
            config.origin,
            options.parallax(axis)
        );
    }

    let enabled = AxisTransformConfig::enabled_axes(&options);
    if !enabled.x && !enabled.y {
        println!("\nNo axis responds to the pointer; layers will never move.");
    } else {
        println!("\nOptions are valid.");
    }
    Ok(())
}
