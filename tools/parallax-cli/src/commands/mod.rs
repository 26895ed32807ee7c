pub mod config;
pub mod simulate;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use parallax_model::options::ParallaxOptions;

/// Load options from a JSON file, or defaults when no path is given.
pub fn load_options(path: Option<&Path>) -> anyhow::Result<ParallaxOptions> {
    let Some(path) = path else {
        return Ok(ParallaxOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options at {}", path.display()))?;
    ParallaxOptions::from_json(&content)
        .with_context(|| format!("Failed to parse options at {}", path.display()))
}
