//! Replayable event scripts.
//!
//! A script is JSONL: one timestamped event per line, with blank lines and
//! `#` comments ignored. It captures everything the environment feeds the
//! engine (pointer samples, region enter/leave, ticks, layer commands,
//! region resizes) so a session can be replayed offline.

use serde::{Deserialize, Serialize};

use crate::geometry::RegionGeometry;
use crate::options::CoordSpec;

/// Monotonic timestamp in milliseconds.
pub type TimestampMs = u64;

/// A single scripted event with timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    #[serde(rename = "t")]
    pub timestamp_ms: TimestampMs,

    #[serde(flatten)]
    pub kind: EventKind,
}

/// Discriminated union of script events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Raw pointer moved (device pixels).
    Pointer { x: f64, y: f64 },

    /// Pointer entered the detection region.
    Enter,

    /// Pointer left the detection region at the given raw coordinates.
    Leave { x: f64, y: f64 },

    /// Animation tick.
    Tick,

    /// Freeze a layer (or every layer when `layer` is absent).
    Freeze {
        #[serde(default)]
        layer: Option<String>,
        #[serde(default)]
        x: Option<CoordSpec>,
        #[serde(default)]
        y: Option<CoordSpec>,
        #[serde(default)]
        decay: Option<f64>,
    },

    /// Unfreeze a layer (or every layer when `layer` is absent).
    Unfreeze {
        #[serde(default)]
        layer: Option<String>,
        #[serde(default)]
        decay: Option<f64>,
    },

    /// The detection region was re-measured.
    Resize { x: f64, y: f64, width: f64, height: f64 },
}

/// Arguments of a freeze command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreezeCommand {
    pub x: Option<CoordSpec>,
    pub y: Option<CoordSpec>,
    pub decay: Option<f64>,
}

/// Arguments of an unfreeze command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnfreezeCommand {
    pub decay: Option<f64>,
}

/// A script line that failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct ScriptParseError {
    /// One-based line number.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

impl EventKind {
    /// Region rectangle carried by a resize event.
    pub fn region_geometry(&self) -> Option<RegionGeometry> {
        match self {
            EventKind::Resize {
                x,
                y,
                width,
                height,
            } => Some(RegionGeometry::new(*x, *y, *width, *height)),
            _ => None,
        }
    }
}

/// Parse a script from JSONL content (one JSON object per line).
pub fn parse_script(jsonl: &str) -> Result<Vec<ScriptEvent>, ScriptParseError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| ScriptParseError { line, source })
        })
        .collect()
}
