//! Parallax Model
//!
//! Defines the data contracts shared by the engine and its drivers:
//! - **Geometry:** Axes, points, sizes, region and layer rectangles
//! - **Options:** The configuration surface as callers write it, before parsing
//! - **Events:** Timestamped pointer, region, tick, and command events
//!
//! Raw pointer and geometry values are in device pixels. Normalized pointer
//! values are in `[0.0, 1.0]` relative to a detection region.

pub mod event;
pub mod geometry;
pub mod options;

pub use event::*;
pub use geometry::*;
pub use options::*;
