//! Parallax Engine
//!
//! Computes, once per animation tick, where each parallax layer should sit
//! given the pointer position:
//! - **Smoothing:** Exponential easing toward a target with latched arrival
//! - **Detection regions:** Containment tracking and pointer normalization
//! - **Layers:** Per-axis ratio or pixel transforms, forward and inverse
//! - **Coordination:** Shared per-tick work, freeze overrides, bind/unbind
//!
//! This crate is pure computation. Geometry comes in through
//! [`GeometrySource`]; placements go out through [`RenderSink`].

pub mod coordinator;
pub mod environment;
pub mod layer;
pub mod region;
pub mod smoother;
pub mod transform;

pub use coordinator::{FrameCoordinator, LayerBinding, LayerStatus};
pub use environment::{FrameRecorder, GeometrySource, RawPointer, RenderSink, StaticGeometry};
pub use layer::{AxisPlacement, LayerFrame, ParallaxLayer};
pub use region::{Containment, DetectionRegion};
pub use smoother::PointerSmoother;
pub use transform::{AxisTransform, AxisTransformConfig};
