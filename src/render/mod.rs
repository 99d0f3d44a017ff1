//! Rasterization of a [`crate::Scene`] into RGBA frames.

/// CPU backend (`vello_cpu`).
pub mod cpu;
/// Rendered frame type.
pub mod frame;
