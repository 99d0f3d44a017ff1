//! PNG export of the flattened scene.

/// PNG encoding and download helpers.
pub mod png;
