//! Background image, overlays, and their paint order.

/// Scene graph: overlays, removal affordances, hit-testing.
pub mod model;
/// Canvas and default overlay sizing rules.
pub mod sizing;
