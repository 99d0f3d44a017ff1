//! Selection state, the transform control, and removal affordances.

/// The 0-or-1 selection and every affordance show/hide.
pub mod manager;
/// Resize/rotate control geometry.
pub mod transform;
