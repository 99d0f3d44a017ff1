//! The editing session: one owner for the scene and its selection.

/// Two-phase overlay adds.
pub mod pending;
/// The [`Editor`](session::Editor) and pointer routing.
pub mod session;
