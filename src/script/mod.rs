//! JSON session scripts: recorded user actions replayed against an [`crate::Editor`].

/// Script document and action types.
pub mod action;
/// Replay of a script against an editor.
pub mod replay;
