use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::gear::GearKind;
use crate::foundation::error::GearResult;
use crate::selection::transform::Anchor;

/// A recorded editing session: user actions replayed in order against one editor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    /// Actions in the order the user performed them.
    pub actions: Vec<Action>,
}

impl SessionScript {
    /// Read a script from a JSON file.
    pub fn from_json_file(path: &Path) -> GearResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read script '{}'", path.display()))?;
        let script = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse script '{}'", path.display()))?;
        Ok(script)
    }
}

/// One user action.
///
/// Overlays are referred to by the `name` given when they were added.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    /// Choose a background image file.
    Upload {
        /// Image path, relative to the script.
        path: PathBuf,
    },
    /// Press an "Add <gear>" button.
    AddGear {
        /// Gear to add.
        gear: GearKind,
        /// Handle later actions use to refer to the overlay.
        #[serde(default)]
        name: Option<String>,
    },
    /// Add a custom overlay from an image or SVG file.
    AddOverlayFile {
        /// Overlay path, relative to the script.
        path: PathBuf,
        /// Handle later actions use to refer to the overlay.
        #[serde(default)]
        name: Option<String>,
    },
    /// Press and release at a canvas point.
    Click {
        /// Canvas x.
        x: f64,
        /// Canvas y.
        y: f64,
    },
    /// Press at `from`, move to `to`, release.
    Drag {
        /// Press point `[x, y]`.
        from: [f64; 2],
        /// Release point `[x, y]`.
        to: [f64; 2],
    },
    /// Drag a corner anchor of the selected overlay.
    Resize {
        /// Overlay handle.
        overlay: String,
        /// Corner being dragged.
        anchor: Anchor,
        /// Horizontal pointer movement.
        dx: f64,
        /// Vertical pointer movement.
        dy: f64,
    },
    /// Rotate the selected overlay to an absolute angle.
    Rotate {
        /// Overlay handle.
        overlay: String,
        /// Clockwise angle in degrees.
        degrees: f64,
    },
    /// Select an overlay.
    Select {
        /// Overlay handle.
        overlay: String,
    },
    /// Clear the selection.
    Deselect,
    /// Remove an overlay.
    Remove {
        /// Overlay handle.
        overlay: String,
    },
    /// Press the export button.
    Export,
}
