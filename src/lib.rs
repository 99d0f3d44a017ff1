//! photogear decorates photos with draggable, resizable, rotatable gear overlays and exports
//! the result as a PNG.
//!
//! The API is session-oriented:
//!
//! - Create an [`Editor`] from an [`EditorConfig`]
//! - Upload a background and add overlays ([`GearKind`] or custom image/SVG bytes)
//! - Route pointer events or call the selection operations directly
//! - [`Editor::export`] the flattened scene
//!
//! Recorded sessions can be replayed from JSON with [`script::replay::replay`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Editor configuration.
pub mod config;
/// The editing session.
pub mod editor;
/// PNG export.
pub mod export;
/// CPU rendering of the scene.
pub mod render;
/// Background, overlays, and sizing rules.
pub mod scene;
/// JSON session scripts.
pub mod script;
/// Selection manager and transform control.
pub mod selection;

pub use crate::assets::decode::{
    PreparedGraphic, PreparedImage, PreparedSvg, decode_data_url, decode_graphic, decode_image,
    encode_data_url, parse_svg,
};
pub use crate::assets::gear::GearKind;
pub use crate::foundation::core::{Affine, Canvas, MAX_RASTER_DIM, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{GearError, GearResult};

pub use crate::config::{EditorConfig, MinSizePolicy};
pub use crate::editor::pending::{DecodedOverlay, OverlaySource, PendingOverlay};
pub use crate::editor::session::{Editor, PointerOutcome};
pub use crate::export::png::{ExportedImage, encode_png};
pub use crate::render::cpu::{CpuRenderer, RenderOptions};
pub use crate::render::frame::FrameRGBA;
pub use crate::scene::model::{
    Overlay, OverlayEntry, OverlayGeometry, OverlayId, RemovalAffordance, Scene,
};
pub use crate::selection::manager::SelectionManager;
pub use crate::selection::transform::{Anchor, TransformControl};
pub use crate::script::action::{Action, SessionScript};
pub use crate::script::replay::{ScriptReport, replay};
