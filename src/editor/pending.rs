use std::borrow::Cow;

use crate::assets::decode::{PreparedGraphic, decode_graphic};
use crate::assets::gear::GearKind;
use crate::foundation::core::Point;
use crate::foundation::error::GearResult;
use crate::scene::model::{OverlayGeometry, OverlayId};
use crate::scene::sizing::default_overlay_size;

/// Where an overlay's pixels come from.
#[derive(Clone, Debug)]
pub enum OverlaySource {
    /// One of the bundled gear graphics.
    Gear(GearKind),
    /// Encoded image or SVG bytes supplied by the caller.
    Bytes {
        /// Label shown for the overlay (usually a file name).
        label: String,
        /// Encoded bytes.
        bytes: Vec<u8>,
    },
}

/// An overlay add whose source has not been decoded yet.
///
/// Created by [`crate::Editor::request_overlay`]; it owns everything it needs, so decoding can
/// run on another thread and complete in any order relative to other pending adds.
#[derive(Clone, Debug)]
pub struct PendingOverlay {
    pub(crate) id: OverlayId,
    pub(crate) label: String,
    pub(crate) bytes: Cow<'static, [u8]>,
    pub(crate) origin: Point,
    pub(crate) target_height: f64,
}

impl PendingOverlay {
    /// Id reserved for the overlay this add will create.
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Label of the overlay this add will create.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Decode the source and compute default placement.
    pub fn decode(self) -> GearResult<DecodedOverlay> {
        let graphic = decode_graphic(&self.bytes)?;
        let size = default_overlay_size(self.target_height, graphic.natural_size());
        Ok(DecodedOverlay {
            id: self.id,
            label: self.label,
            graphic,
            geometry: OverlayGeometry::new(self.origin, size),
        })
    }
}

/// A decoded overlay waiting to be attached to the scene.
#[derive(Clone, Debug)]
pub struct DecodedOverlay {
    pub(crate) id: OverlayId,
    pub(crate) label: String,
    pub(crate) graphic: PreparedGraphic,
    pub(crate) geometry: OverlayGeometry,
}

impl DecodedOverlay {
    /// Reserved id.
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// Initial placement.
    pub fn geometry(&self) -> OverlayGeometry {
        self.geometry
    }
}
