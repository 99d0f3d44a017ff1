use crate::config::MinSizePolicy;
use crate::foundation::core::{Affine, Point, Size, Vec2};
use crate::scene::model::{OverlayGeometry, OverlayId};

/// Resize handle on a corner of the transform control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
}

impl Anchor {
    /// All corner anchors.
    pub const ALL: [Anchor; 4] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ];

    fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// Position of the handle in the overlay's local box.
    fn local_point(self, size: Size) -> Point {
        Point::new(
            if self.is_left() { 0.0 } else { size.width },
            if self.is_top() { 0.0 } else { size.height },
        )
    }
}

/// The shared resize/rotate control. Attached to at most one overlay.
#[derive(Clone, Debug)]
pub struct TransformControl {
    attached: Option<OverlayId>,
    /// Whether the rotate handle is active.
    pub rotate_enabled: bool,
    /// Whether corner drags keep the overlay's aspect ratio.
    pub keep_ratio: bool,
    /// Resize floor; proposals below it are rejected.
    pub min_size: MinSizePolicy,
}

/// Distance of the rotate handle above the box's top edge, in canvas pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;

impl TransformControl {
    /// Detached control with rotation and ratio-preserving corners enabled.
    pub fn new(min_size: MinSizePolicy) -> Self {
        Self {
            attached: None,
            rotate_enabled: true,
            keep_ratio: true,
            min_size,
        }
    }

    /// Overlay the control is bound to.
    pub fn attached(&self) -> Option<OverlayId> {
        self.attached
    }

    /// Return `true` when bound to `id`.
    pub fn is_attached_to(&self, id: OverlayId) -> bool {
        self.attached == Some(id)
    }

    pub(crate) fn attach(&mut self, id: OverlayId) {
        self.attached = Some(id);
    }

    pub(crate) fn detach(&mut self) {
        self.attached = None;
    }

    /// Accept `proposed` if it satisfies the min-size policy, otherwise keep `old`.
    pub fn bound_box(&self, old: OverlayGeometry, proposed: OverlayGeometry) -> OverlayGeometry {
        if self.min_size.allows(proposed.effective_size()) {
            proposed
        } else {
            old
        }
    }

    /// Geometry after dragging `anchor` by canvas-space `delta`. The opposite corner stays put.
    ///
    /// The result still has to pass [`TransformControl::bound_box`].
    pub fn resize_proposal(
        &self,
        geometry: OverlayGeometry,
        anchor: Anchor,
        delta: Vec2,
    ) -> OverlayGeometry {
        let Size { width, height } = geometry.size;
        if width == 0.0 || height == 0.0 {
            return geometry;
        }
        let rot = Affine::rotate(geometry.rotation_rad);
        let local = Affine::rotate(-geometry.rotation_rad) * delta.to_point();
        let eff = geometry.effective_size();
        let sign_x = if anchor.is_left() { -1.0 } else { 1.0 };
        let sign_y = if anchor.is_top() { -1.0 } else { 1.0 };

        let (new_w, new_h) = if self.keep_ratio {
            let diag = Vec2::new(sign_x * eff.width, sign_y * eff.height);
            let len = diag.hypot();
            if len == 0.0 || !len.is_finite() {
                return geometry;
            }
            let factor = (len + local.to_vec2().dot(diag / len)) / len;
            (eff.width * factor, eff.height * factor)
        } else {
            (
                eff.width + sign_x * local.x,
                eff.height + sign_y * local.y,
            )
        };

        let shift = Vec2::new(
            if anchor.is_left() { eff.width - new_w } else { 0.0 },
            if anchor.is_top() { eff.height - new_h } else { 0.0 },
        );
        OverlayGeometry {
            position: geometry.position + (rot * shift.to_point()).to_vec2(),
            size: geometry.size,
            scale: Vec2::new(new_w / width, new_h / height),
            rotation_rad: geometry.rotation_rad,
        }
    }

    /// Geometry after rotating to `rotation_rad` about the box center.
    ///
    /// Returns `geometry` unchanged when rotation is disabled.
    pub fn rotate_proposal(&self, geometry: OverlayGeometry, rotation_rad: f64) -> OverlayGeometry {
        if !self.rotate_enabled || !rotation_rad.is_finite() {
            return geometry;
        }
        let eff = geometry.effective_size();
        let half = Vec2::new(eff.width / 2.0, eff.height / 2.0);
        let center =
            geometry.position + (Affine::rotate(geometry.rotation_rad) * half.to_point()).to_vec2();
        let position = center - (Affine::rotate(rotation_rad) * half.to_point()).to_vec2();
        OverlayGeometry {
            position,
            rotation_rad,
            ..geometry
        }
    }

    /// Canvas-space handle positions for drawing and hit-testing.
    pub fn anchor_points(&self, geometry: &OverlayGeometry) -> [(Anchor, Point); 4] {
        let a = geometry.to_affine();
        Anchor::ALL.map(|anchor| (anchor, a * anchor.local_point(geometry.size)))
    }

    /// Canvas-space position of the rotate handle, above the top edge's midpoint.
    pub fn rotate_handle_point(&self, geometry: &OverlayGeometry) -> Point {
        let eff = geometry.effective_size();
        let local = Point::new(eff.width / 2.0, -ROTATE_HANDLE_OFFSET);
        geometry.position + (Affine::rotate(geometry.rotation_rad) * local).to_vec2()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/transform.rs"]
mod tests;
