use std::collections::HashSet;
use std::fmt;

use crate::assets::decode::{PreparedGraphic, PreparedImage};
use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};
use crate::foundation::error::GearResult;
use crate::scene::sizing;

/// Session-unique overlay identity. Ids are never reused within a [`Scene`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct OverlayId(pub u64);

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay#{}", self.0)
    }
}

/// Placement of an overlay on the canvas.
///
/// Mirrors a retained-mode canvas node: the local box `(0, 0, size)` is scaled, then rotated
/// about the node origin, then translated to `position`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayGeometry {
    /// Node origin (top-left of the unrotated box) in canvas pixels.
    pub position: Point,
    /// Unscaled box size.
    pub size: Size,
    /// Scale applied by resizing through the transform control.
    pub scale: Vec2,
    /// Clockwise rotation about `position`, in radians.
    pub rotation_rad: f64,
}

impl OverlayGeometry {
    /// Unscaled, unrotated geometry at `position`.
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            scale: Vec2::new(1.0, 1.0),
            rotation_rad: 0.0,
        }
    }

    /// Local-to-canvas transform.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation_rad)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Size on screen: `size * scale`, signs preserved.
    pub fn effective_size(&self) -> Size {
        Size::new(self.size.width * self.scale.x, self.size.height * self.scale.y)
    }

    /// Box in local (pre-transform) coordinates.
    pub fn local_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size)
    }

    /// Box corners in canvas space: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        let a = self.to_affine();
        let Size { width, height } = self.size;
        [
            a * Point::new(0.0, 0.0),
            a * Point::new(width, 0.0),
            a * Point::new(width, height),
            a * Point::new(0.0, height),
        ]
    }

    /// Return `true` when canvas point `p` falls on the (possibly rotated) overlay box.
    pub fn contains(&self, p: Point) -> bool {
        let a = self.to_affine();
        if a.determinant().abs() < f64::EPSILON {
            return false;
        }
        self.local_rect().contains(a.inverse() * p)
    }

    /// Where the removal affordance sits: the top-right corner of the position/scaled-size box,
    /// raised by `margin`.
    ///
    /// Plain arithmetic; zero or negative scale passes straight through.
    pub fn affordance_anchor(&self, margin: f64) -> Point {
        let eff = self.effective_size();
        Point::new(self.position.x + eff.width, self.position.y - margin)
    }
}

/// A decorative graphic placed above the background.
#[derive(Clone, Debug)]
pub struct Overlay {
    /// Identity.
    pub id: OverlayId,
    /// Gear name or file name the overlay was created from.
    pub label: String,
    /// Decoded source graphic.
    pub graphic: PreparedGraphic,
    /// Current placement.
    pub geometry: OverlayGeometry,
    /// Whether pointer drags move the overlay.
    pub draggable: bool,
}

/// Marker that deletes its overlay when clicked. Visible only while its overlay is selected.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RemovalAffordance {
    /// Marker center in canvas pixels.
    pub position: Point,
    /// Visibility flag.
    pub visible: bool,
}

impl RemovalAffordance {
    /// Return `true` when `p` is within `radius` of the marker center and the marker is shown.
    pub fn hit(&self, p: Point, radius: f64) -> bool {
        self.visible && (p - self.position).hypot() <= radius
    }
}

/// An overlay together with its one removal affordance.
#[derive(Clone, Debug)]
pub struct OverlayEntry {
    /// The overlay.
    pub overlay: Overlay,
    /// Its removal affordance.
    pub affordance: RemovalAffordance,
}

impl OverlayEntry {
    /// Pair `overlay` with a hidden affordance anchored `margin` above its top-right corner.
    pub fn new(overlay: Overlay, margin: f64) -> Self {
        let affordance = RemovalAffordance {
            position: overlay.geometry.affordance_anchor(margin),
            visible: false,
        };
        Self {
            overlay,
            affordance,
        }
    }

    /// Overlay identity.
    pub fn id(&self) -> OverlayId {
        self.overlay.id
    }
}

/// Background plus overlays in paint order (front = last).
#[derive(Clone, Debug)]
pub struct Scene {
    display_width: u32,
    canvas: Option<Canvas>,
    background: Option<PreparedImage>,
    background_generation: u64,
    entries: Vec<OverlayEntry>,
    next_id: u64,
    attached: HashSet<OverlayId>,
}

impl Scene {
    /// Empty scene whose canvas will be `display_width` pixels wide.
    pub fn new(display_width: u32) -> Self {
        Self {
            display_width,
            canvas: None,
            background: None,
            background_generation: 0,
            entries: Vec::new(),
            next_id: 1,
            attached: HashSet::new(),
        }
    }

    /// Canvas dimensions, once a background has been loaded.
    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    /// Current background image.
    pub fn background(&self) -> Option<&PreparedImage> {
        self.background.as_ref()
    }

    /// Bumped every time the background is replaced.
    pub fn background_generation(&self) -> u64 {
        self.background_generation
    }

    /// Set the background image.
    ///
    /// The first background fixes the canvas size for the rest of the session; later uploads
    /// are stretched into it.
    pub fn load_background(&mut self, image: PreparedImage) -> GearResult<Canvas> {
        let canvas = match self.canvas {
            Some(c) => c,
            None => sizing::fit_to_width(self.display_width, image.size())?,
        };
        self.canvas = Some(canvas);
        self.background = Some(image);
        self.background_generation += 1;
        Ok(canvas)
    }

    /// Hand out the next overlay id.
    pub fn reserve_id(&mut self) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Return `true` when `id` was reserved by this scene and has never been attached.
    pub fn can_attach(&self, id: OverlayId) -> bool {
        (1..self.next_id).contains(&id.0) && !self.attached.contains(&id)
    }

    /// Append an entry at the front of paint order.
    pub(crate) fn push(&mut self, entry: OverlayEntry) {
        debug_assert!(self.can_attach(entry.id()), "id reuse {}", entry.id());
        self.attached.insert(entry.id());
        self.entries.push(entry);
    }

    /// Entries in paint order.
    pub fn entries(&self) -> &[OverlayEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [OverlayEntry] {
        &mut self.entries
    }

    /// Overlay ids in paint order.
    pub fn overlay_ids(&self) -> Vec<OverlayId> {
        self.entries.iter().map(OverlayEntry::id).collect()
    }

    /// Number of overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when there are no overlays.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return `true` when `id` is in the scene.
    pub fn contains(&self, id: OverlayId) -> bool {
        self.index_of(id).is_some()
    }

    /// Paint-order index of `id`.
    pub fn index_of(&self, id: OverlayId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Look up an entry.
    pub fn get(&self, id: OverlayId) -> Option<&OverlayEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: OverlayId) -> Option<&mut OverlayEntry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    /// Move `id` to the front of paint order.
    pub(crate) fn raise_to_top(&mut self, id: OverlayId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let entry = self.entries.remove(idx);
        self.entries.push(entry);
        true
    }

    /// Detach `id` (overlay and affordance together).
    pub(crate) fn take(&mut self, id: OverlayId) -> Option<OverlayEntry> {
        let idx = self.index_of(id)?;
        Some(self.entries.remove(idx))
    }

    /// Frontmost overlay whose box contains `p`.
    pub fn overlay_at(&self, p: Point) -> Option<OverlayId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.overlay.geometry.contains(p))
            .map(OverlayEntry::id)
    }

    /// Frontmost overlay whose visible removal affordance is under `p`.
    pub fn affordance_at(&self, p: Point, radius: f64) -> Option<OverlayId> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.affordance.hit(p, radius))
            .map(OverlayEntry::id)
    }

    /// Ids of overlays whose affordance is currently shown.
    pub fn visible_affordances(&self) -> Vec<OverlayId> {
        self.entries
            .iter()
            .filter(|e| e.affordance.visible)
            .map(OverlayEntry::id)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
