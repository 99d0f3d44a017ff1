use crate::config::MinSizePolicy;
use crate::foundation::core::Vec2;
use crate::scene::model::{OverlayEntry, OverlayGeometry, OverlayId, Scene};
use crate::selection::transform::{Anchor, TransformControl};

/// Owns the 0-or-1 selection, the transform control, and removal-affordance visibility.
///
/// Every show/hide of an affordance goes through this type. The scene is passed in by the
/// caller that owns it; the manager never keeps a reference to it.
#[derive(Clone, Debug)]
pub struct SelectionManager {
    selected: Option<OverlayId>,
    control: TransformControl,
    affordance_margin: f64,
    redraw_pending: bool,
}

impl SelectionManager {
    /// Manager with nothing selected.
    pub fn new(min_size: MinSizePolicy, affordance_margin: f64) -> Self {
        Self {
            selected: None,
            control: TransformControl::new(min_size),
            affordance_margin,
            redraw_pending: false,
        }
    }

    /// Currently selected overlay.
    pub fn selected(&self) -> Option<OverlayId> {
        self.selected
    }

    /// The shared transform control.
    pub fn control(&self) -> &TransformControl {
        &self.control
    }

    /// Mutable access to control flags (rotation, ratio lock).
    pub fn control_mut(&mut self) -> &mut TransformControl {
        &mut self.control
    }

    /// Ask for a redraw without changing the selection.
    pub fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }

    /// Return and clear the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// Select `id`: hide the previous affordance, bind the control, show and place `id`'s
    /// affordance, and raise `id` to the front.
    ///
    /// Returns `false` (and changes nothing) when `id` is not in `scene`.
    #[tracing::instrument(level = "debug", skip(self, scene))]
    pub fn select_overlay(&mut self, scene: &mut Scene, id: OverlayId) -> bool {
        if !scene.contains(id) {
            tracing::debug!("select ignored: not in scene");
            return false;
        }
        if let Some(prev) = self.selected.filter(|prev| *prev != id)
            && let Some(entry) = scene.get_mut(prev)
        {
            entry.affordance.visible = false;
        }

        self.selected = Some(id);
        self.control.attach(id);
        scene.raise_to_top(id);
        if let Some(entry) = scene.get_mut(id) {
            entry.affordance.visible = true;
        }
        self.on_overlay_geometry_changed(scene, id);
        self.redraw_pending = true;
        true
    }

    /// Clear the selection, detach the control, and hide every affordance.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn deselect_all(&mut self, scene: &mut Scene) {
        self.selected = None;
        self.control.detach();
        for entry in scene.entries_mut() {
            entry.affordance.visible = false;
        }
        self.redraw_pending = true;
    }

    /// Re-anchor `id`'s affordance to its overlay's current geometry.
    pub fn on_overlay_geometry_changed(&self, scene: &mut Scene, id: OverlayId) -> bool {
        let margin = self.affordance_margin;
        match scene.get_mut(id) {
            Some(entry) => {
                entry.affordance.position = entry.overlay.geometry.affordance_anchor(margin);
                true
            }
            None => {
                tracing::debug!(%id, "geometry update ignored: not in scene");
                false
            }
        }
    }

    /// Remove `id` and its affordance; clears the selection if `id` was selected.
    #[tracing::instrument(level = "debug", skip(self, scene))]
    pub fn remove_overlay(&mut self, scene: &mut Scene, id: OverlayId) -> Option<OverlayEntry> {
        let Some(entry) = scene.take(id) else {
            tracing::debug!("remove ignored: not in scene");
            return None;
        };
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.control.is_attached_to(id) {
            self.control.detach();
        }
        self.redraw_pending = true;
        Some(entry)
    }

    /// Move a draggable overlay by `delta`.
    pub fn drag_overlay(&mut self, scene: &mut Scene, id: OverlayId, delta: Vec2) -> bool {
        let Some(entry) = scene.get_mut(id) else {
            tracing::debug!(%id, "drag ignored: not in scene");
            return false;
        };
        if !entry.overlay.draggable {
            tracing::debug!(%id, "drag ignored: not draggable");
            return false;
        }
        entry.overlay.geometry.position += delta;
        self.on_overlay_geometry_changed(scene, id);
        self.redraw_pending = true;
        true
    }

    /// Drag a resize anchor of the control. Only the overlay the control is bound to resizes.
    ///
    /// Returns `true` when the geometry changed; proposals below the min-size policy are
    /// rejected.
    pub fn resize_overlay(
        &mut self,
        scene: &mut Scene,
        id: OverlayId,
        anchor: Anchor,
        delta: Vec2,
    ) -> bool {
        self.apply_transform(scene, id, |control, old| {
            control.resize_proposal(old, anchor, delta)
        })
    }

    /// Rotate the bound overlay to an absolute angle about its center.
    pub fn rotate_overlay(&mut self, scene: &mut Scene, id: OverlayId, rotation_rad: f64) -> bool {
        self.apply_transform(scene, id, |control, old| {
            control.rotate_proposal(old, rotation_rad)
        })
    }

    /// Replace the bound overlay's geometry, subject to the min-size policy.
    pub fn set_geometry(
        &mut self,
        scene: &mut Scene,
        id: OverlayId,
        geometry: OverlayGeometry,
    ) -> bool {
        self.apply_transform(scene, id, |_, _| geometry)
    }

    fn apply_transform(
        &mut self,
        scene: &mut Scene,
        id: OverlayId,
        propose: impl FnOnce(&TransformControl, OverlayGeometry) -> OverlayGeometry,
    ) -> bool {
        if !self.control.is_attached_to(id) {
            tracing::debug!(%id, "transform ignored: control not attached");
            return false;
        }
        let Some(entry) = scene.get_mut(id) else {
            tracing::debug!(%id, "transform ignored: not in scene");
            return false;
        };
        let old = entry.overlay.geometry;
        let next = self.control.bound_box(old, propose(&self.control, old));
        if next == old {
            return false;
        }
        entry.overlay.geometry = next;
        self.on_overlay_geometry_changed(scene, id);
        self.redraw_pending = true;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/manager.rs"]
mod tests;
