use std::borrow::Cow;

use crate::assets::decode::{decode_data_url, decode_image};
use crate::assets::gear::GearKind;
use crate::config::EditorConfig;
use crate::editor::pending::{DecodedOverlay, OverlaySource, PendingOverlay};
use crate::export::png::ExportedImage;
use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::foundation::error::{GearError, GearResult};
use crate::render::cpu::{CpuRenderer, RenderOptions};
use crate::render::frame::FrameRGBA;
use crate::scene::model::{Overlay, OverlayEntry, OverlayGeometry, OverlayId, Scene};
use crate::selection::manager::SelectionManager;
use crate::selection::transform::Anchor;

/// Pointer distance within which a transform-control handle is grabbed, in canvas pixels.
pub const HANDLE_HIT_RADIUS: f64 = 8.0;

/// What a pointer press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerOutcome {
    /// A visible removal affordance was hit and its overlay removed.
    Removed(OverlayId),
    /// A handle of the transform control was grabbed.
    Handle,
    /// An overlay was hit and is now selected.
    Selected(OverlayId),
    /// Empty canvas was hit; nothing is selected.
    Deselected,
}

#[derive(Clone, Copy, Debug)]
enum DragState {
    Idle,
    Move { id: OverlayId, last: Point },
    Resize { id: OverlayId, anchor: Anchor, last: Point },
    Rotate { id: OverlayId },
}

/// One editing session: the scene, its selection, and the renderer.
///
/// All mutation goes through `&mut self`. Pointer events and user actions are routed to the
/// [`SelectionManager`]; the scene is never touched from anywhere else.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    selection: SelectionManager,
    renderer: CpuRenderer,
    drag: DragState,
}

impl Editor {
    /// Start an empty session. Fails when `config` does not validate.
    pub fn new(config: EditorConfig) -> GearResult<Self> {
        config.validate()?;
        Ok(Self {
            scene: Scene::new(config.display_width),
            selection: SelectionManager::new(config.min_overlay_size, config.affordance_margin),
            renderer: CpuRenderer::new(config.clear_rgba, config.affordance_radius),
            drag: DragState::Idle,
            config,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene being edited.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Selection state.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Toggle the rotate handle of the transform control.
    pub fn set_rotate_enabled(&mut self, enabled: bool) {
        self.selection.control_mut().rotate_enabled = enabled;
    }

    /// Toggle aspect-ratio locking on corner drags.
    pub fn set_keep_ratio(&mut self, keep: bool) {
        self.selection.control_mut().keep_ratio = keep;
    }

    /// Decode `bytes` and make them the background.
    ///
    /// The first upload fixes the canvas; later uploads keep it and are stretched to fit.
    #[tracing::instrument(level = "info", skip_all, fields(len = bytes.len()))]
    pub fn upload_background(&mut self, bytes: &[u8]) -> GearResult<Canvas> {
        let image = decode_image(bytes)?;
        let canvas = self.scene.load_background(image)?;
        tracing::info!(width = canvas.width, height = canvas.height, "background loaded");
        self.selection.request_redraw();
        Ok(canvas)
    }

    /// [`Editor::upload_background`] from a `data:` URL.
    pub fn upload_data_url(&mut self, url: &str) -> GearResult<Canvas> {
        let bytes = decode_data_url(url)?;
        self.upload_background(&bytes)
    }

    /// Upload handler for the file picker: no file or an empty file does nothing, and a
    /// file that fails to decode is logged and otherwise ignored.
    pub fn handle_upload(&mut self, bytes: Option<&[u8]>) -> Option<Canvas> {
        let bytes = bytes.filter(|b| !b.is_empty())?;
        match self.upload_background(bytes) {
            Ok(canvas) => Some(canvas),
            Err(e) => {
                tracing::warn!(error = %e, "upload ignored");
                None
            }
        }
    }

    /// Reserve an id for a new overlay and capture its source. Nothing else changes until
    /// the decoded result is passed to [`Editor::attach_decoded`].
    pub fn request_overlay(&mut self, source: OverlaySource) -> PendingOverlay {
        let (label, bytes) = match source {
            OverlaySource::Gear(kind) => {
                (kind.name().to_string(), Cow::Borrowed(kind.svg_bytes()))
            }
            OverlaySource::Bytes { label, bytes } => (label, Cow::Owned(bytes)),
        };
        let [x, y] = self.config.overlay_default_offset;
        let pending = PendingOverlay {
            id: self.scene.reserve_id(),
            label,
            bytes,
            origin: Point::new(x, y),
            target_height: self.config.overlay_default_height,
        };
        tracing::debug!(id = %pending.id, label = %pending.label, "overlay requested");
        pending
    }

    /// Append a decoded overlay to the top of paint order.
    ///
    /// Completions may arrive in any order; each keeps the id reserved for it.
    #[tracing::instrument(level = "debug", skip_all, fields(id = %decoded.id))]
    pub fn attach_decoded(&mut self, decoded: DecodedOverlay) -> GearResult<OverlayId> {
        let id = decoded.id;
        if !self.scene.can_attach(id) {
            return Err(GearError::validation(format!(
                "{id} was not reserved by this session or was already attached"
            )));
        }
        let overlay = Overlay {
            id,
            label: decoded.label,
            graphic: decoded.graphic,
            geometry: decoded.geometry,
            draggable: true,
        };
        let margin = self.config.affordance_margin;
        self.scene.push(OverlayEntry::new(overlay, margin));
        self.selection.request_redraw();
        tracing::info!(%id, count = self.scene.len(), "overlay added");
        Ok(id)
    }

    /// Add a bundled gear overlay.
    pub fn add_gear(&mut self, kind: GearKind) -> GearResult<OverlayId> {
        let decoded = self.request_overlay(OverlaySource::Gear(kind)).decode()?;
        self.attach_decoded(decoded)
    }

    /// Add an overlay from encoded raster or SVG bytes.
    pub fn add_overlay_bytes(
        &mut self,
        label: impl Into<String>,
        bytes: Vec<u8>,
    ) -> GearResult<OverlayId> {
        let source = OverlaySource::Bytes {
            label: label.into(),
            bytes,
        };
        let decoded = self.request_overlay(source).decode()?;
        self.attach_decoded(decoded)
    }

    /// Button handler for "Add <gear>": a gear that fails to load is logged and skipped.
    pub fn handle_add_gear(&mut self, kind: GearKind) -> Option<OverlayId> {
        match self.add_gear(kind) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(gear = %kind, error = %e, "gear not added");
                None
            }
        }
    }

    /// Select `id`. Unknown ids are ignored.
    pub fn select(&mut self, id: OverlayId) -> bool {
        self.selection.select_overlay(&mut self.scene, id)
    }

    /// Clear the selection and hide every removal affordance.
    pub fn deselect_all(&mut self) {
        self.selection.deselect_all(&mut self.scene);
    }

    /// Remove `id` together with its affordance.
    pub fn remove(&mut self, id: OverlayId) -> bool {
        let removed = self.selection.remove_overlay(&mut self.scene, id).is_some();
        if removed {
            tracing::info!(%id, count = self.scene.len(), "overlay removed");
        }
        removed
    }

    /// Move `id` by `delta`.
    pub fn drag(&mut self, id: OverlayId, delta: Vec2) -> bool {
        self.selection.drag_overlay(&mut self.scene, id, delta)
    }

    /// Drag a corner anchor of the selected overlay by `delta`.
    pub fn resize(&mut self, id: OverlayId, anchor: Anchor, delta: Vec2) -> bool {
        self.selection.resize_overlay(&mut self.scene, id, anchor, delta)
    }

    /// Rotate the selected overlay to `rotation_rad` about its center.
    pub fn rotate(&mut self, id: OverlayId, rotation_rad: f64) -> bool {
        self.selection.rotate_overlay(&mut self.scene, id, rotation_rad)
    }

    /// Replace the selected overlay's geometry, subject to the min-size policy.
    pub fn set_geometry(&mut self, id: OverlayId, geometry: OverlayGeometry) -> bool {
        self.selection.set_geometry(&mut self.scene, id, geometry)
    }

    /// Pointer press at canvas point `p`.
    ///
    /// A visible removal affordance wins, then the selected overlay's control handles, then
    /// the frontmost overlay under the pointer; a press on empty canvas deselects.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn pointer_down(&mut self, p: Point) -> PointerOutcome {
        self.drag = DragState::Idle;

        if let Some(id) = self.scene.affordance_at(p, self.config.affordance_radius) {
            self.remove(id);
            return PointerOutcome::Removed(id);
        }

        if let Some(drag) = self.handle_at(p) {
            self.drag = drag;
            return PointerOutcome::Handle;
        }

        match self.scene.overlay_at(p) {
            Some(id) => {
                self.select(id);
                self.drag = DragState::Move { id, last: p };
                PointerOutcome::Selected(id)
            }
            None => {
                self.deselect_all();
                PointerOutcome::Deselected
            }
        }
    }

    /// Pointer motion while pressed. Returns `true` when geometry changed.
    pub fn pointer_move(&mut self, p: Point) -> bool {
        match self.drag {
            DragState::Idle => false,
            DragState::Move { id, last } => {
                self.drag = DragState::Move { id, last: p };
                self.drag(id, p - last)
            }
            DragState::Resize { id, anchor, last } => {
                self.drag = DragState::Resize { id, anchor, last: p };
                self.resize(id, anchor, p - last)
            }
            DragState::Rotate { id } => {
                let Some(entry) = self.scene.get(id) else {
                    return false;
                };
                let center = box_center(&entry.overlay.geometry);
                let v = p - center;
                if v.hypot() < f64::EPSILON {
                    return false;
                }
                self.rotate(id, v.y.atan2(v.x) + std::f64::consts::FRAC_PI_2)
            }
        }
    }

    /// Pointer release; ends any drag.
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Press and release at `p` without motion.
    pub fn click(&mut self, p: Point) -> PointerOutcome {
        let outcome = self.pointer_down(p);
        self.pointer_up();
        outcome
    }

    fn handle_at(&self, p: Point) -> Option<DragState> {
        let id = self.selection.selected()?;
        let control = self.selection.control();
        if !control.is_attached_to(id) {
            return None;
        }
        let geometry = self.scene.get(id)?.overlay.geometry;
        if let Some((anchor, _)) = control
            .anchor_points(&geometry)
            .into_iter()
            .find(|(_, at)| (p - *at).hypot() <= HANDLE_HIT_RADIUS)
        {
            return Some(DragState::Resize {
                id,
                anchor,
                last: p,
            });
        }
        if control.rotate_enabled
            && (p - control.rotate_handle_point(&geometry)).hypot() <= HANDLE_HIT_RADIUS
        {
            return Some(DragState::Rotate { id });
        }
        None
    }

    /// Render the on-screen view: scene plus selection UI.
    pub fn render_preview(&mut self) -> GearResult<FrameRGBA> {
        self.renderer.render(
            &self.scene,
            &self.selection,
            RenderOptions { include_ui: true },
        )
    }

    /// Flatten the scene to a PNG named after `export_filename`.
    ///
    /// Clears the selection and hides every affordance first; the selection is not restored.
    #[tracing::instrument(level = "info", skip_all)]
    pub fn export(&mut self) -> GearResult<ExportedImage> {
        if self.scene.background().is_none() {
            return Err(GearError::validation("no background image to export"));
        }
        self.deselect_all();
        let frame = self
            .renderer
            .render(&self.scene, &self.selection, RenderOptions::default())?;
        let image = ExportedImage::from_frame(frame, self.config.export_filename.clone())?;
        tracing::info!(
            filename = %image.filename,
            width = image.width,
            height = image.height,
            overlays = self.scene.len(),
            "exported"
        );
        Ok(image)
    }

    /// Return and clear the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        self.selection.take_redraw_request()
    }
}

fn box_center(geometry: &OverlayGeometry) -> Point {
    let eff = geometry.effective_size();
    let half = Point::new(eff.width / 2.0, eff.height / 2.0);
    geometry.position + (Affine::rotate(geometry.rotation_rad) * half).to_vec2()
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
