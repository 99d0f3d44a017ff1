use std::io::Cursor;

use super::*;
use crate::export::png::encode_png;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn editor_with_photo() -> Editor {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let canvas = editor
        .upload_background(&png_bytes(800, 600, [30, 90, 160, 255]))
        .unwrap();
    assert_eq!((canvas.width, canvas.height), (800, 600));
    editor
}

fn crown_width() -> f64 {
    100.0 * 200.0 / 140.0
}

#[test]
fn new_rejects_invalid_config() {
    let config = EditorConfig {
        display_width: 0,
        ..EditorConfig::default()
    };
    assert!(Editor::new(config).is_err());
}

#[test]
fn decorate_scenario() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();

    let g = editor.scene().get(id).unwrap().overlay.geometry;
    assert_eq!(g.position, Point::new(50.0, 50.0));
    assert!(approx(g.size.height, 100.0));
    assert!(approx(g.size.width, crown_width()));
    assert!(editor.scene().visible_affordances().is_empty());

    assert_eq!(
        editor.click(Point::new(100.0, 100.0)),
        PointerOutcome::Selected(id)
    );
    assert_eq!(editor.selection().selected(), Some(id));
    assert_eq!(editor.scene().visible_affordances(), vec![id]);
    let marker = editor.scene().get(id).unwrap().affordance.position;
    assert!(approx(marker.x, 50.0 + crown_width()));
    assert!(approx(marker.y, 40.0));

    assert_eq!(
        editor.click(Point::new(700.0, 500.0)),
        PointerOutcome::Deselected
    );
    assert!(editor.scene().visible_affordances().is_empty());

    editor.select(id);
    let exported = editor.export().unwrap();
    assert_eq!(exported.filename, "edited-image.png");
    assert_eq!((exported.width, exported.height), (800, 600));
    assert_eq!(editor.selection().selected(), None);
    assert!(editor.scene().visible_affordances().is_empty());
}

#[test]
fn handle_upload_ignores_missing_empty_and_broken_files() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    assert_eq!(editor.handle_upload(None), None);
    assert_eq!(editor.handle_upload(Some(&[][..])), None);
    assert_eq!(editor.handle_upload(Some(&b"not an image"[..])), None);
    assert!(editor.scene().canvas().is_none());

    let png = png_bytes(400, 100, [0, 0, 0, 255]);
    let canvas = editor.handle_upload(Some(png.as_slice())).unwrap();
    assert_eq!((canvas.width, canvas.height), (800, 200));
}

#[test]
fn second_upload_keeps_canvas_and_overlays() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::SaberBlue).unwrap();
    let canvas = editor
        .upload_background(&png_bytes(100, 400, [0, 0, 0, 255]))
        .unwrap();
    assert_eq!((canvas.width, canvas.height), (800, 600));
    assert!(editor.scene().contains(id));
}

#[test]
fn upload_data_url_decodes_background() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let png = png_bytes(16, 9, [1, 2, 3, 255]);
    let url = crate::assets::decode::encode_data_url("image/png", &png);
    let canvas = editor.upload_data_url(&url).unwrap();
    assert_eq!((canvas.width, canvas.height), (800, 450));
}

#[test]
fn repeated_adds_give_distinct_entries() {
    let mut editor = editor_with_photo();
    let ids: Vec<_> = (0..3)
        .map(|_| editor.add_gear(GearKind::Crown).unwrap())
        .collect();
    assert_eq!(editor.scene().len(), 3);
    assert_eq!(editor.scene().overlay_ids(), ids);
    assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);
}

#[test]
fn out_of_order_completions_keep_reserved_ids() {
    let mut editor = editor_with_photo();
    let pending: Vec<_> = GearKind::ALL
        .iter()
        .map(|kind| editor.request_overlay(OverlaySource::Gear(*kind)))
        .collect();
    let reserved: Vec<_> = pending.iter().map(PendingOverlay::id).collect();
    assert!(editor.scene().is_empty());

    for p in pending.into_iter().rev() {
        editor.attach_decoded(p.decode().unwrap()).unwrap();
    }
    let mut expected = reserved.clone();
    expected.reverse();
    assert_eq!(editor.scene().overlay_ids(), expected);
}

#[test]
fn pending_overlays_decode_on_worker_threads() {
    let mut editor = editor_with_photo();
    let pending: Vec<_> = (0..4)
        .map(|_| editor.request_overlay(OverlaySource::Gear(GearKind::SaberRed)))
        .collect();
    let decoded: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = pending
            .into_iter()
            .map(|p| s.spawn(move || p.decode().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for d in decoded {
        editor.attach_decoded(d).unwrap();
    }
    assert_eq!(editor.scene().len(), 4);
}

#[test]
fn attaching_twice_is_rejected() {
    let mut editor = editor_with_photo();
    let decoded = editor
        .request_overlay(OverlaySource::Gear(GearKind::Crown))
        .decode()
        .unwrap();
    editor.attach_decoded(decoded.clone()).unwrap();
    assert!(matches!(
        editor.attach_decoded(decoded),
        Err(GearError::Validation(_))
    ));
    assert_eq!(editor.scene().len(), 1);
}

#[test]
fn removed_ids_cannot_be_reattached() {
    let mut editor = editor_with_photo();
    let decoded = editor
        .request_overlay(OverlaySource::Gear(GearKind::Crown))
        .decode()
        .unwrap();
    let id = editor.attach_decoded(decoded.clone()).unwrap();
    assert!(editor.remove(id));
    assert!(matches!(
        editor.attach_decoded(decoded),
        Err(GearError::Validation(_))
    ));
    assert!(!editor.scene().contains(id));

    // Ids handed out by another session are not accepted either.
    let mut other = editor_with_photo();
    let foreign = other
        .request_overlay(OverlaySource::Gear(GearKind::SaberRed))
        .decode()
        .unwrap();
    let mut fresh = Editor::new(EditorConfig::default()).unwrap();
    assert!(fresh.attach_decoded(foreign).is_err());
}

#[test]
fn uploads_the_renderer_cannot_draw_are_ignored() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    // 10x1000 would need an 800x80000 canvas.
    let tall = png_bytes(10, 1000, [0, 0, 0, 255]);
    assert_eq!(editor.handle_upload(Some(tall.as_slice())), None);
    let huge = png_bytes(70_000, 2, [0, 0, 0, 255]);
    assert_eq!(editor.handle_upload(Some(huge.as_slice())), None);
    assert!(editor.scene().canvas().is_none());

    let canvas = editor
        .handle_upload(Some(png_bytes(400, 300, [0, 0, 0, 255]).as_slice()))
        .unwrap();
    assert_eq!((canvas.width, canvas.height), (800, 600));
    assert!(editor.export().is_ok());
}

#[test]
fn svg_overlays_with_leading_comments_are_added() {
    let mut editor = editor_with_photo();
    let svg = br##"<!-- made by hand -->
<svg xmlns="http://www.w3.org/2000/svg" width="50" height="25">
<rect width="50" height="25" fill="#00ff00"/></svg>"##;
    let id = editor.add_overlay_bytes("c.svg", svg.to_vec()).unwrap();
    let g = editor.scene().get(id).unwrap().overlay.geometry;
    assert!(approx(g.size.width, 200.0));
}

#[test]
fn broken_overlay_bytes_are_skipped() {
    let mut editor = editor_with_photo();
    assert!(editor.add_overlay_bytes("junk.png", b"junk".to_vec()).is_err());
    assert!(editor.scene().is_empty());

    let id = editor
        .add_overlay_bytes("dot.png", png_bytes(20, 10, [255, 0, 0, 255]))
        .unwrap();
    let g = editor.scene().get(id).unwrap().overlay.geometry;
    assert!(approx(g.size.width, 200.0));
    assert_eq!(editor.scene().get(id).unwrap().overlay.label, "dot.png");
}

#[test]
fn clicking_visible_affordance_removes_overlay() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    // Hidden affordances do not react to clicks.
    let marker = editor.scene().get(id).unwrap().affordance.position;
    assert_ne!(editor.click(marker), PointerOutcome::Removed(id));

    editor.select(id);
    assert_eq!(editor.click(marker), PointerOutcome::Removed(id));
    assert!(editor.scene().is_empty());
    assert_eq!(editor.selection().selected(), None);
    assert_eq!(editor.selection().control().attached(), None);
}

#[test]
fn selecting_another_overlay_moves_the_affordance() {
    let mut editor = editor_with_photo();
    let a = editor.add_gear(GearKind::Crown).unwrap();
    let b = editor.add_gear(GearKind::SaberBlue).unwrap();
    editor.select(a);
    editor.select(b);
    assert_eq!(editor.scene().visible_affordances(), vec![b]);
    assert_eq!(editor.scene().overlay_ids().last(), Some(&b));
}

#[test]
fn pointer_drag_moves_selected_overlay() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    assert_eq!(
        editor.pointer_down(Point::new(60.0, 60.0)),
        PointerOutcome::Selected(id)
    );
    assert!(editor.pointer_move(Point::new(70.0, 80.0)));
    assert!(editor.pointer_move(Point::new(75.0, 80.0)));
    editor.pointer_up();
    assert!(!editor.pointer_move(Point::new(500.0, 500.0)));

    let entry = editor.scene().get(id).unwrap();
    assert_eq!(entry.overlay.geometry.position, Point::new(65.0, 70.0));
    assert!(approx(entry.affordance.position.x, 65.0 + crown_width()));
    assert!(approx(entry.affordance.position.y, 60.0));
}

#[test]
fn corner_handle_resizes_keeping_ratio() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    editor.select(id);

    let corner = Point::new(50.0 + crown_width(), 150.0);
    assert_eq!(editor.pointer_down(corner), PointerOutcome::Handle);
    assert!(editor.pointer_move(corner + Vec2::new(crown_width() * 0.1, 10.0)));
    editor.pointer_up();

    let g = editor.scene().get(id).unwrap().overlay.geometry;
    assert!((g.scale.x - 1.1).abs() < 1e-6);
    assert!((g.scale.y - 1.1).abs() < 1e-6);
    assert_eq!(g.position, Point::new(50.0, 50.0));
    let marker = editor.scene().get(id).unwrap().affordance.position;
    assert!(approx(marker.x, 50.0 + crown_width() * 1.1));
}

#[test]
fn resize_below_minimum_is_rejected() {
    let mut editor = editor_with_photo();
    editor.set_keep_ratio(false);
    let id = editor.add_gear(GearKind::Crown).unwrap();
    editor.select(id);
    let before = editor.scene().get(id).unwrap().overlay.geometry;
    assert!(!editor.resize(id, Anchor::BottomRight, Vec2::new(-crown_width() + 5.0, 0.0)));
    assert_eq!(editor.scene().get(id).unwrap().overlay.geometry, before);
}

#[test]
fn rotate_handle_turns_about_center() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    editor.select(id);

    let half_w = crown_width() / 2.0;
    let knob = Point::new(50.0 + half_w, 50.0 - ROTATE_OFFSET);
    assert_eq!(editor.pointer_down(knob), PointerOutcome::Handle);
    let center = Point::new(50.0 + half_w, 100.0);
    assert!(editor.pointer_move(center + Vec2::new(100.0, 0.0)));
    editor.pointer_up();

    let g = editor.scene().get(id).unwrap().overlay.geometry;
    assert!(approx(g.rotation_rad, std::f64::consts::FRAC_PI_2));
    let c = box_center(&g);
    assert!(approx(c.x, center.x) && approx(c.y, center.y));
}

const ROTATE_OFFSET: f64 = crate::selection::transform::ROTATE_HANDLE_OFFSET;

#[test]
fn rotation_can_be_disabled() {
    let mut editor = editor_with_photo();
    editor.set_rotate_enabled(false);
    let id = editor.add_gear(GearKind::Crown).unwrap();
    editor.select(id);
    assert!(!editor.rotate(id, 1.0));
}

#[test]
fn transforms_need_the_control() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    assert!(!editor.rotate(id, 1.0));
    assert!(!editor.resize(id, Anchor::TopLeft, Vec2::new(-10.0, -10.0)));
    assert!(editor.drag(id, Vec2::new(1.0, 1.0)));
}

#[test]
fn unknown_ids_are_ignored() {
    let mut editor = editor_with_photo();
    let ghost = OverlayId(99);
    assert!(!editor.select(ghost));
    assert!(!editor.remove(ghost));
    assert!(!editor.drag(ghost, Vec2::new(1.0, 0.0)));
    assert_eq!(editor.selection().selected(), None);
}

#[test]
fn export_without_background_is_a_validation_error() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    assert!(matches!(editor.export(), Err(GearError::Validation(_))));
}

#[test]
fn export_without_overlays_matches_plain_render() {
    let mut editor = editor_with_photo();
    let preview = editor.render_preview().unwrap();
    let exported = editor.export().unwrap();
    assert_eq!(exported.png, encode_png(preview).unwrap());
}

#[test]
fn export_drops_selection_ui() {
    let mut editor = editor_with_photo();
    let id = editor.add_gear(GearKind::Crown).unwrap();
    editor.select(id);
    let with_ui = editor.render_preview().unwrap();
    let exported = editor.export().unwrap();
    let after = editor.render_preview().unwrap();
    assert_ne!(encode_png(with_ui).unwrap(), exported.png);
    assert_eq!(encode_png(after).unwrap(), exported.png);
}

#[test]
fn redraw_requests_are_consumed() {
    let mut editor = editor_with_photo();
    assert!(editor.take_redraw_request());
    assert!(!editor.take_redraw_request());
    editor.add_gear(GearKind::Crown).unwrap();
    assert!(editor.take_redraw_request());
}
