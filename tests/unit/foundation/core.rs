use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(800, 450).unwrap();
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 800.0, 450.0));
}

#[test]
fn canvas_contains_is_half_open() {
    let c = Canvas::new(10, 10).unwrap();
    assert!(c.contains(Point::new(0.0, 0.0)));
    assert!(c.contains(Point::new(9.5, 9.5)));
    assert!(!c.contains(Point::new(10.0, 5.0)));
    assert!(!c.contains(Point::new(-0.1, 5.0)));
}

#[test]
fn canvas_rejects_sides_the_renderer_cannot_address() {
    assert!(Canvas::new(MAX_RASTER_DIM, MAX_RASTER_DIM).is_ok());
    assert!(matches!(
        Canvas::new(800, MAX_RASTER_DIM + 1),
        Err(GearError::Validation(_))
    ));
    assert!(Canvas::new(MAX_RASTER_DIM + 1, 1).is_err());
}
