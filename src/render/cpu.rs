use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::decode::{PreparedGraphic, PreparedImage, PreparedSvg};
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::foundation::core::{Affine, BezPath, Point, Vec2};
use crate::foundation::error::{GearError, GearResult};
use crate::render::frame::FrameRGBA;
use crate::scene::model::{OverlayEntry, OverlayId, Scene};
use crate::selection::manager::SelectionManager;
use crate::selection::transform::TransformControl;

const CONTROL_RGBA: [u8; 4] = [0, 161, 255, 255];
const AFFORDANCE_RGBA: [u8; 4] = [220, 38, 38, 255];
const WHITE_RGBA: [u8; 4] = [255, 255, 255, 255];
const CONTROL_LINE_PX: f64 = 1.5;
const ANCHOR_HALF_PX: f64 = 5.0;
const ROTATE_KNOB_RADIUS_PX: f64 = 5.0;

/// What to draw on top of the flattened scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw the transform control and visible removal affordances (the on-screen view).
    pub include_ui: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PaintKey {
    Background(u64),
    Overlay(OverlayId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    overlay: OverlayId,
    width: u32,
    height: u32,
}

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuRenderer {
    clear_rgba: [u8; 4],
    affordance_radius: f64,
    image_cache: HashMap<PaintKey, vello_cpu::Image>,
    svg_cache: HashMap<SvgRasterKey, vello_cpu::Image>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("clear_rgba", &self.clear_rgba)
            .field("affordance_radius", &self.affordance_radius)
            .field("cached_images", &self.image_cache.len())
            .field("cached_svgs", &self.svg_cache.len())
            .finish()
    }
}

impl CpuRenderer {
    /// Renderer clearing to straight-alpha `clear_rgba` and drawing affordances of
    /// `affordance_radius`.
    pub fn new(clear_rgba: [u8; 4], affordance_radius: f64) -> Self {
        Self {
            clear_rgba,
            affordance_radius,
            image_cache: HashMap::new(),
            svg_cache: HashMap::new(),
        }
    }

    /// Flatten `scene` into a frame the size of its canvas.
    #[tracing::instrument(level = "debug", skip(self, scene, selection))]
    pub fn render(
        &mut self,
        scene: &Scene,
        selection: &SelectionManager,
        opts: RenderOptions,
    ) -> GearResult<FrameRGBA> {
        let canvas = scene
            .canvas()
            .ok_or_else(|| GearError::render("no background loaded; canvas has no size yet"))?;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| GearError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| GearError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let [r, g, b, a] = self.clear_rgba;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        if let Some(bg) = scene.background() {
            let key = PaintKey::Background(scene.background_generation());
            let paint = self.image_paint_for(key, bg)?;
            let stretch = Affine::scale_non_uniform(
                f64::from(canvas.width) / f64::from(bg.width),
                f64::from(canvas.height) / f64::from(bg.height),
            );
            draw_image(&mut ctx, paint, stretch, f64::from(bg.width), f64::from(bg.height));
        }

        for entry in scene.entries() {
            self.draw_overlay(&mut ctx, entry)?;
        }

        if opts.include_ui {
            if let Some(id) = selection.control().attached()
                && let Some(entry) = scene.get(id)
            {
                draw_transform_control(&mut ctx, selection.control(), entry);
            }
            for entry in scene.entries().iter().filter(|e| e.affordance.visible) {
                draw_affordance(&mut ctx, entry.affordance.position, self.affordance_radius);
            }
        }

        self.retain_live(scene);

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Drop cached paints of removed overlays and replaced backgrounds.
    fn retain_live(&mut self, scene: &Scene) {
        let generation = scene.background_generation();
        self.image_cache.retain(|key, _| match key {
            PaintKey::Background(g) => *g == generation,
            PaintKey::Overlay(id) => scene.contains(*id),
        });
        self.svg_cache.retain(|key, _| scene.contains(key.overlay));
    }

    fn draw_overlay(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        entry: &OverlayEntry,
    ) -> GearResult<()> {
        let overlay = &entry.overlay;
        let natural = overlay.graphic.natural_size();
        if natural.width <= 0.0 || natural.height <= 0.0 {
            return Ok(());
        }
        let size = overlay.geometry.size;
        let transform = overlay.geometry.to_affine()
            * Affine::scale_non_uniform(size.width / natural.width, size.height / natural.height);
        if transform.determinant().abs() < f64::EPSILON {
            return Ok(());
        }

        match &overlay.graphic {
            PreparedGraphic::Raster(img) => {
                let paint = self.image_paint_for(PaintKey::Overlay(overlay.id), img)?;
                draw_image(ctx, paint, transform, natural.width, natural.height);
            }
            PreparedGraphic::Svg(svg) => {
                let (paint, w, h, adjust) = self.svg_paint_for(overlay.id, svg, transform)?;
                draw_image(ctx, paint, adjust, w, h);
            }
        }
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        key: PaintKey,
        img: &PreparedImage,
    ) -> GearResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }
        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(key, paint.clone());
        Ok(paint)
    }

    fn svg_paint_for(
        &mut self,
        overlay: OverlayId,
        svg: &PreparedSvg,
        transform: Affine,
    ) -> GearResult<(vello_cpu::Image, f64, f64, Affine)> {
        let (w, h, adjust) = svg_raster_params(&svg.tree, transform)?;
        let key = SvgRasterKey {
            overlay,
            width: w,
            height: h,
        };
        if let Some(paint) = self.svg_cache.get(&key) {
            return Ok((paint.clone(), f64::from(w), f64::from(h), adjust));
        }

        let rgba8_premul = rasterize_svg_to_premul_rgba8(&svg.tree, w, h)?;
        let pixmap = image_premul_bytes_to_pixmap(&rgba8_premul, w, h)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.svg_cache.insert(key, paint.clone());
        Ok((paint, f64::from(w), f64::from(h), adjust))
    }
}

fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: vello_cpu::Image,
    transform: Affine,
    w: f64,
    h: f64,
) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
}

fn fill_canvas_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, rgba: [u8; 4]) {
    let [r, g, b, a] = rgba;
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Quad of constant screen width along `a -> b`.
fn line_quad(a: Point, b: Point, width: f64) -> BezPath {
    let d = b - a;
    let len = d.hypot();
    let n = if len > 0.0 {
        Vec2::new(-d.y, d.x) * (width / 2.0 / len)
    } else {
        Vec2::ZERO
    };
    let mut path = BezPath::new();
    path.move_to(a + n);
    path.line_to(b + n);
    path.line_to(b - n);
    path.line_to(a - n);
    path.close_path();
    path
}

fn square(center: Point, half: f64) -> BezPath {
    kurbo::Rect::new(
        center.x - half,
        center.y - half,
        center.x + half,
        center.y + half,
    )
    .to_path(0.1)
}

fn disc(center: Point, radius: f64) -> BezPath {
    kurbo::Circle::new(center, radius).to_path(0.1)
}

fn draw_transform_control(
    ctx: &mut vello_cpu::RenderContext,
    control: &TransformControl,
    entry: &OverlayEntry,
) {
    let geometry = &entry.overlay.geometry;
    let corners = geometry.corners();
    for i in 0..corners.len() {
        let edge = line_quad(corners[i], corners[(i + 1) % corners.len()], CONTROL_LINE_PX);
        fill_canvas_path(ctx, &edge, CONTROL_RGBA);
    }

    if control.rotate_enabled {
        let knob = control.rotate_handle_point(geometry);
        let top_mid = corners[0].midpoint(corners[1]);
        fill_canvas_path(ctx, &line_quad(top_mid, knob, CONTROL_LINE_PX), CONTROL_RGBA);
        fill_canvas_path(ctx, &disc(knob, ROTATE_KNOB_RADIUS_PX), CONTROL_RGBA);
        fill_canvas_path(
            ctx,
            &disc(knob, ROTATE_KNOB_RADIUS_PX - CONTROL_LINE_PX),
            WHITE_RGBA,
        );
    }

    for (_, p) in control.anchor_points(geometry) {
        fill_canvas_path(ctx, &square(p, ANCHOR_HALF_PX), CONTROL_RGBA);
        fill_canvas_path(ctx, &square(p, ANCHOR_HALF_PX - CONTROL_LINE_PX), WHITE_RGBA);
    }
}

fn draw_affordance(ctx: &mut vello_cpu::RenderContext, center: Point, radius: f64) {
    fill_canvas_path(ctx, &disc(center, radius), AFFORDANCE_RGBA);
    let arm = radius * 0.45;
    let cross_w = (radius * 0.22).max(1.0);
    fill_canvas_path(
        ctx,
        &line_quad(
            center + Vec2::new(-arm, -arm),
            center + Vec2::new(arm, arm),
            cross_w,
        ),
        WHITE_RGBA,
    );
    fill_canvas_path(
        ctx,
        &line_quad(
            center + Vec2::new(arm, -arm),
            center + Vec2::new(-arm, arm),
            cross_w,
        ),
        WHITE_RGBA,
    );
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> GearResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GearError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GearError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(GearError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
