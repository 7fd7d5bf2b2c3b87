use vello_cpu::kurbo::Shape as _;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, Point, Rect};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn color(rgba: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

pub(crate) fn image_rect(image: &DecodedImage) -> Rect {
    Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height))
}

/// Fill a canvas-space rectangle with a straight-alpha colour.
pub(crate) fn fill_solid(ctx: &mut vello_cpu::RenderContext, rect: Rect, rgba: [u8; 4]) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(rgba));
    ctx.fill_rect(&rect_to_cpu(rect));
}

pub(crate) fn fill_rounded(
    ctx: &mut vello_cpu::RenderContext,
    rect: Rect,
    radius: f64,
    rgba: [u8; 4],
) {
    let rr = vello_cpu::kurbo::RoundedRect::from_rect(rect_to_cpu(rect), radius);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(rgba));
    ctx.fill_path(&rr.to_path(0.1));
}

pub(crate) fn fill_circle(
    ctx: &mut vello_cpu::RenderContext,
    center: Point,
    radius: f64,
    rgba: [u8; 4],
) {
    let circle = vello_cpu::kurbo::Circle::new((center.x, center.y), radius);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(rgba));
    ctx.fill_path(&circle.to_path(0.1));
}

pub(crate) fn fill_polygon(ctx: &mut vello_cpu::RenderContext, points: &[Point], rgba: [u8; 4]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut path = vello_cpu::kurbo::BezPath::new();
    path.move_to((first.x, first.y));
    for p in rest {
        path.line_to((p.x, p.y));
    }
    path.close_path();
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(rgba));
    ctx.fill_path(&path);
}

/// Draw `region` (image space, whole image when `None`) of `image` placed by `transform`.
pub(crate) fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    image: &DecodedImage,
    transform: Affine,
    opacity: f32,
    region: Option<Rect>,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(image.paint());
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&rect_to_cpu(region.unwrap_or_else(|| image_rect(image))));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

/// Vertical gradient between two premultiplied colours, `height` rows tall.
pub(crate) fn vertical_gradient(
    width: u32,
    height: u32,
    top: [u8; 4],
    bottom: [u8; 4],
) -> crate::foundation::error::AftermovieResult<DecodedImage> {
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let h1 = (height.max(1) - 1) as f32;
    for y in 0..height {
        let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
        let c = crate::assets::color::mix(top, bottom, t);
        for x in 0..width {
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&c);
        }
    }
    DecodedImage::from_premul_rgba8(width, height, &bytes)
}
