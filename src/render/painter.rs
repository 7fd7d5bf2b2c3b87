use std::borrow::Cow;
use std::collections::HashMap;

use crate::assets::decode::DecodedImage;
use crate::assets::text::TextEngine;
use crate::effects::blur::{blur_rgba8_premul, sigma_for_radius};
use crate::effects::composite::over_in_place;
use crate::effects::ken_burns::KenBurnsParams;
use crate::effects::raster::{darken_in_place, downsample_box, pixelate_rgba8_premul};
use crate::effects::transitions::LayerPose;
use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::render::draw::{draw_image, fill_rounded, fill_solid, image_rect};
use crate::render::frame::FrameRGBA;
use crate::render::overlay::{self, Caption, OverlayArt, TitleCard};

/// Extra zoom of the blurred backdrop so pans never reveal its edge.
const BACKDROP_MARGIN: f64 = 1.2;
const BACKDROP_DOWNSCALE: u32 = 4;
const BACKDROP_DARKEN: f32 = 0.55;
/// Share of the canvas the sharp foreground may occupy.
const FOREGROUND_FILL: f64 = 0.9;
const FOREGROUND_ZOOM: f64 = 0.05;
/// Transition blurs above this radius run on a reduced copy of the layer.
const LOW_RES_BLUR_MIN_RADIUS: f32 = 4.0;
const LOW_RES_BLUR_FACTOR: u32 = 4;

/// Transform placing a `src_w x src_h` image so it covers `w x h`, zoomed and panned by Ken-Burns.
pub(crate) fn backdrop_transform(
    src_w: f64,
    src_h: f64,
    w: f64,
    h: f64,
    kb: &KenBurnsParams,
    t: f64,
) -> Affine {
    let cover = (w / src_w).max(h / src_h) * BACKDROP_MARGIN * kb.scale_at(t);
    let offset = kb.offset_at(t, w, h);
    Affine::translate(Vec2::new(w * 0.5, h * 0.5) + offset)
        * Affine::scale(cover)
        * Affine::translate((-src_w * 0.5, -src_h * 0.5))
}

/// Transform placing a `src_w x src_h` image fully visible and centered in `w x h`.
pub(crate) fn foreground_transform(
    src_w: f64,
    src_h: f64,
    w: f64,
    h: f64,
    kb: &KenBurnsParams,
    t: f64,
) -> Affine {
    let zoom = if kb.is_still() {
        1.0
    } else {
        1.0 + FOREGROUND_ZOOM * t.clamp(0.0, 1.0)
    };
    let contain = (w / src_w).min(h / src_h) * FOREGROUND_FILL * zoom;
    Affine::translate((w * 0.5, h * 0.5))
        * Affine::scale(contain)
        * Affine::translate((-src_w * 0.5, -src_h * 0.5))
}

/// A layer after its pose filters ran, with the scale back to canvas size.
struct PreparedLayer<'a> {
    image: Cow<'a, DecodedImage>,
    to_canvas: Affine,
}

/// CPU raster painter for every frame of a render.
pub(crate) struct Painter {
    canvas: Canvas,
    size: (u16, u16),
    background: [u8; 4],
    contexts: HashMap<(u16, u16), vello_cpu::RenderContext>,
    text: Option<TextEngine>,
    art: OverlayArt,
    frame_overlay: Option<DecodedImage>,
}

impl Painter {
    /// Painter for `canvas`, filling uncovered pixels with the straight-alpha `background`.
    pub(crate) fn new(
        canvas: Canvas,
        background: [u8; 4],
        text: Option<TextEngine>,
    ) -> AftermovieResult<Self> {
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| AftermovieError::invalid_input("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| AftermovieError::invalid_input("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(AftermovieError::invalid_input("canvas must not be empty"));
        }
        Ok(Self {
            canvas,
            size: (w, h),
            background,
            contexts: HashMap::new(),
            text,
            art: OverlayArt::new()?,
            frame_overlay: None,
        })
    }

    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Install the decorative frame, stretched to the canvas.
    pub(crate) fn set_frame_overlay(&mut self, overlay: DecodedImage) -> AftermovieResult<()> {
        let fits = overlay.width == self.canvas.width && overlay.height == self.canvas.height;
        let stretched = if fits {
            overlay
        } else {
            let xf = Affine::scale_non_uniform(
                f64::from(self.canvas.width) / f64::from(overlay.width),
                f64::from(self.canvas.height) / f64::from(overlay.height),
            );
            let (w, h) = self.size;
            DecodedImage::from_pixmap(self.rasterize(w, h, |_, ctx| {
                draw_image(ctx, &overlay, xf, 1.0, None);
                Ok(())
            })?)
        };
        self.frame_overlay = Some(stretched);
        Ok(())
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> AftermovieResult<R>,
    ) -> AftermovieResult<R> {
        let mut ctx = self
            .contexts
            .remove(&(width, height))
            .unwrap_or_else(|| vello_cpu::RenderContext::new(width, height));
        ctx.reset();
        let out = f(self, &mut ctx);
        self.contexts.insert((width, height), ctx);
        out
    }

    fn rasterize(
        &mut self,
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> AftermovieResult<()>,
    ) -> AftermovieResult<vello_cpu::Pixmap> {
        self.with_ctx_mut(width, height, |this, ctx| {
            draw(this, ctx)?;
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap)
        })
    }

    /// Two-layer composite of one item: blurred, darkened cover backdrop under the sharp,
    /// shadowed, contained foreground.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn item_layer(
        &mut self,
        source: &DecodedImage,
        kb: &KenBurnsParams,
        t: f64,
    ) -> AftermovieResult<DecodedImage> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let sw = f64::from(source.width);
        let sh = f64::from(source.height);

        let backdrop = self.backdrop(source, kb, t)?;
        let backdrop_xf = Affine::scale_non_uniform(
            w / f64::from(backdrop.width),
            h / f64::from(backdrop.height),
        );
        let fg = foreground_transform(sw, sh, w, h, kb, t);
        let fg_rect = fg.transform_rect_bbox(image_rect(source));
        let bg = self.background;
        let (cw, ch) = self.size;

        let pixmap = self.rasterize(cw, ch, |_, ctx| {
            fill_solid(ctx, Rect::new(0.0, 0.0, w, h), bg);
            draw_image(ctx, &backdrop, backdrop_xf, 1.0, None);
            draw_shadow(ctx, fg_rect);
            draw_image(ctx, source, fg, 1.0, None);
            Ok(())
        })?;
        Ok(DecodedImage::from_pixmap(pixmap))
    }

    fn backdrop(
        &mut self,
        source: &DecodedImage,
        kb: &KenBurnsParams,
        t: f64,
    ) -> AftermovieResult<DecodedImage> {
        let bw = (self.canvas.width / BACKDROP_DOWNSCALE).max(1);
        let bh = (self.canvas.height / BACKDROP_DOWNSCALE).max(1);
        let xf = backdrop_transform(
            f64::from(source.width),
            f64::from(source.height),
            f64::from(bw),
            f64::from(bh),
            kb,
            t,
        );
        let pixmap = self.rasterize(bw as u16, bh as u16, |_, ctx| {
            draw_image(ctx, source, xf, 1.0, None);
            Ok(())
        })?;
        let radius = (bw / 48).max(2);
        let mut blurred = blur_rgba8_premul(
            pixmap.data_as_u8_slice(),
            bw,
            bh,
            radius,
            sigma_for_radius(radius),
        )?;
        darken_in_place(&mut blurred, BACKDROP_DARKEN);
        DecodedImage::from_premul_rgba8(bw, bh, &blurred)
    }

    fn prepare_layer<'a>(
        &self,
        image: &'a DecodedImage,
        pose: &LayerPose,
    ) -> AftermovieResult<PreparedLayer<'a>> {
        let mut out: Cow<'a, DecodedImage> = Cow::Borrowed(image);
        let mut to_canvas = Affine::IDENTITY;

        if pose.pixel_block > 1 {
            let data = pixelate_rgba8_premul(out.data(), out.width, out.height, pose.pixel_block)?;
            out = Cow::Owned(DecodedImage::from_premul_rgba8(out.width, out.height, &data)?);
        }
        if pose.blur_radius >= 0.5 {
            let factor = if pose.blur_radius >= LOW_RES_BLUR_MIN_RADIUS {
                LOW_RES_BLUR_FACTOR
            } else {
                1
            };
            let (small, sw, sh) = downsample_box(out.data(), out.width, out.height, factor)?;
            let radius = ((pose.blur_radius / factor as f32).round() as u32).max(1);
            let blurred = blur_rgba8_premul(&small, sw, sh, radius, sigma_for_radius(radius))?;
            to_canvas = Affine::scale_non_uniform(
                f64::from(out.width) / f64::from(sw),
                f64::from(out.height) / f64::from(sh),
            );
            out = Cow::Owned(DecodedImage::from_premul_rgba8(sw, sh, &blurred)?);
        }
        Ok(PreparedLayer {
            image: out,
            to_canvas,
        })
    }

    /// Compose full-canvas layers by pose, then the caption, then the decorative frame.
    #[tracing::instrument(level = "trace", skip_all, fields(layers = layers.len()))]
    pub(crate) fn compose(
        &mut self,
        layers: &[(&DecodedImage, LayerPose)],
        caption: Option<(Caption<'_>, f32)>,
    ) -> AftermovieResult<FrameRGBA> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let mut prepared = Vec::with_capacity(layers.len());
        for (image, pose) in layers {
            if pose.is_invisible(w, h) {
                continue;
            }
            prepared.push((self.prepare_layer(image, pose)?, *pose));
        }

        let bg = self.background;
        let canvas = self.canvas;
        let (cw, ch) = self.size;
        let pixmap = self.rasterize(cw, ch, |this, ctx| {
            fill_solid(ctx, canvas.rect(), bg);
            for (layer, pose) in &prepared {
                let xf = pose.transform * layer.to_canvas;
                let full = image_rect(&layer.image);
                let region = match pose.clip {
                    Some(clip) => xf.inverse().transform_rect_bbox(clip).intersect(full),
                    None => full,
                };
                if region.area() <= 0.0 {
                    continue;
                }
                draw_image(ctx, &layer.image, xf, pose.opacity, Some(region));
            }
            if let Some((caption, opacity)) = caption
                && opacity > 0.0
                && let Some(text) = this.text.as_mut()
            {
                match caption {
                    Caption::Legend { title, author } => {
                        overlay::draw_legend(ctx, text, &this.art, canvas, title, author, opacity)?
                    }
                    Caption::Bubble { text: body } => {
                        overlay::draw_bubble(ctx, text, canvas, body, opacity)?
                    }
                }
            }
            Ok(())
        })?;
        self.finish(pixmap)
    }

    /// Intro or outro card at `progress` in `[0, 1]`.
    pub(crate) fn title_card(
        &mut self,
        card: &TitleCard<'_>,
        progress: f64,
    ) -> AftermovieResult<FrameRGBA> {
        let canvas = self.canvas;
        let (cw, ch) = self.size;
        let pixmap = self.rasterize(cw, ch, |this, ctx| {
            overlay::draw_title_card(ctx, this.text.as_mut(), canvas, card, progress)
        })?;
        self.finish(pixmap)
    }

    fn finish(&self, pixmap: vello_cpu::Pixmap) -> AftermovieResult<FrameRGBA> {
        let mut data = pixmap.data_as_u8_slice().to_vec();
        if let Some(frame) = &self.frame_overlay {
            over_in_place(&mut data, frame.data(), 1.0)?;
        }
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        })
    }
}

/// Soft drop shadow under the foreground photo.
fn draw_shadow(ctx: &mut vello_cpu::RenderContext, rect: Rect) {
    let spread = (rect.width().min(rect.height()) * 0.02).max(2.0);
    for i in 1..=4 {
        let grow = spread * f64::from(i) * 0.5;
        let r = rect.inflate(grow, grow) + Vec2::new(0.0, spread);
        fill_rounded(ctx, r, grow + 4.0, [0, 0, 0, 28]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
