use std::f64::consts::TAU;

use crate::animation::ease::Ease;
use crate::assets::color::mix;
use crate::assets::decode::DecodedImage;
use crate::assets::text::{TextBlock, TextEngine};
use crate::foundation::core::{Affine, Canvas, Point, Rect, Vec2};
use crate::foundation::error::AftermovieResult;
use crate::foundation::math::progress_between;
use crate::model::{MediaItem, RenderOptions};
use crate::render::draw::{
    affine_to_cpu, color, draw_image, fill_circle, fill_polygon, fill_rounded, fill_solid,
    vertical_gradient,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const GOLD: [u8; 4] = [255, 215, 0, 255];
const ORANGE: [u8; 4] = [255, 140, 0, 255];
const PARTICLES: usize = 24;

/// Share of the frame height covered by the legend band.
pub(crate) const LEGEND_BAND: f64 = 0.35;

/// Caption styling chosen for an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Caption<'a> {
    /// Cinematic band with a title and an optional author line.
    Legend {
        title: &'a str,
        author: Option<&'a str>,
    },
    /// Comic speech bubble.
    Bubble { text: &'a str },
}

impl<'a> Caption<'a> {
    /// Bubble when comic styling is on and the item has a caption, else the legend when enabled and
    /// there is a caption or a configured title.
    pub(crate) fn for_item(item: &'a MediaItem, opts: &'a RenderOptions) -> Option<Self> {
        if opts.comic_captions
            && let Some(text) = item.caption_text()
        {
            return Some(Self::Bubble { text });
        }
        if !opts.title_overlay {
            return None;
        }
        item.caption_text()
            .or_else(|| opts.title())
            .map(|title| Self::Legend {
                title,
                author: item.author_text(),
            })
    }
}

/// Captions fade in over the first tenth of the item.
pub(crate) fn caption_opacity(item_progress: f64) -> f32 {
    Ease::OutCubic.apply(progress_between(item_progress, 0.0, 0.1)) as f32
}

/// Text of an intro or outro card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TitleCard<'a> {
    pub(crate) title: &'a str,
    pub(crate) subtitle: Option<&'a str>,
}

/// Cached overlay artwork that only depends on the canvas.
pub(crate) struct OverlayArt {
    band: DecodedImage,
}

impl OverlayArt {
    pub(crate) fn new() -> AftermovieResult<Self> {
        Ok(Self {
            band: vertical_gradient(1, 64, [0, 0, 0, 0], [0, 0, 0, 217])?,
        })
    }
}

fn draw_block(
    ctx: &mut vello_cpu::RenderContext,
    engine: &TextEngine,
    block: &TextBlock,
    transform: Affine,
    rgba: [u8; 4],
) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(color(rgba));
    for line in block.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(engine.font())
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Glyph-by-glyph horizontal gradient between two colours.
fn draw_block_gradient(
    ctx: &mut vello_cpu::RenderContext,
    engine: &TextEngine,
    block: &TextBlock,
    transform: Affine,
    from: [u8; 4],
    to: [u8; 4],
) {
    let width = block.width().max(1.0) as f32;
    ctx.set_transform(affine_to_cpu(transform));
    for line in block.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let size = run.run().font_size();
            for g in run.positioned_glyphs() {
                ctx.set_paint(color(mix(from, to, g.x / width)));
                ctx.glyph_run(engine.font())
                    .font_size(size)
                    .fill_glyphs(std::iter::once(vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    }));
            }
        }
    }
}

/// Text with stacked drop shadows and an outline, readable over any image.
fn draw_outlined(
    ctx: &mut vello_cpu::RenderContext,
    engine: &TextEngine,
    block: &TextBlock,
    origin: Point,
    size_px: f32,
) {
    let d = f64::from(size_px * 0.04).max(1.0);
    for (offset, alpha) in [(Vec2::new(4.0 * d, 6.0 * d), 50), (Vec2::new(2.0 * d, 3.0 * d), 90)] {
        draw_block(
            ctx,
            engine,
            block,
            Affine::translate(origin.to_vec2() + offset),
            [0, 0, 0, alpha],
        );
    }
    for i in 0..8 {
        let angle = f64::from(i) * TAU / 8.0;
        let offset = Vec2::new(angle.cos() * d, angle.sin() * d);
        draw_block(
            ctx,
            engine,
            block,
            Affine::translate(origin.to_vec2() + offset),
            [0, 0, 0, 200],
        );
    }
    draw_block(ctx, engine, block, Affine::translate(origin.to_vec2()), WHITE);
}

/// Bottom gradient band with the caption title and author.
pub(crate) fn draw_legend(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextEngine,
    art: &OverlayArt,
    canvas: Canvas,
    title: &str,
    author: Option<&str>,
    opacity: f32,
) -> AftermovieResult<()> {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let band_top = h * (1.0 - LEGEND_BAND);
    let title_px = (h * 0.06) as f32;
    let (block, size) =
        engine.fit_single_line(title, title_px, title_px * 0.5, (w * 0.9) as f32)?;
    let author_block = match author {
        Some(a) => Some(engine.layout(a, (h * 0.035) as f32, Some((w * 0.9) as f32))?),
        None => None,
    };

    ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
    let band = &art.band;
    let band_xf = Affine::translate((0.0, band_top))
        * Affine::scale_non_uniform(
            w / f64::from(band.width),
            (h - band_top) / f64::from(band.height),
        );
    draw_image(ctx, band, band_xf, 1.0, None);

    let margin = w * 0.05;
    let author_h = author_block.as_ref().map_or(0.0, |b| b.height() + h * 0.01);
    let title_top = h * 0.93 - author_h - block.height();
    draw_outlined(ctx, engine, &block, Point::new(margin, title_top), size);
    if let Some(author_block) = &author_block {
        draw_block_gradient(
            ctx,
            engine,
            author_block,
            Affine::translate((margin, title_top + block.height() + h * 0.01)),
            GOLD,
            ORANGE,
        );
    }
    ctx.pop_layer();
    Ok(())
}

/// Rounded comic panel near the bottom with the caption shrunk to fit.
pub(crate) fn draw_bubble(
    ctx: &mut vello_cpu::RenderContext,
    engine: &mut TextEngine,
    canvas: Canvas,
    text: &str,
    opacity: f32,
) -> AftermovieResult<()> {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let panel = Rect::from_center_size((w * 0.5, h * 0.82), (w * 0.7, h * 0.16));
    let inset = (h * 0.008).max(2.0);
    let radius = panel.height() * 0.25;
    let pad = panel.width() * 0.05;
    let max_px = (panel.height() * 0.4) as f32;
    let max_width = (panel.width() - 2.0 * pad) as f32;
    let (block, _) = engine.fit_single_line(text, max_px, max_px * 0.45, max_width)?;

    ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
    let tail_x = panel.x0 + panel.width() * 0.18;
    fill_polygon(
        ctx,
        &[
            Point::new(tail_x, panel.y1 - 1.0),
            Point::new(tail_x + w * 0.045, panel.y1 - 1.0),
            Point::new(tail_x + w * 0.01, panel.y1 + h * 0.05),
        ],
        [20, 20, 20, 217],
    );
    fill_rounded(ctx, panel, radius, [20, 20, 20, 217]);
    let border = panel.inflate(-inset, -inset);
    fill_rounded(ctx, border, radius - inset, [60, 45, 30, 255]);
    let inner = border.inflate(-inset * 0.6, -inset * 0.6);
    fill_rounded(ctx, inner, radius - inset * 1.6, [255, 248, 220, 242]);

    let origin = panel.center() - Vec2::new(block.width() * 0.5, block.height() * 0.5);
    draw_block(
        ctx,
        engine,
        &block,
        Affine::translate(origin.to_vec2()),
        [30, 30, 30, 255],
    );
    ctx.pop_layer();
    Ok(())
}

/// Animated intro/outro card at `progress` in `[0, 1]`.
pub(crate) fn draw_title_card(
    ctx: &mut vello_cpu::RenderContext,
    engine: Option<&mut TextEngine>,
    canvas: Canvas,
    card: &TitleCard<'_>,
    progress: f64,
) -> AftermovieResult<()> {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let p = progress.clamp(0.0, 1.0) as f32;

    let top = mix([26, 26, 46, 255], [22, 33, 62, 255], p);
    let bottom = mix([15, 52, 96, 255], [83, 52, 131, 255], p);
    let gradient = vertical_gradient(2, 32, top, bottom)?;
    fill_solid(ctx, canvas.rect(), top);
    draw_image(
        ctx,
        &gradient,
        Affine::scale_non_uniform(w / 2.0, h / 32.0),
        1.0,
        None,
    );

    let center = canvas.center();
    let reach = w.min(h);
    for i in 0..PARTICLES {
        let fi = i as f64;
        let speed = 0.25 * (1.0 + (i % 3) as f64);
        let angle = fi / PARTICLES as f64 * TAU + progress * TAU * speed;
        let orbit = reach * (0.2 + 0.25 * ((i * 37) % PARTICLES) as f64 / PARTICLES as f64);
        let pos = center + Vec2::new(angle.cos() * orbit * (w / reach), angle.sin() * orbit);
        let radius = reach * (0.004 + 0.004 * ((i * 7) % 3) as f64);
        fill_circle(ctx, pos, radius, [255, 255, 255, 40]);
    }

    let fade_out = 1.0 - progress_between(progress, 0.85, 1.0);
    let lines = Ease::OutCubic.apply(progress_between(progress, 0.1, 0.5)) * w * 0.18;
    let line_h = (h * 0.004).max(2.0);
    let accent = [255, 215, 0, (200.0 * fade_out) as u8];
    fill_solid(ctx, Rect::new(0.0, h * 0.3, lines, h * 0.3 + line_h), accent);
    fill_solid(ctx, Rect::new(w - lines, h * 0.7 - line_h, w, h * 0.7), accent);

    let Some(engine) = engine else {
        return Ok(());
    };

    let entrance = progress_between(progress, 0.0, 0.35);
    let title_opacity = Ease::OutCubic.apply(progress_between(progress, 0.0, 0.25)) * fade_out;
    let scale = 0.8 + 0.2 * Ease::OutBack.apply(entrance);
    let slide = (1.0 - Ease::OutCubic.apply(entrance)) * h * 0.05;
    let title_px = (h * 0.09) as f32;
    let (title, _) =
        engine.fit_single_line(card.title, title_px, title_px * 0.4, (w * 0.85) as f32)?;
    let title_center = Point::new(center.x, h * 0.45 + slide);
    if title_opacity > 0.0 {
        ctx.push_opacity_layer(title_opacity as f32);
        let xf = Affine::translate(title_center.to_vec2())
            * Affine::scale(scale)
            * Affine::translate((-title.width() * 0.5, -title.height() * 0.5));
        draw_block(ctx, engine, &title, xf, WHITE);
        ctx.pop_layer();
    }

    if let Some(subtitle) = card.subtitle {
        let sub_in = progress_between(progress, 0.2, 0.5);
        let sub_opacity = Ease::OutCubic.apply(sub_in) * fade_out;
        if sub_opacity > 0.0 {
            let block = engine.layout(subtitle, (h * 0.04) as f32, Some((w * 0.8) as f32))?;
            let rise = (1.0 - Ease::OutCubic.apply(sub_in)) * h * 0.03;
            let y = title_center.y + title.height() * 0.6 + rise;
            ctx.push_opacity_layer(sub_opacity as f32);
            draw_block(
                ctx,
                engine,
                &block,
                Affine::translate((center.x - block.width() * 0.5, y)),
                [230, 230, 240, 255],
            );
            ctx.pop_layer();
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
