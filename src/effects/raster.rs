use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::foundation::math::mul_div255_u8;

pub(crate) fn check_len(buf: &[u8], width: u32, height: u32, what: &str) -> AftermovieResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| AftermovieError::invalid_input(format!("{what}: buffer size overflow")))?;
    if buf.len() != expected || width == 0 || height == 0 {
        return Err(AftermovieError::invalid_input(format!(
            "{what}: expected a non-empty {width}x{height} rgba8 buffer"
        )));
    }
    Ok(())
}

/// Average non-overlapping `block x block` cells. Edge cells average what they cover.
///
/// Returns the reduced buffer and its dimensions.
pub(crate) fn downsample_box(
    src: &[u8],
    width: u32,
    height: u32,
    block: u32,
) -> AftermovieResult<(Vec<u8>, u32, u32)> {
    check_len(src, width, height, "downsample_box")?;
    let block = block.max(1);
    let out_w = width.div_ceil(block);
    let out_h = height.div_ceil(block);
    let mut out = vec![0u8; (out_w as usize) * (out_h as usize) * 4];

    for oy in 0..out_h {
        for ox in 0..out_w {
            let x0 = ox * block;
            let y0 = oy * block;
            let x1 = (x0 + block).min(width);
            let y1 = (y0 + block).min(height);
            let mut acc = [0u32; 4];
            for y in y0..y1 {
                for x in x0..x1 {
                    let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
                    for c in 0..4 {
                        acc[c] += u32::from(src[idx + c]);
                    }
                }
            }
            let n = (x1 - x0) * (y1 - y0);
            let o = ((oy as usize) * (out_w as usize) + (ox as usize)) * 4;
            for c in 0..4 {
                out[o + c] = ((acc[c] + n / 2) / n) as u8;
            }
        }
    }
    Ok((out, out_w, out_h))
}

/// Nearest-neighbour upscale of a `block`-reduced buffer back to `width x height`.
pub(crate) fn upscale_nearest(
    small: &[u8],
    small_w: u32,
    small_h: u32,
    block: u32,
    width: u32,
    height: u32,
) -> AftermovieResult<Vec<u8>> {
    check_len(small, small_w, small_h, "upscale_nearest")?;
    let block = block.max(1);
    let mut out = vec![0u8; (width as usize) * (height as usize) * 4];
    for y in 0..height {
        let sy = (y / block).min(small_h - 1);
        for x in 0..width {
            let sx = (x / block).min(small_w - 1);
            let s = ((sy as usize) * (small_w as usize) + (sx as usize)) * 4;
            let d = ((y as usize) * (width as usize) + (x as usize)) * 4;
            out[d..d + 4].copy_from_slice(&small[s..s + 4]);
        }
    }
    Ok(out)
}

/// Blocky mosaic: every `block x block` cell takes its average color.
pub(crate) fn pixelate_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    block: u32,
) -> AftermovieResult<Vec<u8>> {
    if block <= 1 {
        check_len(src, width, height, "pixelate")?;
        return Ok(src.to_vec());
    }
    let (small, sw, sh) = downsample_box(src, width, height, block)?;
    upscale_nearest(&small, sw, sh, block, width, height)
}

/// Scale the color channels of a premultiplied buffer by `factor` in `[0, 1]`.
///
/// Alpha is kept, so the result is a darker version of the same coverage.
pub(crate) fn darken_in_place(buf: &mut [u8], factor: f32) {
    let f = ((factor.clamp(0.0, 1.0) * 255.0).round()) as u16;
    if f == 255 {
        return;
    }
    for px in buf.chunks_exact_mut(4) {
        px[0] = mul_div255_u8(u16::from(px[0]), f);
        px[1] = mul_div255_u8(u16::from(px[1]), f);
        px[2] = mul_div255_u8(u16::from(px[2]), f);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/raster.rs"]
mod tests;
