use crate::effects::raster::check_len;
use crate::foundation::error::{AftermovieError, AftermovieResult};

const Q16_ONE: i64 = 1 << 16;

/// Sigma used for a given kernel radius.
pub(crate) fn sigma_for_radius(radius: u32) -> f32 {
    (radius as f32 / 2.0).max(0.5)
}

/// Separable Gaussian blur of a premultiplied RGBA8 buffer with edge clamping.
///
/// Weights are Q16 fixed point summing to exactly one, so flat regions stay flat.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> AftermovieResult<Vec<u8>> {
    check_len(src, width, height, "blur_rgba8_premul")?;
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let (w, h) = (width as usize, height as usize);
    let mut rows = vec![0u8; src.len()];
    let mut out = vec![0u8; src.len()];

    // Rows: `w` samples per line, step 1 pixel. Columns: `h` samples per line, step `w` pixels.
    for y in 0..h {
        convolve_line(src, &mut rows, y * w, 1, w, &kernel);
    }
    for x in 0..w {
        convolve_line(&rows, &mut out, x, w, h, &kernel);
    }
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AftermovieResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AftermovieError::invalid_input("blur sigma must be > 0"));
    }

    let r = radius as i64;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / denom).exp())
        .collect();
    let sum: f64 = raw.iter().sum();
    if sum <= 0.0 {
        return Err(AftermovieError::invalid_input("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<i64> = raw
        .iter()
        .map(|w| ((w / sum) * Q16_ONE as f64).round() as i64)
        .collect();
    // Rounding residue goes to the centre tap.
    let residue = Q16_ONE - weights.iter().sum::<i64>();
    weights[radius as usize] = (weights[radius as usize] + residue).clamp(0, Q16_ONE);

    Ok(weights.into_iter().map(|w| w.clamp(0, Q16_ONE) as u32).collect())
}

/// Convolve one line of `len` pixels starting at pixel `start`, `stride` pixels apart.
fn convolve_line(src: &[u8], dst: &mut [u8], start: usize, stride: usize, len: usize, k: &[u32]) {
    let radius = (k.len() / 2) as isize;
    let last = len as isize - 1;
    for i in 0..len as isize {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let s = (i + ki as isize - radius).clamp(0, last) as usize;
            let at = (start + s * stride) * 4;
            for (c, a) in acc.iter_mut().enumerate() {
                *a += u64::from(kw) * u64::from(src[at + c]);
            }
        }
        let at = (start + i as usize * stride) * 4;
        for (c, a) in acc.into_iter().enumerate() {
            dst[at + c] = ((a + 0x8000) >> 16).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
