use rand::Rng;

use crate::foundation::core::Vec2;
use crate::foundation::math::lerp;

/// Zoom reached by a zooming Ken-Burns pass.
pub(crate) const KEN_BURNS_ZOOM: f64 = 1.15;

/// Pan/zoom drawn once per item and interpolated over its visible window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KenBurnsParams {
    pub(crate) start_scale: f64,
    pub(crate) end_scale: f64,
    /// Horizontal pan direction in `[-1, 1]`.
    pub(crate) pan_x: f64,
    /// Vertical pan direction in `[-1, 1]`.
    pub(crate) pan_y: f64,
}

impl KenBurnsParams {
    /// No motion.
    pub(crate) fn still() -> Self {
        Self {
            start_scale: 1.0,
            end_scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    /// Zoom-in or zoom-out with a random pan direction.
    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (start_scale, end_scale) = if rng.gen_bool(0.5) {
            (1.0, KEN_BURNS_ZOOM)
        } else {
            (KEN_BURNS_ZOOM, 1.0)
        };
        Self {
            start_scale,
            end_scale,
            pan_x: rng.gen_range(-1.0..=1.0),
            pan_y: rng.gen_range(-1.0..=1.0),
        }
    }

    pub(crate) fn is_still(&self) -> bool {
        self.start_scale == self.end_scale && self.pan_x == 0.0 && self.pan_y == 0.0
    }

    pub(crate) fn scale_at(&self, t: f64) -> f64 {
        lerp(self.start_scale, self.end_scale, t.clamp(0.0, 1.0))
    }

    /// Pan offset in pixels at progress `t`.
    ///
    /// The pan stays inside the margin the zoom adds, so the image never reveals its edge.
    pub(crate) fn offset_at(&self, t: f64, width: f64, height: f64) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let margin = (self.scale_at(t) - 1.0).max(0.0);
        Vec2::new(
            self.pan_x * t * margin * width * 0.5,
            self.pan_y * t * margin * height * 0.5,
        )
    }
}

/// One parameter set per item; all still when Ken-Burns is off.
pub(crate) fn ken_burns_table<R: Rng + ?Sized>(
    count: usize,
    enabled: bool,
    rng: &mut R,
) -> Vec<KenBurnsParams> {
    (0..count)
        .map(|_| {
            if enabled {
                KenBurnsParams::random(rng)
            } else {
                KenBurnsParams::still()
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/ken_burns.rs"]
mod tests;
