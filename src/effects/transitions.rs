use std::f64::consts::PI;

use crate::animation::ease::Ease;
use crate::foundation::core::{Affine, Point, Rect, Vec2};

/// Named transition between two adjacent items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    /// Next item blends in over the current one.
    Fade,
    /// Both items fade, current out and next in.
    CrossFade,
    /// Both items move left; next enters from the right edge.
    SlideLeft,
    /// Both items move right; next enters from the left edge.
    SlideRight,
    /// Both items move up; next enters from the bottom edge.
    SlideUp,
    /// Both items move down; next enters from the top edge.
    SlideDown,
    /// Current grows and fades out; next grows from 70% and fades in.
    ZoomIn,
    /// Current shrinks and fades out; next shrinks from 150% and fades in.
    ZoomOut,
    /// Hard edge revealing next from the right towards the left.
    WipeLeft,
    /// Hard edge revealing next from the left towards the right.
    WipeRight,
    /// Half-turn flip with a scale pulse.
    Rotate,
    /// Blur peaking mid-transition, with a fade.
    Blur,
    /// Mosaic blocks, with a fade.
    Pixelate,
}

impl TransitionKind {
    /// Every kind, in declaration order.
    pub const ALL: [TransitionKind; 13] = [
        Self::Fade,
        Self::CrossFade,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideUp,
        Self::SlideDown,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::WipeLeft,
        Self::WipeRight,
        Self::Rotate,
        Self::Blur,
        Self::Pixelate,
    ];

    /// Kebab-case name, as used in options files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::CrossFade => "cross-fade",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::SlideUp => "slide-up",
            Self::SlideDown => "slide-down",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::WipeLeft => "wipe-left",
            Self::WipeRight => "wipe-right",
            Self::Rotate => "rotate",
            Self::Blur => "blur",
            Self::Pixelate => "pixelate",
        }
    }

    /// Parse a kind by name (case-insensitive, `_` accepted for `-`).
    pub fn from_name(name: &str) -> Option<Self> {
        let norm = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|k| k.name() == norm)
    }

    /// Layer poses at linear progress `t` for a `width x height` canvas.
    ///
    /// Progress is remapped with in-out cubic easing first. The current layer is drawn first,
    /// the next layer on top of it.
    pub fn frame(self, t: f64, width: f64, height: f64) -> TransitionFrame {
        let t = Ease::InOutCubic.apply(t);
        let center = Point::new(width * 0.5, height * 0.5);
        let fading = TransitionFrame {
            current: LayerPose::with_opacity(1.0 - t),
            next: LayerPose::with_opacity(t),
        };

        match self {
            Self::Fade => TransitionFrame {
                current: LayerPose::identity(),
                next: LayerPose::with_opacity(t),
            },
            Self::CrossFade => fading,
            Self::SlideLeft => slide(Vec2::new(-width, 0.0), t),
            Self::SlideRight => slide(Vec2::new(width, 0.0), t),
            Self::SlideUp => slide(Vec2::new(0.0, -height), t),
            Self::SlideDown => slide(Vec2::new(0.0, height), t),
            Self::ZoomIn => TransitionFrame {
                current: LayerPose {
                    transform: Affine::scale_about(1.0 + 0.5 * t, center),
                    ..fading.current
                },
                next: LayerPose {
                    transform: Affine::scale_about(1.0 - 0.3 * (1.0 - t), center),
                    ..fading.next
                },
            },
            Self::ZoomOut => TransitionFrame {
                current: LayerPose {
                    transform: Affine::scale_about(1.0 - 0.3 * t, center),
                    ..fading.current
                },
                next: LayerPose {
                    transform: Affine::scale_about(1.0 + 0.5 * (1.0 - t), center),
                    ..fading.next
                },
            },
            Self::WipeLeft => TransitionFrame {
                current: LayerPose::identity(),
                next: LayerPose {
                    clip: (t < 1.0).then(|| Rect::new(width * (1.0 - t), 0.0, width, height)),
                    ..LayerPose::identity()
                },
            },
            Self::WipeRight => TransitionFrame {
                current: LayerPose::identity(),
                next: LayerPose {
                    clip: (t < 1.0).then(|| Rect::new(0.0, 0.0, width * t, height)),
                    ..LayerPose::identity()
                },
            },
            Self::Rotate => {
                let pulse = 1.0 - 0.3 * (t * PI).sin();
                let turn = |angle: f64| {
                    Affine::scale_about(pulse, center) * Affine::rotate_about(angle, center)
                };
                TransitionFrame {
                    current: LayerPose {
                        transform: turn(t * PI),
                        ..fading.current
                    },
                    next: LayerPose {
                        transform: turn((t - 1.0) * PI),
                        ..fading.next
                    },
                }
            }
            Self::Blur => {
                let radius = snap_radius((t * PI).sin() * max_blur_radius(width));
                TransitionFrame {
                    current: LayerPose {
                        blur_radius: radius,
                        ..fading.current
                    },
                    next: LayerPose {
                        blur_radius: radius,
                        ..fading.next
                    },
                }
            }
            Self::Pixelate => {
                let max_block = f64::from(max_pixel_block(width));
                let block = |b: f64| (b.round() as u32).max(1);
                TransitionFrame {
                    current: LayerPose {
                        pixel_block: block(1.0 + (max_block - 1.0) * t),
                        ..fading.current
                    },
                    next: LayerPose {
                        pixel_block: block(max_block - (max_block - 1.0) * t),
                        ..fading.next
                    },
                }
            }
        }
    }
}

fn slide(direction: Vec2, t: f64) -> TransitionFrame {
    TransitionFrame {
        current: LayerPose {
            transform: Affine::translate(direction * t),
            ..LayerPose::identity()
        },
        next: LayerPose {
            transform: Affine::translate(-direction * (1.0 - t)),
            ..LayerPose::identity()
        },
    }
}

/// Peak blur radius of the blur transition, about 2% of the width.
pub(crate) fn max_blur_radius(width: f64) -> f64 {
    (width * 0.02).max(4.0)
}

/// Largest mosaic block of the pixelate transition.
pub(crate) fn max_pixel_block(width: f64) -> u32 {
    ((width / 32.0).round() as u32).max(2)
}

fn snap_radius(r: f64) -> f32 {
    if r < 0.5 { 0.0 } else { r as f32 }
}

/// How one layer is placed and filtered within a transition frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPose {
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Canvas-space transform of the full-canvas layer.
    pub transform: Affine,
    /// Gaussian blur radius in pixels (`0` = sharp).
    pub blur_radius: f32,
    /// Mosaic block size in pixels (`1` = untouched).
    pub pixel_block: u32,
    /// Hard clip in canvas coordinates.
    pub clip: Option<Rect>,
}

impl LayerPose {
    /// Untouched, fully opaque layer.
    pub fn identity() -> Self {
        Self {
            opacity: 1.0,
            transform: Affine::IDENTITY,
            blur_radius: 0.0,
            pixel_block: 1,
            clip: None,
        }
    }

    fn with_opacity(opacity: f64) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            ..Self::identity()
        }
    }

    /// Whether drawing this pose leaves a `width x height` canvas unchanged.
    pub fn is_invisible(&self, width: f64, height: f64) -> bool {
        if self.opacity <= 0.0 {
            return true;
        }
        let canvas = Rect::new(0.0, 0.0, width, height);
        let mut covered = self.transform.transform_rect_bbox(canvas).intersect(canvas);
        if let Some(clip) = self.clip {
            covered = covered.intersect(clip);
        }
        covered.area() <= 1e-9
    }

    /// Whether this pose draws the layer exactly as it is.
    pub fn is_identity(&self) -> bool {
        let coeffs = self.transform.as_coeffs();
        let id = Affine::IDENTITY.as_coeffs();
        let same_transform = coeffs.iter().zip(id).all(|(a, b)| (a - b).abs() < 1e-9);
        self.opacity >= 1.0
            && same_transform
            && self.blur_radius <= 0.0
            && self.pixel_block <= 1
            && self.clip.is_none()
    }
}

/// Poses of the outgoing and incoming layers for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionFrame {
    /// Outgoing item, drawn first.
    pub current: LayerPose,
    /// Incoming item, drawn on top.
    pub next: LayerPose,
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
