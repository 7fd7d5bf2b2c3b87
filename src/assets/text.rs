use std::path::Path;

use crate::foundation::error::{AftermovieError, AftermovieResult};

/// Fonts tried, in order, when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Shaped text ready to be drawn.
pub(crate) struct TextBlock {
    pub(crate) layout: parley::Layout<()>,
}

impl TextBlock {
    pub(crate) fn width(&self) -> f64 {
        f64::from(self.layout.width())
    }

    pub(crate) fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

/// Parley layout state bound to a single font face.
pub(crate) struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl TextEngine {
    /// Load the configured font, or the first system font found.
    ///
    /// Returns `None` (after logging) when no usable font exists; callers skip text then.
    pub(crate) fn discover(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            match Self::from_path(path) {
                Ok(engine) => return Some(engine),
                Err(e) => {
                    tracing::warn!(font = %path.display(), error = %e, "configured font unusable");
                }
            }
        }
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if !path.is_file() {
                continue;
            }
            if let Ok(engine) = Self::from_path(path) {
                tracing::debug!(font = %path.display(), "using system font");
                return Some(engine);
            }
        }
        tracing::warn!("no font available, text overlays are disabled (set font_path)");
        None
    }

    pub(crate) fn from_path(path: &Path) -> AftermovieResult<Self> {
        use anyhow::Context as _;

        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    pub(crate) fn from_bytes(bytes: Vec<u8>) -> AftermovieResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            AftermovieError::invalid_input("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AftermovieError::invalid_input("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` at `size_px`, wrapping at `max_width_px` when given.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        max_width_px: Option<f32>,
    ) -> AftermovieResult<TextBlock> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AftermovieError::invalid_input("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(TextBlock { layout })
    }

    /// Largest size in `[min_px, max_px]` at which `text` fits on one line of `max_width_px`.
    ///
    /// Falls back to a wrapped layout at `min_px` when even that overflows.
    pub(crate) fn fit_single_line(
        &mut self,
        text: &str,
        max_px: f32,
        min_px: f32,
        max_width_px: f32,
    ) -> AftermovieResult<(TextBlock, f32)> {
        let mut size = max_px.max(min_px);
        loop {
            let block = self.layout(text, size, None)?;
            if block.width() <= f64::from(max_width_px) {
                return Ok((block, size));
            }
            if size <= min_px {
                return Ok((self.layout(text, min_px, Some(max_width_px))?, min_px));
            }
            size = (size * 0.9).max(min_px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
