use crate::foundation::core::Canvas;

/// A rendered frame as RGBA8 pixels.
///
/// Frames coming out of the painter are **premultiplied alpha**; the flag makes that explicit at
/// the sink boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with one premultiplied colour.
    pub fn solid(canvas: Canvas, premul: [u8; 4]) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: premul.repeat((canvas.width as usize) * (canvas.height as usize)),
            premultiplied: true,
        }
    }

    /// Pixel at `(x, y)`, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}
