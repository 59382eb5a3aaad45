use crate::error::{Result, SignError};
use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoFont, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::{DrawTarget, OriginDimensions, Point, RgbColor, Size},
    text::{Baseline, Text},
    Drawable, Pixel as EgPixel,
};
use fontdue::{Font, FontSettings};
use image::{Rgb, RgbaImage};
use std::path::Path;

/// Bitmap font used when no TrueType font can be loaded. It has a single
/// size, so requested sizes are ignored.
const BUILTIN_FONT: &MonoFont<'static> = &FONT_10X20;

// ---------------------------------------------------------------------------
// TextExtent
// ---------------------------------------------------------------------------

/// Horizontal ink extent of a string relative to the pen origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub left: i32,
    pub width: i32,
}

// ---------------------------------------------------------------------------
// Typeface
// ---------------------------------------------------------------------------

pub enum Typeface {
    TrueType(Font),
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::TrueType(_) => f.write_str("Typeface::TrueType"),
            Typeface::Builtin => f.write_str("Typeface::Builtin"),
        }
    }
}

impl Typeface {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| SignError::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Font::from_bytes(bytes, FontSettings::default())
            .map(Typeface::TrueType)
            .map_err(|e| SignError::Font(e.to_string()))
    }

    /// Load the TrueType font at `path`, falling back to the built-in bitmap
    /// font when it is missing or unreadable.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(face) => face,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to built-in font");
                Typeface::Builtin
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin)
    }

    pub fn supports(&self, c: char) -> bool {
        match self {
            Typeface::TrueType(font) => font.lookup_glyph_index(c) != 0,
            Typeface::Builtin => c == ' ' || c.is_ascii_graphic(),
        }
    }

    /// Measure the ink extent of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> TextExtent {
        match self {
            Typeface::TrueType(font) => {
                let mut left = i32::MAX;
                let mut right = i32::MIN;
                for (pen, c) in pen_positions(font, text, size) {
                    let m = font.metrics(c, size);
                    if m.width == 0 {
                        continue;
                    }
                    left = left.min(pen + m.xmin);
                    right = right.max(pen + m.xmin + m.width as i32);
                }
                if left > right {
                    TextExtent::default()
                } else {
                    TextExtent {
                        left,
                        width: right - left,
                    }
                }
            }
            Typeface::Builtin => {
                let n = text.chars().count() as i32;
                if n == 0 {
                    return TextExtent::default();
                }
                let glyph = BUILTIN_FONT.character_size.width as i32;
                let spacing = BUILTIN_FONT.character_spacing as i32;
                TextExtent {
                    left: 0,
                    width: n * glyph + (n - 1) * spacing,
                }
            }
        }
    }

    /// Draw `text` with its ascender line at `y` and pen origin at `x`.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, size: f32, color: Rgb<u8>) {
        match self {
            Typeface::TrueType(font) => {
                let ascent = font
                    .horizontal_line_metrics(size)
                    .map_or(size * 0.8, |m| m.ascent);
                let baseline = y + ascent.round() as i32;
                for (pen, c) in pen_positions(font, text, size) {
                    let (m, coverage) = font.rasterize(c, size);
                    let gx = x + pen + m.xmin;
                    let gy = baseline - m.height as i32 - m.ymin;
                    for row in 0..m.height {
                        for col in 0..m.width {
                            let alpha = coverage[row * m.width + col];
                            if alpha > 0 {
                                blend(canvas, gx + col as i32, gy + row as i32, color, alpha);
                            }
                        }
                    }
                }
            }
            Typeface::Builtin => {
                let [r, g, b] = color.0;
                let style = MonoTextStyle::new(BUILTIN_FONT, Rgb888::new(r, g, b));
                let mut target = CanvasTarget(canvas);
                // Infallible target.
                let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                    .draw(&mut target);
            }
        }
    }
}

/// Pen x offset (rounded) of every character in `text`.
fn pen_positions(font: &Font, text: &str, size: f32) -> Vec<(i32, char)> {
    let mut pen = 0.0f32;
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        out.push((pen.round() as i32, c));
        pen += font.metrics(c, size).advance_width;
    }
    out
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgb<u8>, alpha: u8) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let px = canvas.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u32;
    for i in 0..3 {
        px.0[i] = ((color.0[i] as u32 * a + px.0[i] as u32 * (255 - a)) / 255) as u8;
    }
    px.0[3] = px.0[3].max(alpha);
}

// ---------------------------------------------------------------------------
// embedded-graphics adapter
// ---------------------------------------------------------------------------

/// Lets embedded-graphics draw the built-in font straight onto an RGBA image.
struct CanvasTarget<'a>(&'a mut RgbaImage);

impl OriginDimensions for CanvasTarget<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for CanvasTarget<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = EgPixel<Self::Color>>,
    {
        for EgPixel(point, color) in pixels {
            blend(
                self.0,
                point.x,
                point.y,
                Rgb([color.r(), color.g(), color.b()]),
                255,
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
