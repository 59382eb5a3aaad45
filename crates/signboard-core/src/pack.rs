//! Conversion of an arbitrary RGB image into the packed frame format of the
//! 7.3" six-color e-paper panel.
//!
//! The frame is 800×480 pixels, 4 bits per pixel, two pixels per byte with
//! the left pixel in the high nibble. Rows are 400 bytes, stored top to
//! bottom, for a total of 192,000 bytes.

use crate::error::{Result, SignError};
use image::imageops::{self, ColorMap, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use std::fmt;
use std::path::Path;

pub const FRAME_WIDTH: u32 = 800;
pub const FRAME_HEIGHT: u32 = 480;
pub const ROW_BYTES: usize = FRAME_WIDTH as usize / 2;
pub const FRAME_BYTES: usize = ROW_BYTES * FRAME_HEIGHT as usize;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub name: &'static str,
    pub rgb: [u8; 3],
    pub code: u8,
}

/// Panel colors in declaration order. Order matters: nearest-color ties go
/// to the earlier entry. Code 0x4 is not wired on this panel.
pub const PALETTE: [PaletteEntry; 6] = [
    PaletteEntry { name: "black", rgb: [0, 0, 0], code: 0x0 },
    PaletteEntry { name: "white", rgb: [255, 255, 255], code: 0x1 },
    PaletteEntry { name: "yellow", rgb: [255, 255, 0], code: 0x2 },
    PaletteEntry { name: "red", rgb: [200, 80, 50], code: 0x3 },
    PaletteEntry { name: "blue", rgb: [100, 120, 180], code: 0x5 },
    PaletteEntry { name: "green", rgb: [200, 200, 80], code: 0x6 },
];

/// Index into [`PALETTE`] of the entry closest to `rgb` by squared Euclidean
/// distance.
pub fn nearest_index(rgb: [u8; 3]) -> usize {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (i, entry) in PALETTE.iter().enumerate() {
        let distance: u32 = rgb
            .iter()
            .zip(entry.rgb.iter())
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

/// Palette code of the entry closest to `rgb`.
pub fn nearest_code(rgb: [u8; 3]) -> u8 {
    PALETTE[nearest_index(rgb)].code
}

pub fn is_palette_code(code: u8) -> bool {
    PALETTE.iter().any(|e| e.code == code)
}

/// The panel palette as an `image` color map, so the stock Floyd–Steinberg
/// ditherer can quantize against it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelPalette;

impl ColorMap for PanelPalette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        nearest_index(color.0)
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        PALETTE.get(index).map(|e| Rgb(e.rgb))
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        *color = Rgb(PALETTE[nearest_index(color.0)].rgb);
    }
}

// ---------------------------------------------------------------------------
// PackedFrame
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Eq)]
pub struct PackedFrame(Vec<u8>);

impl PackedFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Palette codes in pixel order.
    pub fn nibbles(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().flat_map(|b| [b >> 4, b & 0x0f])
    }

    /// Palette code of the pixel at (`x`, `y`).
    pub fn code_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= FRAME_WIDTH || y >= FRAME_HEIGHT {
            return None;
        }
        let byte = self.0[y as usize * ROW_BYTES + x as usize / 2];
        Some(if x % 2 == 0 { byte >> 4 } else { byte & 0x0f })
    }
}

impl fmt::Debug for PackedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedFrame")
            .field("len", &self.0.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Largest 5:3 window of a `width`×`height` source, centered, as
/// `(left, top, width, height)` in source pixels. Scaling this window to
/// 800×480 covers the whole frame while keeping the aspect ratio.
pub fn cover_window(width: u32, height: u32) -> (u32, u32, u32, u32) {
    let (w, h) = (u64::from(width), u64::from(height));
    let (fw, fh) = (u64::from(FRAME_WIDTH), u64::from(FRAME_HEIGHT));
    let (crop_w, crop_h) = if w * fh > h * fw {
        ((h * fw / fh).max(1).min(w), h)
    } else {
        (w, (w * fh / fw).max(1).min(h))
    };
    // Both sides are bounded by the source dimensions, so they fit in u32.
    let (crop_w, crop_h) = (crop_w as u32, crop_h as u32);
    ((width - crop_w) / 2, (height - crop_h) / 2, crop_w, crop_h)
}

/// Crop the centered 5:3 window of `img` and scale it to exactly 800×480.
pub fn cover_resize(img: &DynamicImage) -> Result<RgbImage> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(SignError::EmptyImage);
    }

    let (left, top, crop_w, crop_h) = cover_window(width, height);
    let window = img.crop_imm(left, top, crop_w, crop_h).to_rgb8();
    if window.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
        return Ok(window);
    }
    Ok(imageops::resize(&window, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Lanczos3))
}

/// Pack an 800×480 image whose pixels are already palette colors.
pub fn pack_quantized(img: &RgbImage) -> PackedFrame {
    debug_assert_eq!(img.dimensions(), (FRAME_WIDTH, FRAME_HEIGHT));
    let mut buf = vec![0u8; FRAME_BYTES];
    for row in 0..FRAME_HEIGHT {
        for col in (0..FRAME_WIDTH).step_by(2) {
            let high = nearest_code(img.get_pixel(col, row).0);
            let low = nearest_code(img.get_pixel(col + 1, row).0);
            buf[row as usize * ROW_BYTES + col as usize / 2] = (high << 4) | low;
        }
    }
    PackedFrame(buf)
}

/// Floyd–Steinberg dither `frame` in place to the panel palette.
pub fn dither(frame: &mut RgbImage) {
    imageops::dither(frame, &PanelPalette);
}

/// Full conversion: cover-resize, dither to the panel palette, pack.
pub fn pack(img: &DynamicImage) -> Result<PackedFrame> {
    let mut frame = cover_resize(img)?;
    dither(&mut frame);
    Ok(pack_quantized(&frame))
}

/// Open the image at `path` and pack it. Nothing is converted when the image
/// cannot be opened.
pub fn pack_file(path: &Path) -> Result<PackedFrame> {
    if !path.exists() {
        return Err(SignError::ImageNotFound(path.display().to_string()));
    }
    let img = image::open(path)?;
    tracing::debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "packing image"
    );
    pack(&img)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
