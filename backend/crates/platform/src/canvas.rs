//! Offscreen Raster Surface
//!
//! A minimal 2D drawing surface with the handful of operations the
//! rendering-entropy signal needs: filled rectangles, filled text and a
//! base64 data-URL export.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::client::SignalError;
use crate::encoding::to_base64;

/// MIME type of [`SoftwareCanvas::to_data_url`] output
///
/// Payload is a zlib stream of `width (u32 be) | height (u32 be) | RGBA rows`.
pub const ZLIB_RGBA_MIME: &str = "image/x-rgba+zlib";

/// RGBA color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with a fractional alpha in `0.0..=1.0`
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        }
    }
}

/// 2D drawing surface
pub trait RasterSurface: Send {
    fn set_fill(&mut self, color: Rgba);

    /// CSS-style font shorthand, e.g. `"14px Arial"`
    fn set_font(&mut self, font: &str);

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), SignalError>;

    /// Draw text with its top-left corner at `(x, y)`
    fn fill_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), SignalError>;

    /// Export the pixels as a `data:` URL with base64 payload
    fn to_data_url(&self) -> Result<String, SignalError>;
}

/// CPU-side RGBA surface
///
/// Glyphs are rendered as deterministic bit patterns derived from the
/// character code and font size; output is stable for identical input.
#[derive(Debug, Clone)]
pub struct SoftwareCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    fill: Rgba,
    font_px: u32,
    font_family: String,
}

impl SoftwareCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, SignalError> {
        if width == 0 || height == 0 {
            return Err(SignalError::Raster("surface has no area".to_string()));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| SignalError::Raster("surface too large".to_string()))?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
            fill: Rgba::rgb(0, 0, 0),
            font_px: 10,
            font_family: "sans-serif".to_string(),
        })
    }

    /// RGBA of a single pixel, `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some(Rgba {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    fn blend(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let src_a = u32::from(self.fill.a);
        let inv = 255 - src_a;
        let mix = |src: u8, dst: u8| ((u32::from(src) * src_a + u32::from(dst) * inv) / 255) as u8;
        self.pixels[i] = mix(self.fill.r, self.pixels[i]);
        self.pixels[i + 1] = mix(self.fill.g, self.pixels[i + 1]);
        self.pixels[i + 2] = mix(self.fill.b, self.pixels[i + 2]);
        self.pixels[i + 3] = (src_a + u32::from(self.pixels[i + 3]) * inv / 255) as u8;
    }

    fn glyph_on(&self, code: u32, col: u32, row: u32) -> bool {
        let family = self
            .font_family
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        let mut h = code
            .wrapping_mul(0x9E37_79B1)
            .wrapping_add(col.wrapping_mul(0x85EB_CA6B))
            .wrapping_add(row.wrapping_mul(0xC2B2_AE35))
            .wrapping_add(family);
        h ^= h >> 15;
        h = h.wrapping_mul(0x2C1B_3C6D);
        h ^= h >> 12;
        h & 3 != 0
    }
}

impl RasterSurface for SoftwareCanvas {
    fn set_fill(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn set_font(&mut self, font: &str) {
        let mut parts = font.split_whitespace();
        while let Some(part) = parts.next() {
            if let Some(px) = part.strip_suffix("px").and_then(|n| n.parse::<u32>().ok()) {
                self.font_px = px.clamp(1, 256);
                let family: Vec<&str> = parts.by_ref().collect();
                if !family.is_empty() {
                    self.font_family = family.join(" ");
                }
                break;
            }
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), SignalError> {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                self.blend(x.saturating_add(dx), y.saturating_add(dy));
            }
        }
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), SignalError> {
        let cell_w = (self.font_px * 3 / 5).max(1);
        let cell_h = self.font_px;
        for (n, ch) in text.chars().enumerate() {
            let origin_x = x.saturating_add((n as u32 * cell_w) as i32);
            for row in 0..cell_h {
                for col in 0..cell_w {
                    if self.glyph_on(ch as u32, col, row) {
                        self.blend(origin_x + col as i32, y + row as i32);
                    }
                }
            }
        }
        Ok(())
    }

    fn to_data_url(&self) -> Result<String, SignalError> {
        let raster_err = |e: std::io::Error| SignalError::Raster(e.to_string());

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.width.to_be_bytes()).map_err(raster_err)?;
        encoder.write_all(&self.height.to_be_bytes()).map_err(raster_err)?;
        encoder.write_all(&self.pixels).map_err(raster_err)?;
        let compressed = encoder.finish().map_err(raster_err)?;

        Ok(format!("data:{};base64,{}", ZLIB_RGBA_MIME, to_base64(&compressed)))
    }
}
