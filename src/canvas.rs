//! In-memory drawing surface for icon composition
//!
//! The renderer only needs a handful of primitives, collected in the
//! [`Surface`] trait. [`Canvas`] implements them on top of an RGBA buffer from
//! the `image` crate. Shapes are filled by testing each pixel center, so
//! output is deterministic and free of anti-aliasing. Text coverage comes
//! from the font and is alpha-blended.

use crate::font::IconFont;
use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageBuffer, ImageEncoder, Rgba, RgbaImage,
};
use std::{io::Write, path::Path};

/// Ink bounding box of a laid-out string, relative to the layout origin.
/// `max_x`/`max_y` are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Grow the box so that it also covers `other`
    pub fn union(self, other: TextBounds) -> TextBounds {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        TextBounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// The drawing capabilities the icon renderer relies on
pub trait Surface {
    fn dimensions(&self) -> (u32, u32);

    /// Fill the rectangle at `(x, y)` of `width × height` with corners
    /// rounded to `radius`.
    fn fill_rounded_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        radius: u32,
        color: Rgba<u8>,
    );

    fn fill_ellipse(&mut self, center: (f32, f32), radii: (f32, f32), color: Rgba<u8>);

    fn measure_text(&self, text: &str, font: &IconFont) -> TextBounds;

    /// Draw `text` with its layout origin at `origin`. Ink that falls outside
    /// the surface is clipped.
    fn draw_text(&mut self, origin: (i32, i32), text: &str, font: &IconFont, color: Rgba<u8>);

    fn encode_png(&self) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0])),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let encoded = self.encode_png()?;
        std::fs::write(path, encoded)
            .with_context(|| format!("Failed to write PNG file {}", path.display()))?;
        Ok(())
    }

    /// Composite `color` over the pixel at `(x, y)` with the given coverage
    fn blend(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        let (width, height) = self.pixels.dimensions();
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            return;
        }

        let src_a = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
        if src_a <= 0.0 {
            return;
        }

        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        for channel in 0..3 {
            let mixed = (color[channel] as f32 * src_a
                + dst[channel] as f32 * dst_a * (1.0 - src_a))
                / out_a;
            dst[channel] = mixed.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

impl Surface for Canvas {
    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn fill_rounded_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        radius: u32,
        color: Rgba<u8>,
    ) {
        let (canvas_w, canvas_h) = self.pixels.dimensions();
        let x_end = x.saturating_add(width).min(canvas_w);
        let y_end = y.saturating_add(height).min(canvas_h);

        let w = width as f32;
        let h = height as f32;
        let r = radius.min(width / 2).min(height / 2) as f32;

        for py in y..y_end {
            for px in x..x_end {
                // Pixel center in rectangle-local coordinates
                let lx = (px - x) as f32 + 0.5;
                let ly = (py - y) as f32 + 0.5;

                // Nearest point of the inner (radius-inset) rectangle
                let cx = lx.clamp(r, w - r);
                let cy = ly.clamp(r, h - r);

                let dx = lx - cx;
                let dy = ly - cy;
                if dx * dx + dy * dy <= r * r {
                    self.pixels.put_pixel(px, py, color);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, center: (f32, f32), radii: (f32, f32), color: Rgba<u8>) {
        let (cx, cy) = center;
        let (rx, ry) = radii;
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }

        let (width, height) = self.pixels.dimensions();
        let x_start = (cx - rx).floor().max(0.0) as u32;
        let y_start = (cy - ry).floor().max(0.0) as u32;
        let x_end = ((cx + rx).ceil().max(0.0) as u32).min(width);
        let y_end = ((cy + ry).ceil().max(0.0) as u32).min(height);

        for py in y_start..y_end {
            for px in x_start..x_end {
                let nx = (px as f32 + 0.5 - cx) / rx;
                let ny = (py as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.pixels.put_pixel(px, py, color);
                }
            }
        }
    }

    fn measure_text(&self, text: &str, font: &IconFont) -> TextBounds {
        font.text_bounds(text)
    }

    fn draw_text(&mut self, origin: (i32, i32), text: &str, font: &IconFont, color: Rgba<u8>) {
        let (ox, oy) = origin;
        font.rasterize(text, |x, y, coverage| {
            self.blend(ox + x, oy + y, color, coverage);
        });
    }

    fn encode_png(&self) -> Result<Vec<u8>> {
        let (width, height) = self.pixels.dimensions();
        let mut buf = Vec::new();
        write_png(self.pixels.as_raw(), &mut buf, width, height)?;
        Ok(buf)
    }
}

// Encode RGBA data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, width: u32, height: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder
        .write_image(image_data, width, height, ColorType::Rgba8)
        .context("Failed to encode PNG")?;
    Ok(())
}
