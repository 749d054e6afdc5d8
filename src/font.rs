//! Font resolution for icon labels
//!
//! A TrueType font is preferred: either a file given by the user or the first
//! bold sans-serif font found in the usual system locations. When nothing can
//! be loaded the built-in 5×7 bitmap font is used instead, so rendering never
//! fails because of fonts.

use crate::canvas::TextBounds;
use log::{debug, warn};
use rusttype::{point, Font, Scale};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Width of a builtin glyph cell, in font pixels
pub const BUILTIN_GLYPH_WIDTH: u32 = 5;
/// Height of a builtin glyph cell, in font pixels
pub const BUILTIN_GLYPH_HEIGHT: u32 = 7;
/// Blank columns between builtin glyphs
const BUILTIN_GLYPH_SPACING: u32 = 1;

/// Where to look for the preferred font
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// Probe the platform's font directories
    System,
    /// Only try this file
    File(PathBuf),
    /// Skip TrueType fonts entirely
    Builtin,
}

#[derive(Clone)]
pub enum IconFont {
    TrueType { font: Font<'static>, px: u32 },
    Builtin { scale: u32 },
}

impl fmt::Debug for IconFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IconFont::TrueType { px, .. } => write!(f, "TrueType({px}px)"),
            IconFont::Builtin { scale } => write!(f, "Builtin(x{scale})"),
        }
    }
}

impl IconFont {
    /// The builtin font magnified to come close to `px` pixels tall
    pub fn builtin(px: u32) -> Self {
        IconFont::Builtin {
            scale: (px / BUILTIN_GLYPH_HEIGHT).max(1),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, IconFont::Builtin { .. })
    }

    /// The same face at a different pixel height
    pub fn resized(&self, px: u32) -> Self {
        match self {
            IconFont::TrueType { font, .. } => IconFont::TrueType {
                font: font.clone(),
                px,
            },
            IconFont::Builtin { .. } => IconFont::builtin(px),
        }
    }

    /// Ink bounding box of `text` laid out from the origin
    pub fn text_bounds(&self, text: &str) -> TextBounds {
        match self {
            IconFont::TrueType { font, px } => {
                let scale = Scale::uniform(*px as f32);
                let ascent = font.v_metrics(scale).ascent;
                font.layout(text, scale, point(0.0, ascent))
                    .filter_map(|glyph| glyph.pixel_bounding_box())
                    .fold(TextBounds::default(), |acc, bb| {
                        acc.union(TextBounds {
                            min_x: bb.min.x,
                            min_y: bb.min.y,
                            max_x: bb.max.x,
                            max_y: bb.max.y,
                        })
                    })
            }
            IconFont::Builtin { scale } => {
                let count = text.chars().count() as i32;
                if count == 0 {
                    return TextBounds::default();
                }
                let advance = ((BUILTIN_GLYPH_WIDTH + BUILTIN_GLYPH_SPACING) * scale) as i32;
                TextBounds {
                    min_x: 0,
                    min_y: 0,
                    max_x: count * advance - (BUILTIN_GLYPH_SPACING * scale) as i32,
                    max_y: (BUILTIN_GLYPH_HEIGHT * scale) as i32,
                }
            }
        }
    }

    /// Call `plot(x, y, coverage)` for every inked pixel of `text`, with
    /// coordinates relative to the layout origin.
    pub fn rasterize<F>(&self, text: &str, mut plot: F)
    where
        F: FnMut(i32, i32, f32),
    {
        match self {
            IconFont::TrueType { font, px } => {
                let scale = Scale::uniform(*px as f32);
                let ascent = font.v_metrics(scale).ascent;
                for glyph in font.layout(text, scale, point(0.0, ascent)) {
                    if let Some(bb) = glyph.pixel_bounding_box() {
                        glyph.draw(|gx, gy, coverage| {
                            plot(bb.min.x + gx as i32, bb.min.y + gy as i32, coverage);
                        });
                    }
                }
            }
            IconFont::Builtin { scale } => {
                let scale = *scale as i32;
                let advance = (BUILTIN_GLYPH_WIDTH + BUILTIN_GLYPH_SPACING) as i32 * scale;
                for (index, ch) in text.chars().enumerate() {
                    let left = index as i32 * advance;
                    for (row, bits) in builtin_glyph(ch).iter().enumerate() {
                        for col in 0..BUILTIN_GLYPH_WIDTH as i32 {
                            if bits & (1 << (BUILTIN_GLYPH_WIDTH as i32 - 1 - col)) == 0 {
                                continue;
                            }
                            let cell_x = left + col * scale;
                            let cell_y = row as i32 * scale;
                            for dy in 0..scale {
                                for dx in 0..scale {
                                    plot(cell_x + dx, cell_y + dy, 1.0);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Resolve a font `px` pixels tall, falling back to the builtin font
pub fn load_font(source: &FontSource, px: u32) -> IconFont {
    let candidates = match source {
        FontSource::System => system_font_paths(),
        FontSource::File(path) => vec![path.clone()],
        FontSource::Builtin => return IconFont::builtin(px),
    };

    for path in &candidates {
        if let Some(font) = load_truetype(path) {
            debug!("Using font {}", path.display());
            return IconFont::TrueType { font, px };
        }
    }

    warn!(
        "No usable font among {} candidate(s), using the builtin bitmap font",
        candidates.len()
    );
    IconFont::builtin(px)
}

fn load_truetype(path: &Path) -> Option<Font<'static>> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            debug!("Can't read font {}: {}", path.display(), err);
            return None;
        }
    };

    let font = Font::try_from_vec(data);
    if font.is_none() {
        debug!("Can't parse font {}", path.display());
    }
    font
}

#[cfg(target_os = "windows")]
fn system_font_paths() -> Vec<PathBuf> {
    let system_root = std::env::var("SYSTEMROOT").unwrap_or_else(|_| "C:\\Windows".to_string());
    ["arialbd.ttf", "arial.ttf", "segoeuib.ttf", "segoeui.ttf"]
        .iter()
        .map(|name| PathBuf::from(format!("{system_root}\\Fonts\\{name}")))
        .collect()
}

#[cfg(target_os = "macos")]
fn system_font_paths() -> Vec<PathBuf> {
    [
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        "/Library/Fonts/Arial Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(target_os = "linux")]
fn system_font_paths() -> Vec<PathBuf> {
    [
        // Debian/Ubuntu
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        "/usr/share/fonts/truetype/msttcorefonts/Arial_Bold.ttf",
        // Fedora/RHEL
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
        // Arch
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn system_font_paths() -> Vec<PathBuf> {
    Vec::new()
}

/// Rows of a 5×7 glyph, most significant of the low five bits on the left.
/// Lowercase letters map to uppercase; anything unknown is blank.
fn builtin_glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        _ => [0; 7],
    }
}
