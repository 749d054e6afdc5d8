use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[cfg(feature = "render")]
pub use render::*;

/// Icon sizes a browser extension asks for
pub const DEFAULT_SIZES: [u32; 4] = [16, 32, 48, 128];

pub const DEFAULT_LABEL: &str = "AN";

/// CSS form of the brand color
pub const DEFAULT_COLOR: &str = "#667eea";

/// Printed instead of rendering when the binary was built without the
/// `render` feature
pub const MISSING_RENDERER_GUIDANCE: &str = "\
❌ Error: PNG rendering support is not compiled into this binary

To install it, rebuild with the default features:
  cargo install ext-icon-gen --features render

Or use the HTML icon generator instead:
  Open: icons/generate-icons-standalone.html";

#[derive(Debug, Clone)]
pub struct Args {
    /// Output directory, the executable's directory when unset
    pub output: Option<PathBuf>,
    /// Sizes to render, [`DEFAULT_SIZES`] when unset
    pub sizes: Option<Vec<u32>>,
    pub label: String,
    pub color: String,
    /// Preferred font file, replacing the system font search
    pub font: Option<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            output: None,
            sizes: None,
            label: DEFAULT_LABEL.to_string(),
            color: DEFAULT_COLOR.to_string(),
            font: None,
        }
    }
}

/// The directory containing the running executable
pub fn default_output_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Can't locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable {} has no parent directory", exe.display()))
}

pub fn icon_path(dir: &Path, size: u32) -> PathBuf {
    dir.join(format!("icon{size}.png"))
}

#[cfg(feature = "render")]
mod render {
    use super::{default_output_dir, icon_path, Args, DEFAULT_LABEL, DEFAULT_SIZES};
    use crate::canvas::{Canvas, Surface};
    use crate::font::{load_font, FontSource, IconFont};
    use anyhow::{Context, Result};
    use image::Rgba;
    use std::{
        fs::create_dir_all,
        path::{Path, PathBuf},
        str::FromStr,
    };

    /// #667eea
    pub const BRAND_COLOR: Rgba<u8> = Rgba([102, 126, 234, 255]);
    pub const CIRCLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[derive(Debug, Clone, PartialEq)]
    pub struct IconStyle {
        /// Background and label color
        pub color: Rgba<u8>,
        pub label: String,
    }

    impl Default for IconStyle {
        fn default() -> Self {
            Self {
                color: BRAND_COLOR,
                label: DEFAULT_LABEL.to_string(),
            }
        }
    }

    /// Round `size * ratio` to the nearest pixel
    fn scaled(size: u32, ratio: f32) -> u32 {
        (size as f32 * ratio).round() as u32
    }

    pub fn corner_radius(size: u32) -> u32 {
        scaled(size, 0.2)
    }

    pub fn circle_radius(size: u32) -> u32 {
        scaled(size, 0.35)
    }

    pub fn font_px(size: u32) -> u32 {
        scaled(size, 0.4)
    }

    /// How far the label sits above true center, balancing it inside the circle
    pub fn text_lift(size: u32) -> u32 {
        scaled(size, 0.05)
    }

    /// Parse a CSS color into an opaque RGBA pixel. Translucent colors are
    /// rejected.
    pub fn parse_color(color: &str) -> Result<Rgba<u8>> {
        let srgb = css_color::Srgb::from_str(color)
            .map_err(|_| anyhow::anyhow!("Invalid color: {}", color))?;
        if srgb.alpha < 1.0 {
            anyhow::bail!("Color must be opaque: {}", color);
        }
        let channel = |value: f32| (value * 255.).round().clamp(0., 255.) as u8;
        Ok(Rgba([
            channel(srgb.red),
            channel(srgb.green),
            channel(srgb.blue),
            255,
        ]))
    }

    /// Compose one icon. `font` should already be sized for `size`.
    pub fn render_icon(size: u32, style: &IconStyle, font: &IconFont) -> Result<Canvas> {
        if size == 0 {
            anyhow::bail!("Icon size must be positive");
        }

        let mut canvas = Canvas::new(size, size);

        canvas.fill_rounded_rect(0, 0, size, size, corner_radius(size), style.color);

        let center = size as f32 / 2.0;
        let radius = circle_radius(size) as f32;
        canvas.fill_ellipse((center, center), (radius, radius), CIRCLE_COLOR);

        let bounds = canvas.measure_text(&style.label, font);
        if !bounds.is_empty() {
            let size = size as i32;
            let x = (size - bounds.width()) / 2 - bounds.min_x;
            let y = (size - bounds.height()) / 2 - text_lift(size as u32) as i32 - bounds.min_y;
            canvas.draw_text((x, y), &style.label, font, style.color);
        }

        Ok(canvas)
    }

    /// Render one icon and write it to `output_path` as PNG.
    /// Font problems fall back to the builtin font; I/O errors propagate.
    pub fn create_icon(
        size: u32,
        output_path: &Path,
        style: &IconStyle,
        font_source: &FontSource,
    ) -> Result<()> {
        let font = load_font(font_source, font_px(size));
        write_icon(size, output_path, style, &font)
    }

    /// Render one icon with an already resolved font, resized for `size`,
    /// and write it to `output_path`
    pub fn write_icon(
        size: u32,
        output_path: &Path,
        style: &IconStyle,
        font: &IconFont,
    ) -> Result<()> {
        render_icon(size, style, &font.resized(font_px(size)))?.save_png(output_path)
    }

    /// Render every requested size into the output directory.
    /// Returns the written paths in size order.
    pub fn generate_icons(args: Args) -> Result<Vec<PathBuf>> {
        println!("Generating extension icons...\n");

        let style = IconStyle {
            color: parse_color(&args.color)?,
            label: args.label,
        };

        let sizes = args.sizes.unwrap_or_else(|| DEFAULT_SIZES.to_vec());
        if sizes.is_empty() {
            anyhow::bail!("No icon sizes requested");
        }
        if sizes.contains(&0) {
            anyhow::bail!("Icon sizes must be positive");
        }

        let out_dir = match args.output {
            Some(dir) => dir,
            None => default_output_dir()?,
        };
        create_dir_all(&out_dir).context("Can't create output directory")?;

        let font_source = args.font.map(FontSource::File).unwrap_or(FontSource::System);
        let font = load_font(&font_source, font_px(sizes[0]));

        let mut written = Vec::with_capacity(sizes.len());
        for size in sizes {
            let path = icon_path(&out_dir, size);
            write_icon(size, &path, &style, &font)?;
            println!("  ✓ Created: {}", path.display());
            written.push(path);
        }

        println!("\n✓ All icons generated successfully!");
        println!("Location: {}", out_dir.display());
        println!("\nNext steps:");
        println!("1. Reload your extension in chrome://extensions/");
        println!("2. The icons should now appear!");

        Ok(written)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn builtin_for(size: u32) -> IconFont {
            IconFont::builtin(font_px(size))
        }

        #[test]
        fn geometry_rounds_to_nearest_pixel() {
            let expected = [
                // size, corner, circle, font, lift
                (16, 3, 6, 6, 1),
                (32, 6, 11, 13, 2),
                (48, 10, 17, 19, 2),
                (128, 26, 45, 51, 6),
            ];
            for (size, corner, circle, font, lift) in expected {
                assert_eq!(corner_radius(size), corner, "corner for {size}");
                assert_eq!(circle_radius(size), circle, "circle for {size}");
                assert_eq!(font_px(size), font, "font for {size}");
                assert_eq!(text_lift(size), lift, "lift for {size}");
            }
        }

        #[test]
        fn default_color_is_the_brand_color() {
            assert_eq!(parse_color(super::super::DEFAULT_COLOR).unwrap(), BRAND_COLOR);
            assert_eq!(IconStyle::default().color, BRAND_COLOR);
        }

        #[test]
        fn named_and_short_colors_parse() {
            assert_eq!(parse_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
            assert_eq!(parse_color("#000").unwrap(), Rgba([0, 0, 0, 255]));
        }

        #[test]
        fn invalid_color_is_rejected() {
            assert!(parse_color("not-a-color").is_err());
        }

        #[test]
        fn translucent_color_is_rejected() {
            let err = parse_color("#667eea80").unwrap_err();
            assert!(err.to_string().contains("opaque"));
            assert_eq!(parse_color("#667eeaff").unwrap(), BRAND_COLOR);
        }

        #[test]
        fn zero_size_is_rejected() {
            assert!(render_icon(0, &IconStyle::default(), &builtin_for(0)).is_err());
        }

        #[test]
        fn corners_are_transparent_and_edges_branded() {
            for size in DEFAULT_SIZES {
                let canvas = render_icon(size, &IconStyle::default(), &builtin_for(size)).unwrap();
                let img = canvas.image();
                let last = size - 1;

                for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
                    assert_eq!(img.get_pixel(x, y)[3], 0, "corner ({x}, {y}) of {size}");
                }

                let r = corner_radius(size);
                for (x, y) in [(r, 0), (0, r), (last - r, last), (last, last - r)] {
                    assert_eq!(*img.get_pixel(x, y), BRAND_COLOR, "edge ({x}, {y}) of {size}");
                }
            }
        }

        #[test]
        fn circle_is_centered_with_expected_radius() {
            for size in DEFAULT_SIZES {
                let canvas = render_icon(size, &IconStyle::default(), &builtin_for(size)).unwrap();
                let img = canvas.image();
                let mid = size / 2;
                let r = circle_radius(size);

                // Top of the circle sits clear of the label
                assert_eq!(*img.get_pixel(mid, mid - r), CIRCLE_COLOR, "inside top of {size}");
                assert_eq!(*img.get_pixel(mid, mid - r - 1), BRAND_COLOR, "outside top of {size}");
                assert_eq!(*img.get_pixel(mid, mid + r - 1), CIRCLE_COLOR, "inside bottom of {size}");
                assert_eq!(*img.get_pixel(mid, mid + r), BRAND_COLOR, "outside bottom of {size}");
            }
        }

        #[test]
        fn label_is_drawn_inside_the_circle() {
            let size = 128;
            let canvas = render_icon(size, &IconStyle::default(), &builtin_for(size)).unwrap();
            let img = canvas.image();
            let center = size as f32 / 2.0;
            let inner = circle_radius(size) as f32 - 1.0;

            let label_pixels = img
                .enumerate_pixels()
                .filter(|(x, y, p)| {
                    let dx = *x as f32 + 0.5 - center;
                    let dy = *y as f32 + 0.5 - center;
                    dx * dx + dy * dy < inner * inner && **p == BRAND_COLOR
                })
                .count();
            assert!(label_pixels > 0);
        }

        #[test]
        fn label_is_centered_and_lifted() {
            let size = 128;
            let style = IconStyle::default();
            let font = builtin_for(size);
            let canvas = render_icon(size, &style, &font).unwrap();
            let img = canvas.image();

            // Rows holding label ink inside the circle's horizontal band
            let center = size as f32 / 2.0;
            let inner = circle_radius(size) as f32 - 1.0;
            let rows: Vec<u32> = (0..size)
                .filter(|&y| {
                    (0..size).any(|x| {
                        let dx = x as f32 + 0.5 - center;
                        let dy = y as f32 + 0.5 - center;
                        dx * dx + dy * dy < inner * inner && *img.get_pixel(x, y) == style.color
                    })
                })
                .collect();

            let bounds = font.text_bounds(&style.label);
            let top = (size as i32 - bounds.height()) / 2 - text_lift(size) as i32;
            assert_eq!(rows.first().copied(), Some(top as u32));
            assert_eq!(rows.last().copied(), Some((top + bounds.height() - 1) as u32));
        }

        #[test]
        fn empty_label_leaves_circle_plain() {
            let style = IconStyle {
                label: String::new(),
                ..IconStyle::default()
            };
            let canvas = render_icon(48, &style, &builtin_for(48)).unwrap();
            assert_eq!(*canvas.image().get_pixel(24, 24), CIRCLE_COLOR);
        }

        #[test]
        fn custom_color_paints_background() {
            let style = IconStyle {
                color: Rgba([10, 20, 30, 255]),
                ..IconStyle::default()
            };
            let canvas = render_icon(32, &style, &builtin_for(32)).unwrap();
            assert_eq!(*canvas.image().get_pixel(16, 0), style.color);
        }
    }
}
