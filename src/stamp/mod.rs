// SPDX-License-Identifier: MPL-2.0
//! Burns a human-readable coordinate stamp into the pixels of an image.
//!
//! The stamp is a translucent dark band across the bottom edge carrying
//! two centered lines of text: the GMS position (with optional bearing)
//! and the capture time (with optional altitude). Text is rasterized
//! through an SVG overlay so the result is identical across platforms
//! that ship the same fonts.

use crate::coord::cardinal;
use crate::error::{Error, Result};
use crate::exif::GpsRecord;
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use image_rs::{Rgb, RgbImage, RgbaImage};
use resvg::usvg;
use std::io::Cursor;

/// JPEG quality of the stamped output.
const OUTPUT_QUALITY: u8 = 95;

/// Band fill, blended at [`BAND_ALPHA`] over the photo.
const BAND_COLOR: [u8; 3] = [30, 30, 30];
const BAND_ALPHA: f32 = 0.8;

/// Month abbreviations used on the date line.
const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

// =============================================================================
// Layout
// =============================================================================

/// Geometry of the stamp band, derived purely from the image dimensions
/// so identical inputs always produce identical stamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampLayout {
    /// Font size in pixels, a tenth of the shorter image edge clamped
    /// to a legible range.
    pub font_size: f32,
    pub line_spacing: f32,
    /// Height of the two text lines plus the spacing between them.
    pub text_block_height: f32,
    pub band_height: f32,
    /// Vertical center of the first text line, in image coordinates.
    pub line1_center_y: f32,
    /// Vertical center of the second text line, in image coordinates.
    pub line2_center_y: f32,
}

impl StampLayout {
    /// Computes the band geometry for an image of the given size.
    #[must_use]
    pub fn compute(width: u32, height: u32) -> Self {
        let min_dim = width.min(height) as f32;
        let font_size = (min_dim / 10.0).clamp(36.0, 90.0);
        let line_spacing = 0.2 * font_size;
        let text_block_height = 2.0 * font_size + line_spacing;
        let band_height = text_block_height + 0.04 * min_dim;

        let band_top = height as f32 - band_height;
        let padding = (band_height - text_block_height) / 2.0;
        let line1_center_y = band_top + padding + font_size / 2.0;
        let line2_center_y = line1_center_y + font_size + line_spacing;

        Self {
            font_size,
            line_spacing,
            text_block_height,
            band_height,
            line1_center_y,
            line2_center_y,
        }
    }

    fn band_top(&self, height: u32) -> u32 {
        (height as f32 - self.band_height).max(0.0) as u32
    }
}

// =============================================================================
// Text composition
// =============================================================================

/// The two text lines of a stamp, before rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct StampText {
    pub line1: String,
    pub line2: String,
}

impl StampText {
    /// Composes the stamp lines from a GPS record and an optional Exif
    /// timestamp (`"YYYY:MM:DD HH:MM:SS"`). A missing or unparseable
    /// timestamp falls back to the current local time.
    #[must_use]
    pub fn compose(gps: &GpsRecord, timestamp: Option<&str>) -> Self {
        let mut line1 = format!("{} | {}", gps.formatted.latitude, gps.formatted.longitude);
        if let Some(bearing) = gps.bearing_degrees {
            line1.push_str(&format!("  {}° {}", bearing.round(), cardinal(bearing)));
        }

        let when = timestamp
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, "%Y:%m:%d %H:%M:%S").ok())
            .unwrap_or_else(|| Local::now().naive_local());
        let mut line2 = format!(
            "{:02}:{:02} | {} {}, {}",
            when.hour(),
            when.minute(),
            MONTHS[when.month0() as usize],
            when.day(),
            when.year()
        );
        if let Some(altitude) = gps.altitude_meters {
            line2.push_str(&format!("  |  {} m", altitude.round()));
        }

        Self { line1, line2 }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Decodes an image, burns the stamp band into its bottom edge, and
/// re-encodes it as a JPEG. The input buffer is never modified.
///
/// # Errors
///
/// Returns [`Error::Render`] when the image cannot be decoded, the text
/// overlay cannot be rasterized, or the output cannot be encoded.
pub fn render_stamp(bytes: &[u8], gps: &GpsRecord, timestamp: Option<&str>) -> Result<Vec<u8>> {
    let decoded = image_rs::load_from_memory(bytes)
        .map_err(|e| Error::Render(format!("cannot decode image: {e}")))?;
    let mut canvas = decoded.to_rgba8();
    let (width, height) = (canvas.width(), canvas.height());

    let layout = StampLayout::compute(width, height);
    let text = StampText::compose(gps, timestamp);

    draw_band(&mut canvas, &layout);
    draw_text(&mut canvas, &layout, &text)?;

    encode_jpeg(&canvas)
}

/// Alpha-blends the translucent band over the bottom rows of the image.
fn draw_band(canvas: &mut RgbaImage, layout: &StampLayout) {
    let band_top = layout.band_top(canvas.height());
    for y in band_top..canvas.height() {
        for x in 0..canvas.width() {
            let pixel = canvas.get_pixel_mut(x, y);
            for (channel, band) in pixel.0.iter_mut().zip(BAND_COLOR) {
                *channel = (band as f32 * BAND_ALPHA + *channel as f32 * (1.0 - BAND_ALPHA))
                    .round() as u8;
            }
        }
    }
}

/// Rasterizes the two text lines through an SVG overlay and composites
/// the result over the band.
fn draw_text(canvas: &mut RgbaImage, layout: &StampLayout, text: &StampText) -> Result<()> {
    let svg = overlay_svg(canvas.width(), canvas.height(), layout, text);

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| Error::Render(format!("stamp overlay did not parse: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(canvas.width(), canvas.height())
        .ok_or_else(|| Error::Render("failed to allocate text overlay".to_string()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    for (index, premultiplied) in pixmap.pixels().iter().enumerate() {
        let source = premultiplied.demultiply();
        if source.alpha() == 0 {
            continue;
        }
        let x = (index as u32) % canvas.width();
        let y = (index as u32) / canvas.width();
        let alpha = source.alpha() as f32 / 255.0;
        let pixel = canvas.get_pixel_mut(x, y);
        for (channel, overlay) in pixel
            .0
            .iter_mut()
            .zip([source.red(), source.green(), source.blue()])
        {
            *channel =
                (overlay as f32 * alpha + *channel as f32 * (1.0 - alpha)).round() as u8;
        }
    }
    Ok(())
}

/// Builds the SVG document holding both text lines, centered in the
/// band. Baselines sit a little below the line centers so the glyph
/// body lands on the center.
fn overlay_svg(width: u32, height: u32, layout: &StampLayout, text: &StampText) -> String {
    let center_x = width as f32 / 2.0;
    let baseline_offset = 0.35 * layout.font_size;
    let attrs = format!(
        "font-family=\"monospace\" font-weight=\"bold\" font-size=\"{}\" \
         fill=\"white\" text-anchor=\"middle\"",
        layout.font_size
    );
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\
         <text x=\"{center_x}\" y=\"{y1}\" {attrs}>{line1}</text>\
         <text x=\"{center_x}\" y=\"{y2}\" {attrs}>{line2}</text>\
         </svg>",
        y1 = layout.line1_center_y + baseline_offset,
        y2 = layout.line2_center_y + baseline_offset,
        line1 = escape_xml(&text.line1),
        line2 = escape_xml(&text.line2),
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn encode_jpeg(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let rgb = RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let p = canvas.get_pixel(x, y);
        Rgb([p.0[0], p.0[1], p.0[2]])
    });
    let mut bytes = Vec::new();
    rgb.write_with_encoder(image_rs::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut Cursor::new(&mut bytes),
        OUTPUT_QUALITY,
    ))
    .map_err(|e| Error::Render(format!("cannot encode stamped image: {e}")))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::DecimalCoordinate;

    fn record(altitude: Option<f64>, bearing: Option<f64>) -> GpsRecord {
        GpsRecord::new(DecimalCoordinate::new(18.4585, -69.9559), altitude, bearing)
    }

    #[test]
    fn layout_uses_tenth_of_short_edge() {
        let layout = StampLayout::compute(4000, 3000);
        assert_eq!(layout.font_size, 90.0); // 300 clamped down
        let layout = StampLayout::compute(600, 800);
        assert_eq!(layout.font_size, 60.0);
    }

    #[test]
    fn layout_clamps_small_images_up() {
        let layout = StampLayout::compute(300, 200);
        assert_eq!(layout.font_size, 36.0);
    }

    #[test]
    fn layout_band_covers_text_block_with_margin() {
        let layout = StampLayout::compute(1000, 1000);
        assert!(layout.band_height > layout.text_block_height);
        assert!((layout.band_height - layout.text_block_height - 40.0).abs() < 0.001);
    }

    #[test]
    fn layout_lines_sit_inside_the_band() {
        let height = 900;
        let layout = StampLayout::compute(1200, height);
        let band_top = height as f32 - layout.band_height;
        assert!(layout.line1_center_y > band_top);
        assert!(layout.line2_center_y < height as f32);
        assert!(layout.line2_center_y > layout.line1_center_y);
    }

    #[test]
    fn text_carries_both_axes_and_bearing() {
        let text = StampText::compose(&record(None, Some(95.0)), None);
        assert!(text.line1.contains("18° 27' 30.6\" N"));
        assert!(text.line1.contains("69° 57' 21.24\" W"));
        assert!(text.line1.ends_with("95° E"));
    }

    #[test]
    fn text_formats_a_known_timestamp() {
        let text = StampText::compose(&record(Some(365.2), None), Some("2026:01:05 14:30:00"));
        assert_eq!(text.line2, "14:30 | Ene 5, 2026  |  365 m");
    }

    #[test]
    fn text_without_extras_has_no_separators_dangling() {
        let text = StampText::compose(&record(None, None), Some("2026:08:31 09:05:59"));
        assert_eq!(text.line2, "09:05 | Ago 31, 2026");
        assert!(!text.line1.contains('°') || text.line1.matches('°').count() == 2);
    }

    #[test]
    fn bad_timestamp_falls_back_without_panicking() {
        let text = StampText::compose(&record(None, None), Some("not a timestamp"));
        assert!(text.line2.contains(" | "));
    }

    #[test]
    fn band_darkens_the_bottom_of_the_image() {
        let mut canvas = RgbaImage::from_pixel(200, 200, image_rs::Rgba([200, 200, 200, 255]));
        let layout = StampLayout::compute(200, 200);
        draw_band(&mut canvas, &layout);

        // blend of 30 at 0.8 over 200: 0.8*30 + 0.2*200 = 64
        let stamped = canvas.get_pixel(100, 199);
        assert_eq!(stamped.0[0], 64);
        // top of the image is untouched
        assert_eq!(canvas.get_pixel(100, 0).0[0], 200);
    }

    #[test]
    fn render_produces_a_decodable_jpeg_of_same_size() {
        let source = RgbaImage::from_pixel(400, 300, image_rs::Rgba([90, 120, 150, 255]));
        let mut bytes = Vec::new();
        image_rs::DynamicImage::ImageRgba8(source)
            .to_rgb8()
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image_rs::ImageFormat::Jpeg,
            )
            .unwrap();

        let stamped = render_stamp(&bytes, &record(Some(10.0), Some(180.0)), None)
            .expect("stamping should succeed");
        let decoded = image_rs::load_from_memory(&stamped).expect("output must decode");
        assert_eq!(decoded.width(), 400);
        assert_eq!(decoded.height(), 300);
    }

    #[test]
    fn render_rejects_garbage_input() {
        let result = render_stamp(b"not an image", &record(None, None), None);
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
