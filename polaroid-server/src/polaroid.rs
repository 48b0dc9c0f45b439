//! The polaroid compositing pipeline: normalize the uploaded photo, expand
//! it onto a white bordered canvas and burn the caption lines into the
//! bottom margin, then serialize as JPEG.

use crate::config::CaptionConfig;
use crate::error::ComposeError;
use chrono::NaiveDate;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage, imageops};
use rusttype::{Font, Point, PositionedGlyph, Scale};

/// Width every photo is normalized to before the border is applied.
pub const BASE_WIDTH: u32 = 1000;

/// White margin around the photo. The bottom is tall enough to hold the
/// three caption lines, like the lower band of an instant-film print.
pub const BORDER_LEFT: u32 = 40;
pub const BORDER_TOP: u32 = 40;
pub const BORDER_RIGHT: u32 = 40;
pub const BORDER_BOTTOM: u32 = 320;

// Caption layout inside the bottom margin: the first line sits 250px above
// the canvas bottom, the others at fixed offsets below it.
const CAPTION_ANCHOR_UP: f32 = 250.0;
const LINE_OFFSETS: [f32; 3] = [0.0, 80.0, 150.0];
const LINE_SCALES: [f32; 3] = [90.0, 70.0, 50.0];

const JPEG_QUALITY: u8 = 95;

/// The three caption lines: configured title, configured names, and the
/// date of composition as `DD/MM/YYYY`.
pub fn caption_lines(captions: &CaptionConfig, date: NaiveDate) -> [String; 3] {
    [
        captions.title.clone(),
        captions.names.clone(),
        date.format("%d/%m/%Y").to_string(),
    ]
}

/// Decode an uploaded byte stream, undo any EXIF camera rotation and resize
/// proportionally so the width becomes exactly [`BASE_WIDTH`].
pub fn normalize(bytes: &[u8]) -> Result<DynamicImage, ComposeError> {
    let mut img = image::load_from_memory(bytes).map_err(ComposeError::Decode)?;
    if let Some(tag) = exif_orientation(bytes) {
        img = apply_exif_orientation(img, tag);
    }
    let (w, h) = img.dimensions();
    let target_h = ((h as f64) * (BASE_WIDTH as f64) / (w as f64)).round().max(1.0) as u32;
    Ok(img.resize_exact(BASE_WIDTH, target_h, imageops::FilterType::Lanczos3))
}

/// Attempt to parse the EXIF orientation tag (1..=8) from raw image bytes.
fn exif_orientation(bytes: &[u8]) -> Option<u16> {
    let mut cursor = std::io::Cursor::new(bytes);
    let reader = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = reader.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    if let exif::Value::Short(ref v) = field.value {
        return v.first().copied();
    }
    None
}

/// Reinterpret pixel data so the visual "up" matches the pixel grid.
/// Covers the full set of orientation tags, including the mirrored ones.
fn apply_exif_orientation(img: DynamicImage, tag: u16) -> DynamicImage {
    match tag {
        2 => DynamicImage::ImageRgba8(imageops::flip_horizontal(&img)),
        3 => DynamicImage::ImageRgba8(imageops::rotate180(&img)),
        4 => DynamicImage::ImageRgba8(imageops::flip_vertical(&img)),
        5 => DynamicImage::ImageRgba8(imageops::flip_horizontal(&imageops::rotate90(&img))),
        6 => DynamicImage::ImageRgba8(imageops::rotate90(&img)),
        7 => DynamicImage::ImageRgba8(imageops::flip_vertical(&imageops::rotate90(&img))),
        8 => DynamicImage::ImageRgba8(imageops::rotate270(&img)),
        _ => img,
    }
}

/// Expand the normalized photo onto a white canvas with the polaroid border.
fn expand_border(photo: &DynamicImage) -> RgbaImage {
    let (w, h) = photo.dimensions();
    let mut canvas: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(
        w + BORDER_LEFT + BORDER_RIGHT,
        h + BORDER_TOP + BORDER_BOTTOM,
        Rgba([255, 255, 255, 255]),
    );
    imageops::overlay(&mut canvas, photo, BORDER_LEFT as i64, BORDER_TOP as i64);
    canvas
}

/// Full pipeline: normalize, border, captions, JPEG bytes.
pub fn create_polaroid(
    bytes: &[u8],
    font: &Font,
    lines: &[String; 3],
) -> Result<Vec<u8>, ComposeError> {
    let photo = normalize(bytes)?;
    let mut canvas = expand_border(&photo);
    let (w, h) = canvas.dimensions();
    let center_x = w as f32 / 2.0;
    let anchor_y = h as f32 - CAPTION_ANCHOR_UP;
    for (i, line) in lines.iter().enumerate() {
        draw_line_centered(
            &mut canvas,
            font,
            line,
            Scale::uniform(LINE_SCALES[i]),
            center_x,
            anchor_y + LINE_OFFSETS[i],
            Rgba([0, 0, 0, 255]),
        );
    }
    encode_jpeg(canvas)
}

/// Render one line of text with its bounding box centered on `(cx, cy)` in
/// both axes (middle-middle anchoring).
fn draw_line_centered(
    canvas: &mut RgbaImage,
    font: &Font,
    text: &str,
    scale: Scale,
    cx: f32,
    cy: f32,
    color: Rgba<u8>,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, Point { x: 0.0, y: 0.0 })
        .collect();
    if glyphs.is_empty() {
        return;
    }
    let text_width = glyphs
        .iter()
        .rev()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .next()
        .unwrap_or(0.0);
    let origin_x = (cx - text_width / 2.0).round() as i32;
    // Descent is negative, so this puts the ascender-to-descender midpoint on cy.
    let baseline_y = (cy + (v_metrics.ascent + v_metrics.descent) / 2.0).round() as i32;
    for glyph in &glyphs {
        if let Some(bbox) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                let px = origin_x + gx as i32 + bbox.min.x;
                let py = baseline_y + gy as i32 + bbox.min.y;
                if px >= 0 && py >= 0 && (px as u32) < canvas.width() && (py as u32) < canvas.height()
                {
                    blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
                }
            });
        }
    }
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = (coverage * 255.0) as u16;
    if alpha == 0 {
        return;
    }
    let inv = 255 - alpha;
    for c in 0..3 {
        pixel[c] = ((color[c] as u16 * alpha + pixel[c] as u16 * inv) / 255) as u8;
    }
}

fn encode_jpeg(canvas: RgbaImage) -> Result<Vec<u8>, ComposeError> {
    // JPEG carries no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(encoder)
        .map_err(ComposeError::Encode)?;
    Ok(out)
}
