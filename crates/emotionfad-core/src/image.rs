//! Decoding of base64 webcam frames.
//!
//! Browsers send frames either as a bare base64 string or as a data URL
//! (`data:image/jpeg;base64,...`). Only the payload after the first comma is
//! decoded. The bytes must carry a known image signature and decode to
//! pixels; the original bytes are what gets forwarded to the model server.

use crate::detector::FaceRegion;
use crate::error::{AnalysisError, AnalysisResult};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};
use std::{fmt, io::Cursor};
use tracing::debug;

/// Default largest accepted decoded frame (16 MiB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Face box color on annotated frames
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Face box line width in pixels
const BOX_THICKNESS: i32 = 2;

/// Image container detected from the leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
}

impl ImageFormat {
    /// Detect the format from a file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'B', b'M', ..] if bytes.len() >= 14 => Some(Self::Bmp),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// A validated, decoded image frame
#[derive(Clone, PartialEq)]
pub struct DecodedFrame {
    bytes: Vec<u8>,
    format: ImageFormat,
    pixels: DynamicImage,
}

impl fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

impl DecodedFrame {
    /// Validate and decode raw image bytes, such as an uploaded file.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::MissingImage`] for an empty buffer
    /// - [`AnalysisError::ImageTooLarge`] when it exceeds `max_bytes`
    /// - [`AnalysisError::UnrecognizedImage`] for an unknown signature or
    ///   bytes that do not decode to pixels
    pub fn from_bytes(bytes: Vec<u8>, max_bytes: usize) -> AnalysisResult<Self> {
        if bytes.is_empty() {
            return Err(AnalysisError::MissingImage);
        }
        if bytes.len() > max_bytes {
            return Err(AnalysisError::ImageTooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        let format = ImageFormat::sniff(&bytes).ok_or(AnalysisError::UnrecognizedImage)?;
        let pixels = image::load_from_memory_with_format(&bytes, format.codec()).map_err(|e| {
            debug!(error = %e, format = %format, "Image bytes did not decode");
            AnalysisError::UnrecognizedImage
        })?;

        Ok(Self {
            bytes,
            format,
            pixels,
        })
    }

    /// Decode a base64 payload or data URL into a frame.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::MissingImage`] for an empty payload
    /// - [`AnalysisError::InvalidBase64`] when no base64 alphabet accepts it
    /// - [`AnalysisError::ImageTooLarge`] when it decodes past `max_bytes`
    /// - [`AnalysisError::UnrecognizedImage`] for an unknown signature or
    ///   undecodable pixels
    pub fn from_base64(payload: &str, max_bytes: usize) -> AnalysisResult<Self> {
        let encoded = strip_data_url(payload);
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(AnalysisError::MissingImage);
        }

        // Cheap upper bound before allocating the decoded buffer
        let estimated = compact.len() / 4 * 3;
        if estimated > max_bytes + 3 {
            return Err(AnalysisError::ImageTooLarge {
                size: estimated,
                limit: max_bytes,
            });
        }

        Self::from_bytes(decode_any(&compact)?, max_bytes)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Pixel width and height
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Re-encode as a `data:` URL for forwarding to the model server
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Draw a box around each face and return the frame as a JPEG data URL.
    ///
    /// Regions with no area are skipped; boxes running past the frame edge
    /// are clipped.
    pub fn annotate<'a>(
        &self,
        regions: impl IntoIterator<Item = &'a FaceRegion>,
    ) -> AnalysisResult<String> {
        let mut canvas: RgbImage = self.pixels.to_rgb8();
        for region in regions {
            draw_face_box(&mut canvas, region);
        }

        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut encoded, image::ImageFormat::Jpeg)
            .map_err(|e| AnalysisError::ImageEncoding {
                message: e.to_string(),
            })?;

        Ok(format!(
            "data:{};base64,{}",
            ImageFormat::Jpeg.mime_type(),
            STANDARD.encode(encoded.into_inner())
        ))
    }
}

fn draw_face_box(canvas: &mut RgbImage, region: &FaceRegion) {
    if region.w <= 0 || region.h <= 0 {
        return;
    }

    // Coordinates are pinned just outside the canvas so oversized boxes clip
    let margin = i64::from(BOX_THICKNESS) + 1;
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let pin_x = |v: i64| v.clamp(-margin, width + margin);
    let pin_y = |v: i64| v.clamp(-margin, height + margin);

    let (left, right) = (pin_x(region.x), pin_x(region.x.saturating_add(region.w)));
    let (top, bottom) = (pin_y(region.y), pin_y(region.y.saturating_add(region.h)));

    // Grow outwards so the face itself stays unpainted
    for inset in 0..i64::from(BOX_THICKNESS) {
        let (w, h) = (right - left + 2 * inset, bottom - top + 2 * inset);
        if w <= 0 || h <= 0 {
            continue;
        }
        let rect = Rect::at((left - inset) as i32, (top - inset) as i32).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    }
}

/// Drop a `data:...;base64,` prefix, keeping everything after the first comma
fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data,
        None => payload,
    }
}

fn decode_any(encoded: &str) -> AnalysisResult<Vec<u8>> {
    match STANDARD.decode(encoded) {
        Ok(bytes) => Ok(bytes),
        Err(first) => STANDARD_NO_PAD
            .decode(encoded)
            .or_else(|_| URL_SAFE.decode(encoded))
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|_| AnalysisError::InvalidBase64(first)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const JPEG_HEADER: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    fn encode(image: RgbImage, format: image::ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut out, format)
            .unwrap();
        out.into_inner()
    }

    fn black_jpeg(width: u32, height: u32) -> Vec<u8> {
        encode(RgbImage::new(width, height), image::ImageFormat::Jpeg)
    }

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(ImageFormat::sniff(&JPEG_HEADER), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"hello world"), None);
        assert_eq!(ImageFormat::sniff(b"BM"), None);
    }

    #[test]
    fn test_decode_png_data_url() {
        let png = encode(RgbImage::new(4, 3), image::ImageFormat::Png);
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(&png));
        let frame = DecodedFrame::from_base64(&payload, DEFAULT_MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame.format(), ImageFormat::Png);
        assert_eq!(frame.dimensions(), (4, 3));
        assert_eq!(frame.bytes(), png.as_slice());
    }

    #[test]
    fn test_decode_bare_unpadded_and_wrapped() {
        let encoded = STANDARD_NO_PAD.encode(black_jpeg(16, 16));
        let wrapped = format!("{}\n{}", &encoded[..4], &encoded[4..]);
        let frame = DecodedFrame::from_base64(&wrapped, DEFAULT_MAX_FRAME_BYTES).unwrap();
        assert_eq!(frame.format(), ImageFormat::Jpeg);
        assert_eq!(frame.dimensions(), (16, 16));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let payload = STANDARD.encode(b"definitely not an image");
        assert!(matches!(
            DecodedFrame::from_base64(&payload, DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::UnrecognizedImage)
        ));
    }

    #[test]
    fn test_decode_rejects_corrupt_pixels_behind_valid_signature() {
        // JFIF header with no frame data
        assert!(matches!(
            DecodedFrame::from_bytes(JPEG_HEADER.to_vec(), DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::UnrecognizedImage)
        ));

        let mut garbage = vec![0xFF, 0xD8, 0xFF];
        garbage.extend_from_slice(b"this is not entropy coded data");
        assert!(matches!(
            DecodedFrame::from_bytes(garbage, DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::UnrecognizedImage)
        ));

        let mut png = PNG_HEADER.to_vec();
        png.extend_from_slice(b"IHDR");
        assert!(matches!(
            DecodedFrame::from_bytes(png, DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::UnrecognizedImage)
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            DecodedFrame::from_base64("***not base64***", DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::InvalidBase64(_))
        ));
        assert!(matches!(
            DecodedFrame::from_base64("data:image/png;base64,", DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::MissingImage)
        ));
        assert!(matches!(
            DecodedFrame::from_bytes(Vec::new(), DEFAULT_MAX_FRAME_BYTES),
            Err(AnalysisError::MissingImage)
        ));
    }

    #[test]
    fn test_decode_enforces_size_limit() {
        let mut bytes = JPEG_HEADER.to_vec();
        bytes.resize(4096, 0);
        let payload = STANDARD.encode(&bytes);
        assert!(matches!(
            DecodedFrame::from_base64(&payload, 1024),
            Err(AnalysisError::ImageTooLarge { limit: 1024, .. })
        ));
        assert!(matches!(
            DecodedFrame::from_bytes(bytes, 1024),
            Err(AnalysisError::ImageTooLarge { size: 4096, .. })
        ));
    }

    #[test]
    fn test_data_url_round_trip_keeps_format() {
        let frame = DecodedFrame::from_bytes(black_jpeg(8, 8), DEFAULT_MAX_FRAME_BYTES).unwrap();
        let url = frame.to_data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let decoded = DecodedFrame::from_base64(&url, DEFAULT_MAX_FRAME_BYTES).unwrap();
        assert_eq!(decoded.bytes(), frame.bytes());
        assert_eq!(decoded.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_annotate_draws_green_box_around_face() {
        let frame = DecodedFrame::from_bytes(black_jpeg(64, 64), DEFAULT_MAX_FRAME_BYTES).unwrap();
        let face = FaceRegion {
            x: 8,
            y: 8,
            w: 16,
            h: 16,
        };

        let url = frame.annotate([&face]).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let annotated = DecodedFrame::from_base64(&url, DEFAULT_MAX_FRAME_BYTES).unwrap();
        assert_eq!(annotated.dimensions(), (64, 64));
        let pixels = annotated.pixels.to_rgb8();

        let edge = pixels.get_pixel(8, 16);
        assert!(edge[1] > 100, "box edge should be green, got {edge:?}");
        assert!(edge[1] > edge[0] + 40, "box edge should be green, got {edge:?}");

        let far = pixels.get_pixel(56, 56);
        assert!(far[1] < 40, "background should stay dark, got {far:?}");
    }

    #[test]
    fn test_annotate_skips_empty_and_clips_oversized_regions() {
        let frame = DecodedFrame::from_bytes(black_jpeg(16, 16), DEFAULT_MAX_FRAME_BYTES).unwrap();
        let regions = [
            FaceRegion { x: 2, y: 2, w: 0, h: 10 },
            FaceRegion { x: -40, y: -40, w: 1_000_000, h: i64::MAX },
            FaceRegion { x: i64::MIN, y: 4, w: 5, h: 5 },
        ];

        let url = frame.annotate(regions.iter()).unwrap();
        let annotated = DecodedFrame::from_base64(&url, DEFAULT_MAX_FRAME_BYTES).unwrap();
        assert_eq!(annotated.dimensions(), (16, 16));
    }
}
