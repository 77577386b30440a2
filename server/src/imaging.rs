//! Image normalization
//!
//! Every uploaded photo is decoded from one of a closed set of source
//! formats into an in-memory `DynamicImage` and re-encoded as lossy WebP at
//! a fixed quality, keeping the original dimensions and any alpha channel.
//! Normalization is pure: bytes in, bytes out. Persisting the result is the
//! caller's job.

use crate::config::WEBP_QUALITY;
use crate::error::{AppError, Result};
use image::{DynamicImage, ImageFormat};

/// Source formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    /// Anything else: the decoder sniffs the bytes
    Unknown,
}

impl SourceFormat {
    /// Resolve a declared content type such as `image/png`
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => SourceFormat::Jpeg,
            "image/png" | "image/x-png" => SourceFormat::Png,
            "image/gif" => SourceFormat::Gif,
            "image/webp" => SourceFormat::WebP,
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => SourceFormat::Bmp,
            _ => SourceFormat::Unknown,
        }
    }

    fn image_format(self) -> Option<ImageFormat> {
        match self {
            SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
            SourceFormat::Png => Some(ImageFormat::Png),
            SourceFormat::Gif => Some(ImageFormat::Gif),
            SourceFormat::WebP => Some(ImageFormat::WebP),
            SourceFormat::Bmp => Some(ImageFormat::Bmp),
            SourceFormat::Unknown => None,
        }
    }
}

/// WebP-encoded photo ready to be stored
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode raw bytes into a pixel buffer
pub fn decode(bytes: &[u8], format: SourceFormat) -> Result<DynamicImage> {
    let decoded = match format.image_format() {
        Some(known) => image::load_from_memory_with_format(bytes, known),
        None => image::load_from_memory(bytes),
    };

    decoded.map_err(|e| AppError::UnsupportedImage(e.to_string()))
}

/// Decode and re-encode as WebP at `WEBP_QUALITY`
pub fn normalize(bytes: &[u8], format: SourceFormat) -> Result<NormalizedImage> {
    let image = decode(bytes, format)?;
    let (width, height) = (image.width(), image.height());

    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, WEBP_QUALITY)
            .map_err(|e| AppError::UnsupportedImage(format!("WebP encoding failed: {:?}", e)))?
            .to_vec()
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, WEBP_QUALITY)
            .map_err(|e| AppError::UnsupportedImage(format!("WebP encoding failed: {:?}", e)))?
            .to_vec()
    };

    tracing::debug!(
        "Normalized {:?} image {}x{} ({} -> {} bytes)",
        format,
        width,
        height,
        bytes.len(),
        encoded.len()
    );

    Ok(NormalizedImage {
        bytes: encoded,
        width,
        height,
    })
}

/// Run `normalize` on the blocking thread pool
pub async fn normalize_blocking(bytes: Vec<u8>, format: SourceFormat) -> Result<NormalizedImage> {
    tokio::task::spawn_blocking(move || normalize(&bytes, format))
        .await
        .map_err(|e| AppError::Generic(format!("Image worker failed: {}", e)))?
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn encode_test_image(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        encode_test_image(DynamicImage::ImageRgb8(image), ImageFormat::Png)
    }

    fn decode_webp(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::WebP).unwrap()
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(SourceFormat::from_mime("image/jpeg"), SourceFormat::Jpeg);
        assert_eq!(SourceFormat::from_mime("IMAGE/PNG"), SourceFormat::Png);
        assert_eq!(SourceFormat::from_mime("image/gif"), SourceFormat::Gif);
        assert_eq!(SourceFormat::from_mime("image/webp"), SourceFormat::WebP);
        assert_eq!(SourceFormat::from_mime("image/bmp"), SourceFormat::Bmp);
        assert_eq!(
            SourceFormat::from_mime("image/png; charset=binary"),
            SourceFormat::Png
        );
        assert_eq!(SourceFormat::from_mime("image/heic"), SourceFormat::Unknown);
    }

    #[test]
    fn test_png_keeps_dimensions() {
        let normalized = normalize(&png_bytes(7, 5), SourceFormat::Png).unwrap();

        assert_eq!((normalized.width, normalized.height), (7, 5));
        assert_eq!(&normalized.bytes[0..4], b"RIFF");
        assert_eq!(&normalized.bytes[8..12], b"WEBP");

        let decoded = decode_webp(&normalized.bytes);
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn test_transparency_preserved() {
        let mut image = RgbaImage::from_pixel(8, 8, Rgba([10, 120, 220, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let source = encode_test_image(DynamicImage::ImageRgba8(image), ImageFormat::Png);

        let normalized = normalize(&source, SourceFormat::Png).unwrap();
        let decoded = decode_webp(&normalized.bytes);

        assert!(decoded.color().has_alpha());
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_other_formats_decode() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([1, 2, 3])));

        for (format, source) in [
            (ImageFormat::Jpeg, SourceFormat::Jpeg),
            (ImageFormat::Bmp, SourceFormat::Bmp),
            (ImageFormat::Gif, SourceFormat::Gif),
        ] {
            let bytes = encode_test_image(rgb.clone(), format);
            let normalized = normalize(&bytes, source).unwrap();
            assert_eq!((normalized.width, normalized.height), (6, 4));
        }
    }

    #[test]
    fn test_unknown_format_is_sniffed() {
        let normalized = normalize(&png_bytes(3, 3), SourceFormat::Unknown).unwrap();
        assert_eq!((normalized.width, normalized.height), (3, 3));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let result = normalize(b"definitely not an image", SourceFormat::Unknown);
        assert!(matches!(result, Err(AppError::UnsupportedImage(_))));

        let result = normalize(b"\x89PNG\r\n\x1a\ntruncated", SourceFormat::Png);
        assert!(matches!(result, Err(AppError::UnsupportedImage(_))));
    }

    #[tokio::test]
    async fn test_normalize_blocking() {
        let normalized = normalize_blocking(png_bytes(2, 2), SourceFormat::Png)
            .await
            .unwrap();
        assert_eq!((normalized.width, normalized.height), (2, 2));
    }
}
