//! Image processing for uploaded media.
//!
//! Images are re-encoded into responsive JPEG variants and, for paid
//! content, a heavily blurred preview. Videos pass through untouched.

use image::{DynamicImage, GenericImageView, codecs::jpeg::JpegEncoder, imageops::FilterType};
use serde::{Deserialize, Serialize};

use galeria_common::{AppError, AppResult};

/// Responsive variant widths, smallest first.
pub const RESPONSIVE_WIDTHS: [u32; 3] = [300, 600, 1200];

/// Width of the blurred preview.
pub const BLUR_WIDTH: u32 = 200;

/// Gaussian sigma of the blurred preview.
pub const BLUR_SIGMA: f32 = 20.0;

const JPEG_QUALITY: u8 = 82;
const BLURHASH_COMPONENTS: (u32, u32) = (4, 3);
const BLURHASH_SAMPLE_WIDTH: u32 = 32;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::WebP),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Whether a content type denotes a video.
#[must_use]
pub fn is_video(content_type: &str) -> bool {
    content_type.starts_with("video/")
}

/// One re-encoded width of an image.
#[derive(Debug, Clone)]
pub struct ImageVariant {
    pub width: u32,
    pub data: Vec<u8>,
}

/// Everything derived from an uploaded image.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub width: u32,
    pub height: u32,
    /// Variants no wider than the source, smallest first.
    pub variants: Vec<ImageVariant>,
    /// Blurred JPEG preview, only produced for paid content.
    pub blur: Option<Vec<u8>>,
    pub blurhash: Option<String>,
}

/// Decode and process an image on the blocking pool.
pub async fn process_image(data: Vec<u8>, paid: bool) -> AppResult<ProcessedImage> {
    tokio::task::spawn_blocking(move || process_image_sync(&data, paid))
        .await
        .map_err(|e| AppError::Internal(format!("Image task failed: {e}")))?
}

/// Decode and process an image.
pub fn process_image_sync(data: &[u8], paid: bool) -> AppResult<ProcessedImage> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::BadRequest(format!("Invalid image: {e}")))?;
    let (width, height) = img.dimensions();

    let variants = RESPONSIVE_WIDTHS
        .iter()
        .filter(|&&w| w <= width)
        .map(|&w| {
            Ok(ImageVariant {
                width: w,
                data: encode_jpeg(&resize_to_width(&img, w))?,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let blur = if paid {
        Some(blurred_preview(&img)?)
    } else {
        None
    };

    let blurhash = match compute_blurhash(&img) {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to compute blurhash");
            None
        }
    };

    Ok(ProcessedImage {
        width,
        height,
        variants,
        blur,
        blurhash,
    })
}

/// Resize to `target` pixels wide, keeping the aspect ratio. Never enlarges.
fn resize_to_width(img: &DynamicImage, target: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if target >= width {
        return img.clone();
    }
    let new_height = ((f64::from(height) * f64::from(target)) / f64::from(width)).round() as u32;
    img.resize_exact(target, new_height.max(1), FilterType::Lanczos3)
}

/// Downscale to the preview width and blur.
fn blurred_preview(img: &DynamicImage) -> AppResult<Vec<u8>> {
    let small = resize_to_width(img, BLUR_WIDTH);
    encode_jpeg(&small.blur(BLUR_SIGMA))
}

fn encode_jpeg(img: &DynamicImage) -> AppResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))
        .map_err(|e| AppError::Internal(format!("Failed to encode JPEG: {e}")))?;
    Ok(buf)
}

fn compute_blurhash(img: &DynamicImage) -> AppResult<String> {
    let sample = resize_to_width(img, BLURHASH_SAMPLE_WIDTH).to_rgba8();
    let (w, h) = sample.dimensions();
    blurhash::encode(
        BLURHASH_COMPONENTS.0,
        BLURHASH_COMPONENTS.1,
        w,
        h,
        sample.as_raw(),
    )
    .map_err(|e| AppError::Internal(format!("Failed to compute blurhash: {e:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat as Codec, Rgb, RgbImage};
    use std::io::Cursor;

    /// A PNG of the given size.
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, Codec::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_variants_never_enlarge() {
        let processed = process_image_sync(&png(700, 350), false).unwrap();

        let widths: Vec<u32> = processed.variants.iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![300, 600]);
        assert!(processed.blur.is_none());
        assert!(processed.blurhash.is_some());
    }

    #[test]
    fn test_variant_keeps_aspect_ratio() {
        let img = image::load_from_memory(&png(600, 400)).unwrap();
        let resized = resize_to_width(&img, 300);
        assert_eq!(resized.dimensions(), (300, 200));
    }

    #[test]
    fn test_paid_image_gets_blur_preview() {
        let processed = process_image_sync(&png(400, 300), true).unwrap();

        let blur = image::load_from_memory(&processed.blur.unwrap()).unwrap();
        assert_eq!(blur.width(), BLUR_WIDTH);
    }

    #[test]
    fn test_invalid_image_is_bad_request() {
        let err = process_image_sync(b"not an image", false).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_is_video() {
        assert!(is_video("video/mp4"));
        assert!(!is_video("image/png"));
        assert_eq!(ImageFormat::from_mime_type("image/jpg"), Some(ImageFormat::Jpeg));
    }
}
