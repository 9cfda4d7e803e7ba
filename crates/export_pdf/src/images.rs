//! Image decoding for logos, signatures, coupons and ticket annexes

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ImageError;

/// An image flattened to 8-bit RGB, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width_px: u32,
    pub height_px: u32,
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    pub fn aspect_ratio(&self) -> f32 {
        self.width_px as f32 / self.height_px as f32
    }
}

/// Splits a `data:<mime>;base64,<payload>` URL into its payload bytes
pub fn data_url_bytes(data_url: &str) -> Result<Vec<u8>, ImageError> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or(ImageError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(ImageError::InvalidDataUrl);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Decodes a data URL; transparent pixels are composited onto white
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, ImageError> {
    let bytes = data_url_bytes(data_url)?;
    decode_bytes(&bytes)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width_px, height_px) = rgba.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(ImageError::Empty);
    }

    let mut rgb = Vec::with_capacity((width_px * height_px * 3) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }

    Ok(DecodedImage {
        width_px,
        height_px,
        rgb,
    })
}

/// Largest size with the image's aspect ratio that fits in the box
pub fn fit(image: &DecodedImage, max_width: f32, max_height: f32) -> (f32, f32) {
    let aspect = image.aspect_ratio();
    let mut width = max_width;
    let mut height = width / aspect;
    if height > max_height {
        height = max_height;
        width = height * aspect;
    }
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width_px: u32, height_px: u32) -> DecodedImage {
        DecodedImage {
            width_px,
            height_px,
            rgb: vec![0; (width_px * height_px * 3) as usize],
        }
    }

    #[test]
    fn test_rejects_non_data_urls() {
        assert!(matches!(
            decode_data_url("https://example.com/logo.png"),
            Err(ImageError::InvalidDataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png,raw"),
            Err(ImageError::InvalidDataUrl)
        ));
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(ImageError::Base64(_))
        ));
    }

    #[test]
    fn test_rejects_undecodable_bytes() {
        // "abc" is valid base64 payload but not an image
        assert!(matches!(
            decode_data_url("data:image/png;base64,YWJj"),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        let (w, h) = fit(&solid(400, 100), 28.0, 20.0);
        assert!((w - 28.0).abs() < 1e-4);
        assert!((h - 7.0).abs() < 1e-4);

        let (w, h) = fit(&solid(100, 400), 28.0, 20.0);
        assert!((h - 20.0).abs() < 1e-4);
        assert!((w - 5.0).abs() < 1e-4);
    }
}
