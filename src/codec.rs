//! JPEG and base64 helpers shared by the converter and the upload path.

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

/// JPEG quality used for the converter's intermediate round-trip.
pub const CONVERSION_JPEG_QUALITY: u8 = 85;

/// JPEG quality used for images sent to the detection service.
pub const UPLOAD_JPEG_QUALITY: u8 = 95;

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(anyhow!("cannot encode an empty image"));
    }
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder.encode_image(image).context("encode jpeg")?;
    Ok(out)
}

pub fn decode_jpeg(bytes: &[u8]) -> Result<RgbImage> {
    let image =
        image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).context("decode jpeg")?;
    Ok(image.into_rgb8())
}

/// Standard-alphabet base64 without line wrapping.
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Encode an inference image the way the detection service expects it.
pub fn encode_for_upload(image: &RgbImage, quality: u8) -> Result<String> {
    let jpeg = encode_jpeg(image, quality)?;
    Ok(encode_base64(&jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn jpeg_round_trip_keeps_dimensions() -> Result<()> {
        let image = RgbImage::from_pixel(17, 9, Rgb([200, 40, 40]));
        let jpeg = encode_jpeg(&image, CONVERSION_JPEG_QUALITY)?;
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = decode_jpeg(&jpeg)?;
        assert_eq!(decoded.dimensions(), (17, 9));
        let px = decoded.get_pixel(8, 4);
        assert!(px[0] > 150 && px[1] < 90 && px[2] < 90);
        Ok(())
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(encode_jpeg(&RgbImage::new(0, 4), 85).is_err());
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(decode_jpeg(b"not a jpeg").is_err());
    }

    #[test]
    fn base64_is_unwrapped_standard_alphabet() {
        let encoded = encode_base64(&[0xFB; 90]);
        assert!(!encoded.contains('\n'));
        assert!(encoded.contains('+') || encoded.contains('/'));
        assert_eq!(encode_base64(b"hi"), "aGk=");
    }
}
