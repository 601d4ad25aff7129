//! Display image conversion.
//!
//! The RT100 screen takes a 162x173 picture as RGB565, big endian, sent in
//! the panel's scan order: the source is flipped vertically and turned 90
//! degrees clockwise, giving 162 rows of 173 pixels on the wire.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::ValidationError;

/// Logical display width
pub const DISPLAY_WIDTH: u32 = 162;
/// Logical display height
pub const DISPLAY_HEIGHT: u32 = 173;
/// Pixels per frame
pub const PIXEL_COUNT: usize = (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize;
/// Serialized size in bytes
pub const BITMAP_BYTES: usize = PIXEL_COUNT * 2;

/// Pack an 8-bit RGB triple into RGB565 by truncation
pub fn rgb565_encode(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Expand RGB565 back to 8 bits per channel, replicating the high bits
pub fn rgb565_decode(pixel: u16) -> (u8, u8, u8) {
    let r = ((pixel & 0xF800) >> 8) as u8;
    let g = ((pixel & 0x07E0) >> 3) as u8;
    let b = ((pixel & 0x001F) << 3) as u8;
    (r | (r >> 5), g | (g >> 6), b | (b >> 5))
}

/// Display-ready picture in device scan order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pixels: Vec<u16>,
}

impl Bitmap {
    /// Wrap pixels already in device scan order
    pub fn from_rgb565(pixels: Vec<u16>) -> Result<Self, ValidationError> {
        if pixels.len() != PIXEL_COUNT {
            return Err(ValidationError::WrongResolution {
                got: pixels.len() * 2,
                expected: BITMAP_BYTES,
            });
        }
        Ok(Self { pixels })
    }

    /// Wrap serialized big-endian bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != BITMAP_BYTES {
            return Err(ValidationError::WrongResolution {
                got: bytes.len(),
                expected: BITMAP_BYTES,
            });
        }
        let pixels = bytes
            .chunks_exact(2)
            .map(|p| u16::from_be_bytes([p[0], p[1]]))
            .collect();
        Ok(Self { pixels })
    }

    /// A single-color picture
    pub fn solid(r: u8, g: u8, b: u8) -> Self {
        Self {
            pixels: vec![rgb565_encode(r, g, b); PIXEL_COUNT],
        }
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Serialize as big-endian RGB565
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }

    /// Undo the scan-order transform for previewing what the display shows
    pub fn to_image(&self) -> RgbImage {
        // Flip + clockwise turn is a transpose, so is its inverse
        RgbImage::from_fn(DISPLAY_WIDTH, DISPLAY_HEIGHT, |x, y| {
            let (r, g, b) = rgb565_decode(self.pixels[(x * DISPLAY_HEIGHT + y) as usize]);
            image::Rgb([r, g, b])
        })
    }
}

/// Convert any picture to a display bitmap.
///
/// Scales to cover the display while keeping the aspect ratio, crops the
/// overflow around the center, rotates into scan order and truncates to
/// RGB565 (no dithering).
pub fn convert(img: &DynamicImage) -> Bitmap {
    convert_with_filter(img, FilterType::Lanczos3)
}

pub fn convert_with_filter(img: &DynamicImage, filter: FilterType) -> Bitmap {
    let fitted = img.resize_to_fill(DISPLAY_WIDTH, DISPLAY_HEIGHT, filter);
    let scan = fitted.flipv().rotate90().to_rgb8();
    debug_assert_eq!(scan.dimensions(), (DISPLAY_HEIGHT, DISPLAY_WIDTH));

    let pixels = scan
        .pixels()
        .map(|p| rgb565_encode(p[0], p[1], p[2]))
        .collect();
    Bitmap { pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565() {
        assert_eq!(rgb565_encode(255, 255, 255), 0xFFFF);
        assert_eq!(rgb565_encode(255, 0, 0), 0xF800);
        assert_eq!(rgb565_encode(0, 255, 0), 0x07E0);
        assert_eq!(rgb565_encode(0, 0, 255), 0x001F);
        // Low bits are dropped, not rounded
        assert_eq!(rgb565_encode(7, 3, 7), 0);
        assert_eq!(rgb565_decode(0xFFFF), (255, 255, 255));
        assert_eq!(rgb565_decode(0xF800), (255, 0, 0));
    }

    #[test]
    fn test_convert_full_hd() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            1920,
            1080,
            image::Rgb([10, 200, 30]),
        ));
        let bmp = convert(&src);
        assert_eq!(bmp.len(), PIXEL_COUNT);
        assert_eq!(bmp.to_bytes().len(), BITMAP_BYTES);
        assert!(bmp.pixels().iter().all(|&p| p == rgb565_encode(10, 200, 30)));
    }

    #[test]
    fn test_convert_tiny_source() {
        let src = DynamicImage::ImageRgb8(RgbImage::new(3, 2));
        assert_eq!(convert(&src).len(), PIXEL_COUNT);
    }

    #[test]
    fn test_scan_order() {
        // Top-left stays first; top-right moves to the start of the last row
        let mut src = RgbImage::from_pixel(DISPLAY_WIDTH, DISPLAY_HEIGHT, image::Rgb([0, 0, 0]));
        src.put_pixel(0, 0, image::Rgb([255, 255, 255]));
        src.put_pixel(DISPLAY_WIDTH - 1, 0, image::Rgb([255, 255, 255]));
        let bmp = convert_with_filter(&DynamicImage::ImageRgb8(src.clone()), FilterType::Nearest);

        let white: Vec<usize> = bmp
            .pixels()
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == 0xFFFF)
            .map(|(i, _)| i)
            .collect();
        let last_row = (DISPLAY_WIDTH as usize - 1) * DISPLAY_HEIGHT as usize;
        assert_eq!(white, vec![0, last_row]);

        let preview = bmp.to_image();
        assert_eq!(preview.dimensions(), (DISPLAY_WIDTH, DISPLAY_HEIGHT));
        assert_eq!(preview, src);
    }

    #[test]
    fn test_wrong_resolution() {
        assert!(matches!(
            Bitmap::from_rgb565(vec![0; 10]),
            Err(ValidationError::WrongResolution { got: 20, .. })
        ));
        assert!(Bitmap::from_bytes(&vec![0; BITMAP_BYTES]).is_ok());
        assert!(Bitmap::from_bytes(&[0; 3]).is_err());
    }
}
