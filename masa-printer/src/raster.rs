//! Monochrome bitmaps for `GS v 0` raster printing

use crate::error::{PrintError, PrintResult};

/// Dots per character column in font A (48 columns = 576 dots on 80mm)
pub const DOTS_PER_COLUMN: u32 = 12;

/// Rows per `GS v 0` block; some printers choke on taller ones
const BAND_ROWS: usize = 256;

/// 1-bit image, rows packed MSB first, a set bit prints black
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl Raster {
    pub fn from_bits(width: u32, height: u32, bits: Vec<u8>) -> PrintResult<Self> {
        let row = width.div_ceil(8) as usize;
        if width == 0 || height == 0 {
            return Err(PrintError::Image("empty bitmap".into()));
        }
        if row > u16::MAX as usize {
            return Err(PrintError::Image(format!("bitmap {width} dots wide")));
        }
        if bits.len() != row * height as usize {
            return Err(PrintError::Image(format!(
                "expected {} bytes for {}x{}, got {}",
                row * height as usize,
                width,
                height,
                bits.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Row blocks of at most [`BAND_ROWS`] rows, with their row count
    pub fn bands(&self) -> impl Iterator<Item = (u16, &[u8])> {
        let row = self.width_bytes();
        self.bits
            .chunks(row * BAND_ROWS)
            .map(move |chunk| ((chunk.len() / row) as u16, chunk))
    }
}

#[cfg(feature = "image")]
impl Raster {
    /// Scale down to `max_width` dots and threshold to black and white
    ///
    /// Transparent pixels are paper; opaque ones print when their luma is
    /// below the midpoint.
    pub fn from_image(img: &image::DynamicImage, max_width: u32) -> PrintResult<Self> {
        use image::GenericImageView;

        let (w, h) = img.dimensions();
        let img = if w > max_width {
            let h = ((u64::from(h) * u64::from(max_width)) / u64::from(w)).max(1) as u32;
            img.resize_exact(max_width, h, image::imageops::FilterType::Triangle)
        } else {
            img.clone()
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let row = width.div_ceil(8) as usize;
        let mut bits = vec![0u8; row * height as usize];

        for (x, y, px) in rgba.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            let luma = (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
            if a >= 128 && luma < 128 {
                bits[y as usize * row + (x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }

        Self::from_bits(width, height, bits)
    }

    /// Decode PNG/JPEG/WebP bytes into a printable bitmap
    pub fn decode(bytes: &[u8], max_width: u32) -> PrintResult<Self> {
        let img = image::load_from_memory(bytes).map_err(|e| PrintError::Image(e.to_string()))?;
        Self::from_image(&img, max_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bits_checks_length() {
        assert!(Raster::from_bits(10, 2, vec![0; 4]).is_ok());
        assert!(Raster::from_bits(10, 2, vec![0; 3]).is_err());
        assert!(Raster::from_bits(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_bands_split_tall_images() {
        let raster = Raster::from_bits(8, 600, vec![0xFF; 600]).unwrap();
        let rows: Vec<u16> = raster.bands().map(|(rows, _)| rows).collect();
        assert_eq!(rows, [256, 256, 88]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_threshold_and_transparency() {
        use image::{DynamicImage, Rgba, RgbaImage};

        // black, white, transparent black, dark grey
        let mut img = RgbaImage::new(4, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(3, 0, Rgba([60, 60, 60, 255]));

        let raster = Raster::from_image(&DynamicImage::ImageRgba8(img), 576).unwrap();
        assert_eq!((raster.width(), raster.height()), (4, 1));
        assert_eq!(raster.bits, [0b1001_0000]);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_wide_images_scaled_to_paper() {
        use image::{DynamicImage, RgbaImage};

        let img = DynamicImage::ImageRgba8(RgbaImage::new(1000, 500));
        let raster = Raster::from_image(&img, 384).unwrap();
        assert_eq!((raster.width(), raster.height()), (384, 192));
        assert_eq!(raster.width_bytes(), 48);
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Raster::decode(b"not an image", 384),
            Err(PrintError::Image(_))
        ));
    }
}
