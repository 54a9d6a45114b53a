//! Screen-sized PNG previews of a sheet

use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Downscale `image` to at most `max_width` pixels wide, keeping the aspect ratio
pub fn downscale(image: &RgbImage, max_width: u32) -> RgbImage {
    if max_width == 0 || image.width() <= max_width {
        return image.clone();
    }
    let height = (image.height() as u64 * max_width as u64 / image.width() as u64).max(1) as u32;
    imageops::resize(image, max_width, height, FilterType::Triangle)
}

/// PNG bytes of a preview no wider than `max_width`
pub fn render_png(image: &RgbImage, max_width: u32) -> Result<Vec<u8>> {
    let preview = downscale(image, max_width);
    let mut png = Vec::new();
    preview.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_downscale_a4() {
        let sheet = RgbImage::from_pixel(2480, 3508, Rgb([255, 255, 255]));
        let preview = downscale(&sheet, 1240);
        assert_eq!(preview.dimensions(), (1240, 1754));
    }

    #[test]
    fn test_downscale_leaves_small_images() {
        let image = RgbImage::new(100, 50);
        assert_eq!(downscale(&image, 400).dimensions(), (100, 50));
        assert_eq!(downscale(&image, 0).dimensions(), (100, 50));
    }

    #[test]
    fn test_render_png_signature() {
        let image = RgbImage::from_pixel(40, 20, Rgb([1, 2, 3]));
        let png = render_png(&image, 20).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }
}
