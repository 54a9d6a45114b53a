//! Image XObjects for the composed sheet

use super::compression::compress;
use super::objects::{Dictionary, Object};
use crate::error::{LabelSheetError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// How the sheet raster is stored inside the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum ImageEncoding {
    /// DCTDecode; small files, lossy
    Jpeg { quality: u8 },
    /// FlateDecode of raw RGB; lossless
    Flate,
}

impl Default for ImageEncoding {
    fn default() -> Self {
        ImageEncoding::Jpeg { quality: 90 }
    }
}

/// Color spaces for images
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// An encoded raster ready to be written as an image XObject
#[derive(Debug, Clone)]
pub struct SheetImage {
    data: Vec<u8>,
    filter: &'static str,
    width: u32,
    height: u32,
    color_space: ColorSpace,
    bits_per_component: u8,
}

impl SheetImage {
    /// Encode an RGB raster
    pub fn from_rgb(image: &RgbImage, encoding: ImageEncoding) -> Result<Self> {
        match encoding {
            ImageEncoding::Jpeg { quality } => {
                let mut data = Vec::new();
                JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100))
                    .encode_image(image)?;
                Self::from_jpeg_data(data)
            }
            ImageEncoding::Flate => Ok(Self {
                data: compress(image.as_raw())?,
                filter: "FlateDecode",
                width: image.width(),
                height: image.height(),
                color_space: ColorSpace::DeviceRGB,
                bits_per_component: 8,
            }),
        }
    }

    /// Wrap already encoded JPEG data
    pub fn from_jpeg_data(data: Vec<u8>) -> Result<Self> {
        let (width, height, color_space, bits_per_component) = parse_jpeg_header(&data)?;

        Ok(Self {
            data,
            filter: "DCTDecode",
            width,
            height,
            color_space,
            bits_per_component,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Convert to PDF XObject
    pub fn to_pdf_object(&self) -> Object {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("XObject"));
        dict.set("Subtype", Object::name("Image"));
        dict.set("Width", self.width);
        dict.set("Height", self.height);
        dict.set("ColorSpace", Object::name(self.color_space.pdf_name()));
        dict.set("BitsPerComponent", self.bits_per_component as u32);
        dict.set("Filter", Object::name(self.filter));

        Object::Stream(dict, self.data.clone())
    }
}

/// Read dimensions and component count from the first SOF marker
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace, u8)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(LabelSheetError::Encoding("Not a valid JPEG stream".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(LabelSheetError::Encoding("Invalid JPEG marker".to_string()));
        }

        let marker = data[pos + 1];
        pos += 2;

        match marker {
            // fill byte
            0xFF => pos -= 1,
            // SOF0..SOF15 except DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                if pos + 7 >= data.len() {
                    return Err(LabelSheetError::Encoding("Truncated JPEG stream".to_string()));
                }
                let precision = data[pos + 2];
                let height = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32;
                let width = u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32;
                let color_space = match data[pos + 7] {
                    1 => ColorSpace::DeviceGray,
                    3 => ColorSpace::DeviceRGB,
                    4 => ColorSpace::DeviceCMYK,
                    n => {
                        return Err(LabelSheetError::Encoding(format!(
                            "Unsupported number of components: {n}"
                        )))
                    }
                };
                if width == 0 || height == 0 {
                    break;
                }
                return Ok((width, height, color_space, precision));
            }
            0xD9 => break,
            0xD8 | 0x01 | 0xD0..=0xD7 => {}
            _ => {
                if pos + 1 >= data.len() {
                    return Err(LabelSheetError::Encoding("Truncated JPEG stream".to_string()));
                }
                let length = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
                pos += length;
            }
        }
    }

    Err(LabelSheetError::Encoding(
        "Could not find JPEG dimensions".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_parse_jpeg_header() {
        let jpeg_data = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x11, // length
            0x08, // precision
            0x00, 0x64, // height (100)
            0x00, 0xC8, // width (200)
            0x03, // components
        ];

        let (width, height, color_space, bits) = parse_jpeg_header(&jpeg_data).unwrap();
        assert_eq!(width, 200);
        assert_eq!(height, 100);
        assert_eq!(color_space, ColorSpace::DeviceRGB);
        assert_eq!(bits, 8);
    }

    #[test]
    fn test_invalid_jpeg() {
        assert!(parse_jpeg_header(&[0x00, 0x00]).is_err());
        assert!(parse_jpeg_header(&[0xFF, 0xD8, 0xFF, 0xD9]).is_err());
    }

    #[test]
    fn test_jpeg_encoding_reports_raster_size() {
        let raster = RgbImage::from_pixel(64, 32, Rgb([200, 10, 10]));
        let image = SheetImage::from_rgb(&raster, ImageEncoding::Jpeg { quality: 85 }).unwrap();

        assert_eq!((image.width(), image.height()), (64, 32));
        assert!(image.data().starts_with(&[0xFF, 0xD8]));

        let Object::Stream(dict, _) = image.to_pdf_object() else {
            panic!("image XObject must be a stream");
        };
        assert_eq!(dict.get("Filter").and_then(Object::as_name), Some("DCTDecode"));
        assert_eq!(dict.get("ColorSpace").and_then(Object::as_name), Some("DeviceRGB"));
    }

    #[test]
    fn test_flate_encoding() {
        let raster = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let image = SheetImage::from_rgb(&raster, ImageEncoding::Flate).unwrap();

        let Object::Stream(dict, data) = image.to_pdf_object() else {
            panic!("image XObject must be a stream");
        };
        assert_eq!(dict.get("Filter").and_then(Object::as_name), Some("FlateDecode"));
        assert_eq!(dict.get("Width").and_then(Object::as_integer), Some(10));
        assert_eq!(dict.get("BitsPerComponent").and_then(Object::as_integer), Some(8));
        assert!(data.len() < 300);
    }

    #[test]
    fn test_jpeg_encoding_is_deterministic() {
        let raster = RgbImage::from_fn(50, 50, |x, y| Rgb([x as u8, y as u8, 128]));
        let a = SheetImage::from_rgb(&raster, ImageEncoding::default()).unwrap();
        let b = SheetImage::from_rgb(&raster, ImageEncoding::default()).unwrap();
        assert_eq!(a.data(), b.data());
    }
}
