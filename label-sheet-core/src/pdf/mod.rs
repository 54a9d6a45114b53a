//! Encoding a composed sheet as a printable single-page PDF

mod compression;
mod image;
mod objects;
mod writer;

pub use self::image::{ImageEncoding, SheetImage};
pub use objects::{Dictionary, Object, ObjectId};
pub use writer::{DocumentInfo, PdfWriter};

use crate::compose::ComposedSheet;
use crate::error::Result;
use crate::geometry::px_to_pt;
use ::image::RgbImage;

/// Output settings for [`encode_sheet_pdf`]
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    pub encoding: ImageEncoding,
    pub info: DocumentInfo,
}

/// Encode a raster as a one-page PDF whose physical size follows from `dpi`
pub fn encode_image_pdf(image: &RgbImage, dpi: u32, options: &PdfOptions) -> Result<Vec<u8>> {
    let page_size = (px_to_pt(image.width(), dpi), px_to_pt(image.height(), dpi));
    let sheet_image = SheetImage::from_rgb(image, options.encoding)?;

    let mut pdf = Vec::new();
    PdfWriter::new_with_writer(&mut pdf).write_image_page(&sheet_image, page_size, &options.info)?;
    Ok(pdf)
}

/// Encode a composed sheet at its own resolution
pub fn encode_sheet_pdf(sheet: &ComposedSheet, options: &PdfOptions) -> Result<Vec<u8>> {
    encode_image_pdf(&sheet.image, sheet.dpi, options)
}
