//! Turning an uploaded PDF into a raster label image
//!
//! Two backends are available:
//! - [`PopplerRasterizer`] runs poppler's `pdftoppm` (always built)
//! - `PdfiumRasterizer` links PDFium at runtime (`pdfium` feature)
//!
//! Only the first page of a document is ever rendered.

mod poppler;

#[cfg(feature = "pdfium")]
mod pdfium;

pub use poppler::{PdfInfo, PopplerRasterizer};

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

use crate::error::{LabelSheetError, Result};
use crate::geometry::POINTS_PER_INCH;
use image::RgbImage;

/// How far into the file a `%PDF-` header may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Largest page raster accepted, in pixels (about 13400 x 13400)
pub const MAX_PAGE_PIXELS: u64 = 178_956_970;

/// Renders the first page of a PDF document to an RGB image
pub trait Rasterizer: Send + Sync {
    /// Short backend name used in logs and health output
    fn name(&self) -> &'static str;

    /// Render page 1 of `pdf` at `dpi` dots per inch
    fn rasterize_first_page(&self, pdf: &[u8], dpi: u32) -> Result<RgbImage>;
}

/// Cheap sanity check run before handing bytes to a backend.
///
/// Readers tolerate leading garbage before the header, so the header only has
/// to appear somewhere in the first kilobyte.
pub fn validate_pdf(data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(LabelSheetError::InvalidPdf("upload is empty".to_string()));
    }

    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    if !window.windows(5).any(|w| w == b"%PDF-") {
        return Err(LabelSheetError::InvalidPdf(
            "missing %PDF- header".to_string(),
        ));
    }
    Ok(())
}

/// Pixel size of a `width_pt` x `height_pt` page rendered at `dpi`.
///
/// Pages above [`MAX_PAGE_PIXELS`] are rejected before anything is allocated.
pub fn page_pixels(width_pt: f64, height_pt: f64, dpi: u32) -> Result<(u32, u32)> {
    if !(width_pt > 0.0 && height_pt > 0.0) || !width_pt.is_finite() || !height_pt.is_finite() {
        return Err(LabelSheetError::InvalidPdf(format!(
            "page has no usable size ({width_pt} x {height_pt} pt)"
        )));
    }

    let scale = dpi as f64 / POINTS_PER_INCH;
    let width = (width_pt * scale).ceil().max(1.0);
    let height = (height_pt * scale).ceil().max(1.0);
    if width * height > MAX_PAGE_PIXELS as f64 {
        return Err(LabelSheetError::InvalidPdf(format!(
            "page is too large to render ({width_pt} x {height_pt} pt would be {width} x {height} px at {dpi} DPI)"
        )));
    }
    Ok((width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_pdf_header() {
        assert!(validate_pdf(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").is_ok());
    }

    #[test]
    fn test_validate_accepts_leading_junk() {
        let mut data = vec![b' '; 100];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert!(validate_pdf(&data).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = validate_pdf(b"").unwrap_err();
        assert_eq!(err.to_string(), "Invalid PDF: upload is empty");
    }

    #[test]
    fn test_validate_rejects_other_formats() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(matches!(
            validate_pdf(&png),
            Err(LabelSheetError::InvalidPdf(_))
        ));
    }

    #[test]
    fn test_validate_rejects_late_header() {
        let mut data = vec![0u8; HEADER_SEARCH_WINDOW];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert!(validate_pdf(&data).is_err());
    }

    #[test]
    fn test_page_pixels_for_label() {
        // 100 x 150 mm
        let (width, height) = page_pixels(283.46, 425.2, 300).unwrap();
        assert_eq!((width, height), (1182, 1772));
    }

    #[test]
    fn test_page_pixels_rejects_huge_pages() {
        // 200 x 200 inches
        let err = page_pixels(14400.0, 14400.0, 300).unwrap_err();
        assert!(matches!(err, LabelSheetError::InvalidPdf(_)));
        assert!(err.is_input_error());
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_page_pixels_rejects_degenerate_pages() {
        assert!(page_pixels(0.0, 842.0, 300).is_err());
        assert!(page_pixels(595.0, f64::NAN, 300).is_err());
        assert!(page_pixels(-10.0, 842.0, 300).is_err());
    }
}
