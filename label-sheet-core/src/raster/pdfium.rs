use super::{page_pixels, validate_pdf, Rasterizer};
use crate::error::{LabelSheetError, Result};
use image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Rasterizer backed by a dynamically loaded PDFium library.
///
/// The library is bound per call so the rasterizer itself stays `Send + Sync`.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Look for libpdfium in `dir` before falling back to the system library
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library())
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| LabelSheetError::Rasterize(format!("failed to load PDFium: {e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn rasterize_first_page(&self, pdf: &[u8], dpi: u32) -> Result<RgbImage> {
        validate_pdf(pdf)?;

        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf, None)
            .map_err(|e| LabelSheetError::InvalidPdf(format!("{e:?}")))?;

        let pages = document.pages();
        let page_count = pages.len();
        if page_count == 0 {
            return Err(LabelSheetError::InvalidPdf(
                "document has no pages".to_string(),
            ));
        }
        if page_count > 1 {
            warn!(page_count, "label has more than one page; using page 1");
        }

        let page = pages
            .get(0)
            .map_err(|e| LabelSheetError::Rasterize(format!("{e:?}")))?;

        let (width, height) =
            page_pixels(page.width().value as f64, page.height().value as f64, dpi)?;
        debug!(width, height, dpi, "rendering page with PDFium");

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_maximum_height(height as i32);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| LabelSheetError::Rasterize(format!("{e:?}")))?;

        let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes()).ok_or_else(|| {
            LabelSheetError::Rasterize(format!("PDFium returned a short {width}x{height} bitmap"))
        })?;
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}
