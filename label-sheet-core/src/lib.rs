//! # label-sheet
//!
//! Compose single-page PDF shipping labels onto a four-up A4 sheet and
//! re-encode the result as a printable PDF.
//!
//! ## Features
//!
//! - **Fixed layout**: four 100 x 150 mm slots on A4, in a 2 x 2 grid
//! - **Rasterization**: labels are rendered at 300 DPI through poppler's
//!   `pdftoppm`, or PDFium with the `pdfium` feature
//! - **Compositing**: labels are shrunk to fit their slot if needed and centered
//! - **PDF output**: the sheet is embedded as a single JPEG or Flate image
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use label_sheet::{
//!     compose_uploads, encode_sheet_pdf, LabelUpload, PdfOptions, PopplerRasterizer,
//!     SheetComposer, Slot,
//! };
//!
//! # fn main() -> label_sheet::Result<()> {
//! let label = std::fs::read("label.pdf")?;
//! let sheet = compose_uploads(
//!     &PopplerRasterizer::default(),
//!     &SheetComposer::default(),
//!     &[LabelUpload::new(Slot::TopRight, label)],
//! )?;
//!
//! let pdf = encode_sheet_pdf(&sheet, &PdfOptions::default())?;
//! std::fs::write("sheet.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod slot;

pub use compose::{ComposedSheet, LabelPlacement, PlacedLabel, SheetComposer};
pub use error::{LabelSheetError, Result};
pub use geometry::{PixelRect, PixelSize};
pub use layout::{SheetLayout, DEFAULT_DPI};
pub use pdf::{encode_image_pdf, encode_sheet_pdf, DocumentInfo, ImageEncoding, PdfOptions};
pub use pipeline::{compose_uploads, LabelUpload};
pub use raster::{validate_pdf, PopplerRasterizer, Rasterizer};
pub use slot::Slot;

#[cfg(feature = "pdfium")]
pub use raster::PdfiumRasterizer;

/// Current version of label-sheet
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.split('.').count() >= 3);
    }
}
