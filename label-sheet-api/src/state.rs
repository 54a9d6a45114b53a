//! Shared, read-only server state

use crate::config::{Config, RasterBackend};
use label_sheet::{
    preview, DocumentInfo, ImageEncoding, PdfOptions, PopplerRasterizer, Rasterizer,
    SheetComposer, SheetLayout, VERSION,
};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_PREVIEW_WIDTH: u32 = 1240;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Everything a handler needs; built once at startup
pub struct AppState {
    pub rasterizer: Arc<dyn Rasterizer>,
    pub composer: SheetComposer,
    pub pdf_options: PdfOptions,
    pub preview_width: u32,
    pub max_upload_bytes: usize,
    /// PNG of the empty template, rendered once
    pub template_png: Vec<u8>,
}

impl AppState {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, layout: SheetLayout) -> label_sheet::Result<Self> {
        let composer = SheetComposer::new(layout);
        let template_png = preview::render_png(&composer.template_guide(), DEFAULT_PREVIEW_WIDTH)?;

        Ok(Self {
            rasterizer,
            composer,
            pdf_options: PdfOptions {
                encoding: ImageEncoding::default(),
                info: DocumentInfo {
                    title: Some("Label sheet".to_string()),
                    producer: Some(format!("label-sheet {VERSION}")),
                },
            },
            preview_width: DEFAULT_PREVIEW_WIDTH,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            template_png,
        })
    }

    pub fn with_encoding(mut self, encoding: ImageEncoding) -> Self {
        self.pdf_options.encoding = encoding;
        self
    }

    /// Also re-renders the template preview at the new width
    pub fn with_preview_width(mut self, width: u32) -> label_sheet::Result<Self> {
        self.preview_width = width;
        self.template_png = preview::render_png(&self.composer.template_guide(), width)?;
        Ok(self)
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Build the state described by the command line
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let rasterizer = build_rasterizer(config)?;
        info!("Using {} rasterizer", rasterizer.name());

        let state = Self::new(rasterizer, SheetLayout::default())?
            .with_encoding(config.image_encoding())
            .with_preview_width(config.preview_width)?
            .with_max_upload_bytes(config.max_upload_bytes());
        Ok(state)
    }
}

fn build_rasterizer(config: &Config) -> anyhow::Result<Arc<dyn Rasterizer>> {
    match config.rasterizer {
        RasterBackend::Poppler => {
            let poppler = PopplerRasterizer::new(&config.pdftoppm);
            if !poppler.is_available() {
                warn!(
                    "{} or {} did not run; label uploads will fail until poppler-utils is installed",
                    poppler.program().display(),
                    poppler.pdfinfo_program().display()
                );
            }
            Ok(Arc::new(poppler))
        }
        RasterBackend::Pdfium => pdfium_rasterizer(config),
    }
}

#[cfg(feature = "pdfium")]
fn pdfium_rasterizer(config: &Config) -> anyhow::Result<Arc<dyn Rasterizer>> {
    let rasterizer = match &config.pdfium_dir {
        Some(dir) => label_sheet::PdfiumRasterizer::with_library_dir(dir),
        None => label_sheet::PdfiumRasterizer::default(),
    };
    Ok(Arc::new(rasterizer))
}

#[cfg(not(feature = "pdfium"))]
fn pdfium_rasterizer(_config: &Config) -> anyhow::Result<Arc<dyn Rasterizer>> {
    anyhow::bail!("the pdfium rasterizer requires building with `--features pdfium`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_config_defaults() {
        let config = Config::try_parse_from(["label-sheet-api", "--pdf-encoding", "flate"]).unwrap();
        let state = AppState::from_config(&config).unwrap();

        assert_eq!(state.rasterizer.name(), "poppler");
        assert_eq!(state.pdf_options.encoding, ImageEncoding::Flate);
        assert_eq!(state.composer.layout().dpi, label_sheet::DEFAULT_DPI);
        assert!(state.template_png.starts_with(b"\x89PNG"));
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn test_pdfium_requires_feature() {
        let config = Config::try_parse_from(["label-sheet-api", "--rasterizer", "pdfium"]).unwrap();
        assert!(AppState::from_config(&config).is_err());
    }
}
