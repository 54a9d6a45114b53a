//! Server configuration from command-line flags and environment variables

use clap::{Parser, ValueEnum};
use label_sheet::ImageEncoding;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Which PDF renderer turns uploads into images
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RasterBackend {
    /// poppler's pdftoppm executable
    Poppler,
    /// PDFium shared library (requires the `pdfium` feature)
    Pdfium,
}

/// Image compression used inside the downloaded PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PdfEncoding {
    Jpeg,
    Flate,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "label-sheet-api",
    about = "Place single-page PDF labels onto a four-slot A4 sheet",
    version
)]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "LABEL_SHEET_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// PDF rasterizer backend
    #[arg(long, env = "LABEL_SHEET_RASTERIZER", value_enum, default_value_t = RasterBackend::Poppler)]
    pub rasterizer: RasterBackend,

    /// pdftoppm executable for the poppler backend
    #[arg(long, env = "PDFTOPPM_PATH", default_value = "pdftoppm")]
    pub pdftoppm: PathBuf,

    /// Directory containing libpdfium for the pdfium backend
    #[arg(long, env = "PDFIUM_LIBRARY_DIR")]
    pub pdfium_dir: Option<PathBuf>,

    /// How the sheet image is stored in the downloaded PDF
    #[arg(long, env = "LABEL_SHEET_PDF_ENCODING", value_enum, default_value_t = PdfEncoding::Jpeg)]
    pub pdf_encoding: PdfEncoding,

    /// JPEG quality (1-100) when --pdf-encoding=jpeg
    #[arg(
        long,
        env = "LABEL_SHEET_JPEG_QUALITY",
        default_value_t = 90,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub jpeg_quality: u8,

    /// Maximum width of preview images in pixels
    #[arg(long, env = "LABEL_SHEET_PREVIEW_WIDTH", default_value_t = 1240)]
    pub preview_width: u32,

    /// Maximum request body size in megabytes
    #[arg(long, env = "LABEL_SHEET_MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn image_encoding(&self) -> ImageEncoding {
        match self.pdf_encoding {
            PdfEncoding::Jpeg => ImageEncoding::Jpeg {
                quality: self.jpeg_quality,
            },
            PdfEncoding::Flate => ImageEncoding::Flate,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["label-sheet-api"]).unwrap();
        assert_eq!(config.rasterizer, RasterBackend::Poppler);
        assert_eq!(config.image_encoding(), ImageEncoding::Jpeg { quality: 90 });
        assert_eq!(config.max_upload_bytes(), 20 * 1024 * 1024);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "label-sheet-api",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--pdf-encoding",
            "flate",
            "--pdftoppm",
            "/opt/poppler/bin/pdftoppm",
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.image_encoding(), ImageEncoding::Flate);
        assert_eq!(config.pdftoppm, PathBuf::from("/opt/poppler/bin/pdftoppm"));
    }

    #[test]
    fn test_jpeg_quality_range() {
        assert!(Config::try_parse_from(["label-sheet-api", "--jpeg-quality", "0"]).is_err());
        assert!(Config::try_parse_from(["label-sheet-api", "--jpeg-quality", "101"]).is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Config::try_parse_from(["label-sheet-api", "--rasterizer", "ghostscript"]).is_err());
    }
}
