use super::{page_pixels, validate_pdf, Rasterizer};
use crate::error::{LabelSheetError, Result};
use image::RgbImage;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// poppler tools exit with 1 when the input cannot be opened as a PDF
const EXIT_BAD_INPUT: i32 = 1;

const PDFINFO: &str = "pdfinfo";

/// Page count and first-page size as reported by `pdfinfo`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfInfo {
    pub pages: u32,
    /// Width and height of page 1 in points
    pub page_size: (f64, f64),
}

impl PdfInfo {
    /// Parse the `Key: value` report printed by `pdfinfo`
    pub fn parse(report: &str) -> Result<Self> {
        let mut pages = None;
        let mut page_size = None;

        for line in report.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "Pages" => pages = value.trim().parse::<u32>().ok(),
                // "612 x 792 pts (letter)"
                "Page size" => {
                    let mut parts = value.split_whitespace();
                    let width = parts.next().and_then(|w| w.parse::<f64>().ok());
                    let height = parts.nth(1).and_then(|h| h.parse::<f64>().ok());
                    if let (Some(width), Some(height)) = (width, height) {
                        page_size = Some((width, height));
                    }
                }
                _ => {}
            }
        }

        match (pages, page_size) {
            (Some(pages), Some(page_size)) if pages > 0 => Ok(Self { pages, page_size }),
            (Some(0), _) => Err(LabelSheetError::InvalidPdf(
                "document has no pages".to_string(),
            )),
            _ => Err(LabelSheetError::Rasterize(
                "could not read page count and size from pdfinfo".to_string(),
            )),
        }
    }
}

/// Rasterizer backed by poppler's `pdftoppm`, with `pdfinfo` checking the
/// page first
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    program: PathBuf,
    pdfinfo: PathBuf,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PopplerRasterizer {
    /// Use the given `pdftoppm` executable (a bare name is looked up on `PATH`).
    ///
    /// `pdfinfo` is expected next to it.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let pdfinfo = match program.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(PDFINFO),
            _ => PathBuf::from(PDFINFO),
        };
        Self { program, pdfinfo }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn pdfinfo_program(&self) -> &Path {
        &self.pdfinfo
    }

    /// Whether both executables can be started at all
    pub fn is_available(&self) -> bool {
        [&self.program, &self.pdfinfo]
            .into_iter()
            .all(|program| Command::new(program).arg("-v").output().is_ok())
    }
}

impl Rasterizer for PopplerRasterizer {
    fn name(&self) -> &'static str {
        "poppler"
    }

    fn rasterize_first_page(&self, pdf: &[u8], dpi: u32) -> Result<RgbImage> {
        validate_pdf(pdf)?;

        let workdir = tempfile::Builder::new().prefix("label-sheet-").tempdir()?;
        let input = workdir.path().join("label.pdf");
        std::fs::write(&input, pdf)?;

        let info = PdfInfo::parse(&run(&self.pdfinfo, Command::new(&self.pdfinfo).arg(&input))?)?;
        if info.pages > 1 {
            warn!(page_count = info.pages, "label has more than one page; using page 1");
        }
        let (width, height) = page_pixels(info.page_size.0, info.page_size.1, dpi)?;

        // -singlefile writes <prefix>.png without a page number suffix
        let prefix = workdir.path().join("page");
        debug!(program = %self.program.display(), dpi, width, height, "running pdftoppm");

        run(
            &self.program,
            Command::new(&self.program)
                .arg("-png")
                .arg("-r")
                .arg(dpi.to_string())
                .args(["-f", "1", "-l", "1", "-singlefile"])
                .arg(&input)
                .arg(&prefix),
        )?;

        let rendered = image::open(prefix.with_extension("png"))?;
        Ok(rendered.to_rgb8())
    }
}

/// Run a poppler tool and return its stdout
fn run(program: &Path, command: &mut Command) -> Result<String> {
    let output = command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => LabelSheetError::Rasterize(format!(
            "{} not found; install poppler-utils",
            program.display()
        )),
        _ => LabelSheetError::Io(e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(match output.status.code() {
            Some(EXIT_BAD_INPUT) => LabelSheetError::InvalidPdf(stderr),
            code => LabelSheetError::Rasterize(format!(
                "{} exited with {code:?}: {stderr}",
                program.display()
            )),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program() {
        assert_eq!(
            PopplerRasterizer::default().program(),
            Path::new("pdftoppm")
        );
    }

    #[test]
    fn test_pdfinfo_found_next_to_pdftoppm() {
        let rasterizer = PopplerRasterizer::new("/opt/poppler/bin/pdftoppm");
        assert_eq!(
            rasterizer.pdfinfo_program(),
            Path::new("/opt/poppler/bin/pdfinfo")
        );
        assert_eq!(
            PopplerRasterizer::default().pdfinfo_program(),
            Path::new("pdfinfo")
        );
    }

    #[test]
    fn test_parse_pdfinfo_report() {
        let report = "\
Producer:        label-sheet 0.1.0
Tagged:          no
Pages:           3
Encrypted:       no
Page size:       283.46 x 425.2 pts
Page rot:        0
PDF version:     1.7
";
        let info = PdfInfo::parse(report).unwrap();
        assert_eq!(info.pages, 3);
        assert_eq!(info.page_size, (283.46, 425.2));
    }

    #[test]
    fn test_parse_pdfinfo_named_size() {
        let info = PdfInfo::parse("Pages: 1\nPage size: 612 x 792 pts (letter)\n").unwrap();
        assert_eq!(info, PdfInfo { pages: 1, page_size: (612.0, 792.0) });
    }

    #[test]
    fn test_parse_pdfinfo_without_pages() {
        let err = PdfInfo::parse("Pages: 0\nPage size: 612 x 792 pts\n").unwrap_err();
        assert!(matches!(err, LabelSheetError::InvalidPdf(_)));

        let err = PdfInfo::parse("Syntax Error: garbage\n").unwrap_err();
        assert!(matches!(err, LabelSheetError::Rasterize(_)));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let rasterizer = PopplerRasterizer::new("/nonexistent/bin/pdftoppm");
        assert!(!rasterizer.is_available());

        let err = rasterizer
            .rasterize_first_page(b"%PDF-1.4\n", 300)
            .unwrap_err();
        match err {
            LabelSheetError::Rasterize(msg) => assert!(msg.contains("not found")),
            other => panic!("Expected Rasterize error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_non_pdf_before_spawning() {
        let rasterizer = PopplerRasterizer::new("/nonexistent/bin/pdftoppm");
        let err = rasterizer
            .rasterize_first_page(b"GIF89a", 300)
            .unwrap_err();
        assert!(matches!(err, LabelSheetError::InvalidPdf(_)));
    }
}
