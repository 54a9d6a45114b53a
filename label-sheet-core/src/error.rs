use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelSheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Invalid slot: {0} (expected 1-4)")]
    InvalidSlot(String),

    #[error("Slot {0} already holds a label")]
    DuplicateSlot(u8),

    #[error("Too many labels: {0} (a sheet holds at most 4)")]
    TooManyLabels(usize),

    #[error("No label to place")]
    NoLabels,

    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, LabelSheetError>;

impl LabelSheetError {
    /// Whether the error was caused by the uploaded input rather than the server.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LabelSheetError::InvalidPdf(_)
                | LabelSheetError::InvalidSlot(_)
                | LabelSheetError::DuplicateSlot(_)
                | LabelSheetError::TooManyLabels(_)
                | LabelSheetError::NoLabels
        )
    }
}
