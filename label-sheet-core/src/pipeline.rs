//! Upload to composed sheet in one call

use crate::compose::{ComposedSheet, PlacedLabel, SheetComposer};
use crate::error::{LabelSheetError, Result};
use crate::raster::Rasterizer;
use crate::slot::Slot;
use std::collections::HashSet;
use tracing::info;

/// An uploaded label PDF and the slot it should go into
#[derive(Debug, Clone)]
pub struct LabelUpload {
    pub slot: Slot,
    pub pdf: Vec<u8>,
}

impl LabelUpload {
    pub fn new(slot: Slot, pdf: impl Into<Vec<u8>>) -> Self {
        Self {
            slot,
            pdf: pdf.into(),
        }
    }
}

/// Rasterize every upload and compose them onto one sheet.
///
/// Slot assignments are checked before any rendering starts.
pub fn compose_uploads(
    rasterizer: &dyn Rasterizer,
    composer: &SheetComposer,
    uploads: &[LabelUpload],
) -> Result<ComposedSheet> {
    if uploads.is_empty() {
        return Err(LabelSheetError::NoLabels);
    }
    if uploads.len() > Slot::ALL.len() {
        return Err(LabelSheetError::TooManyLabels(uploads.len()));
    }
    let mut seen = HashSet::new();
    for upload in uploads {
        if !seen.insert(upload.slot) {
            return Err(LabelSheetError::DuplicateSlot(upload.slot.number()));
        }
    }

    let dpi = composer.layout().dpi;
    let mut labels = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let image = rasterizer.rasterize_first_page(&upload.pdf, dpi)?;
        info!(
            slot = %upload.slot,
            width = image.width(),
            height = image.height(),
            backend = rasterizer.name(),
            "rasterized label"
        );
        labels.push(PlacedLabel::new(upload.slot, image));
    }

    composer.compose(labels)
}
