//! Placing rasterized labels onto the sheet canvas

use crate::error::{LabelSheetError, Result};
use crate::geometry::{PixelRect, PixelSize};
use crate::layout::SheetLayout;
use crate::slot::Slot;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::Serialize;
use tracing::debug;

/// Sheet background
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Slot outline colour on the reference template
const GUIDE_COLOR: Rgb<u8> = Rgb([190, 190, 190]);

/// A label image waiting to be placed
#[derive(Debug, Clone)]
pub struct PlacedLabel {
    pub slot: Slot,
    pub image: RgbImage,
}

impl PlacedLabel {
    pub fn new(slot: Slot, image: RgbImage) -> Self {
        Self { slot, image }
    }
}

/// Where a label ended up on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelPlacement {
    pub slot: Slot,
    /// Area covered by the (possibly downscaled) label, before clipping to the sheet
    pub rect: PixelRect,
}

/// Result of a composition
#[derive(Debug, Clone)]
pub struct ComposedSheet {
    pub image: RgbImage,
    pub placements: Vec<LabelPlacement>,
    pub dpi: u32,
}

/// Shrink `image` to fit inside `bounds`, keeping its aspect ratio.
///
/// Images that already fit are returned untouched; nothing is ever enlarged.
pub fn fit_within(image: RgbImage, bounds: PixelSize) -> RgbImage {
    let size = PixelSize::new(image.width(), image.height());
    if bounds.contains(size) {
        return image;
    }

    let scale = (bounds.width as f64 / size.width as f64)
        .min(bounds.height as f64 / size.height as f64);
    let width = ((size.width as f64 * scale).round() as u32).clamp(1, bounds.width);
    let height = ((size.height as f64 * scale).round() as u32).clamp(1, bounds.height);

    imageops::resize(&image, width, height, FilterType::Lanczos3)
}

/// Top-left corner that centers a label of `label` size inside `slot`
pub fn centered_offset(slot: PixelRect, label: PixelSize) -> (u32, u32) {
    (
        slot.x + slot.width.saturating_sub(label.width) / 2,
        slot.y + slot.height.saturating_sub(label.height) / 2,
    )
}

/// Composes labels onto a sheet following a [`SheetLayout`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetComposer {
    layout: SheetLayout,
}

impl SheetComposer {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Empty white sheet
    pub fn blank_sheet(&self) -> RgbImage {
        let size = self.layout.sheet_size();
        RgbImage::from_pixel(size.width, size.height, WHITE)
    }

    /// Blank sheet with the slot boundaries outlined, for reference previews
    pub fn template_guide(&self) -> RgbImage {
        let mut sheet = self.blank_sheet();
        // roughly half a millimetre
        let thickness = (self.layout.dpi / 50).max(1);
        for (_, rect) in self.layout.slot_rects() {
            draw_outline(&mut sheet, rect, thickness, GUIDE_COLOR);
        }
        sheet
    }

    /// Place a single label
    pub fn compose_one(&self, slot: Slot, image: RgbImage) -> Result<ComposedSheet> {
        self.compose(vec![PlacedLabel::new(slot, image)])
    }

    /// Paste every label, scaled down to the slot size if needed, centered in
    /// its slot. Parts reaching past the sheet edge are clipped.
    pub fn compose(&self, labels: Vec<PlacedLabel>) -> Result<ComposedSheet> {
        if labels.is_empty() {
            return Err(LabelSheetError::NoLabels);
        }
        if labels.len() > Slot::ALL.len() {
            return Err(LabelSheetError::TooManyLabels(labels.len()));
        }

        let mut taken = [false; 4];
        for label in &labels {
            if std::mem::replace(&mut taken[label.slot.index()], true) {
                return Err(LabelSheetError::DuplicateSlot(label.slot.number()));
            }
            if label.image.width() == 0 || label.image.height() == 0 {
                return Err(LabelSheetError::InvalidPdf(
                    "label page rendered to an empty image".to_string(),
                ));
            }
        }

        let slot_size = self.layout.slot_size();
        let mut sheet = self.blank_sheet();
        let mut placements = Vec::with_capacity(labels.len());

        for PlacedLabel { slot, image } in labels {
            let original = PixelSize::new(image.width(), image.height());
            let fitted = fit_within(image, slot_size);
            let size = PixelSize::new(fitted.width(), fitted.height());
            let (x, y) = centered_offset(self.layout.slot_rect(slot), size);

            debug!(
                %slot,
                from = ?original,
                to = ?size,
                x,
                y,
                "placing label"
            );
            imageops::replace(&mut sheet, &fitted, x as i64, y as i64);

            placements.push(LabelPlacement {
                slot,
                rect: PixelRect::new(x, y, size.width, size.height),
            });
        }

        Ok(ComposedSheet {
            image: sheet,
            placements,
            dpi: self.layout.dpi,
        })
    }
}

/// Draw a rectangle border of the given thickness, clipped to the image
fn draw_outline(image: &mut RgbImage, rect: PixelRect, thickness: u32, color: Rgb<u8>) {
    let bounds = PixelRect::from_size(PixelSize::new(image.width(), image.height()));
    let Some(visible) = rect.intersection(&bounds) else {
        return;
    };

    for y in visible.y..visible.bottom() {
        for x in visible.x..visible.right() {
            let on_border = x < rect.x + thickness
                || x + thickness >= rect.right()
                || y < rect.y + thickness
                || y + thickness >= rect.bottom();
            if on_border {
                image.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([20, 40, 60]))
    }

    fn small_composer() -> SheetComposer {
        SheetComposer::new(SheetLayout::default().with_dpi(30))
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let image = solid(50, 80);
        let fitted = fit_within(image.clone(), PixelSize::new(100, 100));
        assert_eq!(fitted, image);
    }

    #[test]
    fn test_fit_within_preserves_aspect_ratio() {
        let fitted = fit_within(solid(400, 200), PixelSize::new(100, 150));
        assert_eq!(fitted.dimensions(), (100, 50));

        let fitted = fit_within(solid(200, 600), PixelSize::new(100, 150));
        assert_eq!(fitted.dimensions(), (50, 150));
    }

    #[test]
    fn test_fit_within_never_collapses_to_zero() {
        let fitted = fit_within(solid(10_000, 1), PixelSize::new(100, 100));
        assert_eq!(fitted.dimensions(), (100, 1));
    }

    #[test]
    fn test_centered_offset() {
        let slot = PixelRect::new(59, 59, 1181, 1772);
        assert_eq!(centered_offset(slot, PixelSize::new(1181, 1772)), (59, 59));
        assert_eq!(centered_offset(slot, PixelSize::new(1000, 1772)), (149, 59));
        assert_eq!(centered_offset(slot, PixelSize::new(1181, 1000)), (59, 445));
    }

    #[test]
    fn test_blank_sheet_is_white() {
        let composer = small_composer();
        let sheet = composer.blank_sheet();
        assert_eq!(sheet.dimensions(), (248, 351));
        assert!(sheet.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_template_guide_outlines_slots() {
        let composer = small_composer();
        let guide = composer.template_guide();
        let rect = composer.layout().slot_rect(Slot::TopLeft);

        assert_eq!(*guide.get_pixel(rect.x, rect.y), GUIDE_COLOR);
        assert_eq!(*guide.get_pixel(rect.right() - 1, rect.y + 10), GUIDE_COLOR);
        // interior and margins stay white
        assert_eq!(*guide.get_pixel(rect.x + 20, rect.y + 20), WHITE);
        assert_eq!(*guide.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_compose_places_label_in_slot() {
        let composer = small_composer();
        let slot_rect = composer.layout().slot_rect(Slot::TopRight);
        let composed = composer.compose_one(Slot::TopRight, solid(50, 60)).unwrap();

        let placement = composed.placements[0];
        assert_eq!(placement.slot, Slot::TopRight);
        assert!(slot_rect.contains_rect(&placement.rect));
        assert_eq!(
            *composed.image.get_pixel(placement.rect.x, placement.rect.y),
            Rgb([20, 40, 60])
        );
        assert_eq!(*composed.image.get_pixel(slot_rect.x, slot_rect.y), WHITE);
    }

    #[test]
    fn test_compose_multiple_labels() {
        let composer = small_composer();
        let composed = composer
            .compose(vec![
                PlacedLabel::new(Slot::TopLeft, solid(10, 10)),
                PlacedLabel::new(Slot::BottomRight, solid(10, 10)),
            ])
            .unwrap();

        let slots: Vec<Slot> = composed.placements.iter().map(|p| p.slot).collect();
        assert_eq!(slots, vec![Slot::TopLeft, Slot::BottomRight]);
    }

    #[test]
    fn test_compose_rejects_empty_input() {
        let err = small_composer().compose(Vec::new()).unwrap_err();
        assert!(matches!(err, LabelSheetError::NoLabels));
    }

    #[test]
    fn test_compose_rejects_duplicate_slot() {
        let err = small_composer()
            .compose(vec![
                PlacedLabel::new(Slot::TopLeft, solid(10, 10)),
                PlacedLabel::new(Slot::TopLeft, solid(10, 10)),
            ])
            .unwrap_err();
        assert!(matches!(err, LabelSheetError::DuplicateSlot(1)));
    }

    #[test]
    fn test_compose_rejects_too_many_labels() {
        let labels = (0..5)
            .map(|i| PlacedLabel::new(Slot::ALL[i % 4], solid(10, 10)))
            .collect();
        let err = small_composer().compose(labels).unwrap_err();
        assert!(matches!(err, LabelSheetError::TooManyLabels(5)));
    }

    #[test]
    fn test_compose_rejects_empty_image() {
        let err = small_composer()
            .compose_one(Slot::TopLeft, RgbImage::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, LabelSheetError::InvalidPdf(_)));
    }

    #[test]
    fn test_bottom_row_is_clipped_not_rejected() {
        let composer = small_composer();
        let slot_size = composer.layout().slot_size();
        let composed = composer
            .compose_one(
                Slot::BottomLeft,
                solid(slot_size.width, slot_size.height),
            )
            .unwrap();

        assert_eq!(composed.image.dimensions(), (248, 351));
        let rect = composed.placements[0].rect;
        assert!(rect.bottom() > composed.image.height());
        assert_eq!(
            *composed.image.get_pixel(rect.x, composed.image.height() - 1),
            Rgb([20, 40, 60])
        );
    }
}
