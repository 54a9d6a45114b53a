//! Sheet geometry: the A4 canvas and the 2x2 grid of label slots

use crate::geometry::{mm_to_px, PixelRect, PixelSize};
use crate::slot::Slot;
use serde::Serialize;

/// Default rasterization and composition resolution
pub const DEFAULT_DPI: u32 = 300;

/// A4 portrait, in millimetres
pub const A4_MM: (f64, f64) = (210.0, 297.0);

/// 100 x 150 mm shipping label
pub const LABEL_MM: (f64, f64) = (100.0, 150.0);

/// Distance from the sheet edge to the first slot
pub const MARGIN_MM: (f64, f64) = (5.0, 5.0);

/// Space between neighbouring slots
pub const GAP_MM: (f64, f64) = (5.0, 5.0);

/// Physical layout of a label sheet. All lengths are (horizontal, vertical) in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetLayout {
    pub dpi: u32,
    pub sheet_mm: (f64, f64),
    pub slot_mm: (f64, f64),
    pub margin_mm: (f64, f64),
    pub gap_mm: (f64, f64),
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::a4_four_up()
    }
}

impl SheetLayout {
    /// Four 100x150 mm labels on A4 at 300 DPI
    pub fn a4_four_up() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            sheet_mm: A4_MM,
            slot_mm: LABEL_MM,
            margin_mm: MARGIN_MM,
            gap_mm: GAP_MM,
        }
    }

    /// Same geometry at a different resolution
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn sheet_size(&self) -> PixelSize {
        PixelSize::new(self.px(self.sheet_mm.0), self.px(self.sheet_mm.1))
    }

    pub fn slot_size(&self) -> PixelSize {
        PixelSize::new(self.px(self.slot_mm.0), self.px(self.slot_mm.1))
    }

    /// Pixel rectangle of a slot. Every slot has the same size; the bottom
    /// row may extend past the sheet edge.
    pub fn slot_rect(&self, slot: Slot) -> PixelRect {
        let size = self.slot_size();
        let margin_x = self.px(self.margin_mm.0);
        let margin_y = self.px(self.margin_mm.1);
        let gap_x = self.px(self.gap_mm.0);
        let gap_y = self.px(self.gap_mm.1);

        PixelRect::new(
            margin_x + slot.column() * (size.width + gap_x),
            margin_y + slot.row() * (size.height + gap_y),
            size.width,
            size.height,
        )
    }

    pub fn slot_rects(&self) -> [(Slot, PixelRect); 4] {
        Slot::ALL.map(|slot| (slot, self.slot_rect(slot)))
    }

    /// How far the slot grid reaches beyond the sheet, as (right, bottom) pixels
    pub fn overflow_px(&self) -> (u32, u32) {
        let sheet = self.sheet_size();
        let far = self.slot_rect(Slot::BottomRight);
        (
            far.right().saturating_sub(sheet.width),
            far.bottom().saturating_sub(sheet.height),
        )
    }

    fn px(&self, mm: f64) -> u32 {
        mm_to_px(mm, self.dpi)
    }
}
