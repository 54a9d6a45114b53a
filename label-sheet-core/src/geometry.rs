//! Unit conversions and pixel-space rectangles
//!
//! Pixel coordinates use a top-left origin with y growing downwards, matching
//! the raster images the sheet is composed from.

use serde::Serialize;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// PDF points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert millimetres to whole pixels at the given resolution (rounded).
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * dpi as f64).round() as u32
}

/// Convert pixels to PDF points at the given resolution.
pub fn px_to_pt(px: u32, dpi: u32) -> f64 {
    px as f64 / dpi as f64 * POINTS_PER_INCH
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `other` fits inside this size without scaling
    pub fn contains(&self, other: PixelSize) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

/// An axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub fn from_size(size: PixelSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Overlapping area of two rectangles, `None` when they are disjoint
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return None;
        }
        Some(PixelRect::new(x, y, right - x, bottom - y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mm_to_px_at_300_dpi() {
        assert_eq!(mm_to_px(210.0, 300), 2480);
        assert_eq!(mm_to_px(297.0, 300), 3508);
        assert_eq!(mm_to_px(100.0, 300), 1181);
        assert_eq!(mm_to_px(150.0, 300), 1772);
        assert_eq!(mm_to_px(5.0, 300), 59);
        assert_eq!(mm_to_px(0.0, 300), 0);
    }

    #[test]
    fn test_px_to_pt() {
        // A4 width at 300 DPI lands on ~595 pt
        let width_pt = px_to_pt(2480, 300);
        assert!((width_pt - 595.2).abs() < 1e-9);
        assert_eq!(px_to_pt(300, 300), 72.0);
    }

    #[test]
    fn test_rect_edges() {
        let rect = PixelRect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.size(), PixelSize::new(100, 50));
        assert_eq!(
            PixelRect::from_size(PixelSize::new(8, 4)),
            PixelRect::new(0, 0, 8, 4)
        );
    }

    #[test]
    fn test_contains_rect() {
        let outer = PixelRect::new(10, 10, 100, 100);
        assert!(outer.contains_rect(&PixelRect::new(10, 10, 100, 100)));
        assert!(outer.contains_rect(&PixelRect::new(20, 30, 10, 10)));
        assert!(!outer.contains_rect(&PixelRect::new(5, 10, 10, 10)));
        assert!(!outer.contains_rect(&PixelRect::new(100, 100, 11, 10)));
    }

    #[test]
    fn test_intersection() {
        let a = PixelRect::new(0, 0, 100, 100);
        let b = PixelRect::new(50, 60, 100, 100);
        assert_eq!(a.intersection(&b), Some(PixelRect::new(50, 60, 50, 40)));

        let disjoint = PixelRect::new(100, 0, 10, 10);
        assert_eq!(a.intersection(&disjoint), None);
    }

    #[test]
    fn test_size_contains() {
        let slot = PixelSize::new(1181, 1772);
        assert!(slot.contains(PixelSize::new(1181, 1772)));
        assert!(slot.contains(PixelSize::new(10, 10)));
        assert!(!slot.contains(PixelSize::new(1182, 10)));
    }
}
