//! Face bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned face rectangle in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build from signed detector output. Boxes hanging off the top or
    /// left edge are cropped to the visible part; nothing visible means None.
    pub fn from_signed(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        let (x, width) = crop_axis(x, width)?;
        let (y, height) = crop_axis(y, height)?;
        Some(Self::new(x, y, width, height))
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center point (x, y)
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Shrink the region so it lies inside a `width` x `height` frame
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let clamped = Self::new(
            self.x,
            self.y,
            self.width.min(width - self.x),
            self.height.min(height - self.y),
        );
        (!clamped.is_empty()).then_some(clamped)
    }
}

/// Shift a negative origin to zero, shrinking the extent by the overhang
fn crop_axis(origin: i32, extent: i32) -> Option<(u32, u32)> {
    let end = i64::from(origin) + i64::from(extent);
    let start = i64::from(origin).max(0);
    let visible = end - start;
    if visible <= 0 {
        return None;
    }
    Some((u32::try_from(start).ok()?, u32::try_from(visible).ok()?))
}

/// Largest-area region; the first one seen wins ties.
pub fn select_largest(regions: &[FaceRegion]) -> Option<FaceRegion> {
    let mut best: Option<FaceRegion> = None;
    for region in regions {
        match best {
            Some(current) if region.area() <= current.area() => {}
            _ => best = Some(*region),
        }
    }
    best
}
