//! Core value types shared by both processing phases.

/// ROI identity assigned by the segmentation mask. `0` is background.
pub type Label = u32;

/// Raw pixel intensity as delivered by the tile loader.
pub type PixIntens = u32;

/// Label value reserved for background pixels.
pub const BACKGROUND: Label = 0;

/// One foreground observation buffered inside its ROI record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    pub intensity: PixIntens,
}

impl Pixel {
    #[inline]
    pub const fn new(x: u32, y: u32, intensity: PixIntens) -> Self {
        Self { x, y, intensity }
    }
}

/// Axis-aligned bounding box with inclusive pixel bounds.
///
/// A pixel at (x, y) is inside if `x_min <= x <= x_max` and `y_min <= y <= y_max`.
/// Boxes only ever grow through [`Aabb::include`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl Aabb {
    #[inline]
    pub const fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Degenerate box covering exactly one pixel.
    #[inline]
    pub const fn from_point(x: u32, y: u32) -> Self {
        Self::new(x, x, y, y)
    }

    /// Expand this bounding box to include the given point.
    #[inline]
    pub fn include(&mut self, x: u32, y: u32) {
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Number of pixel columns.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of pixel rows.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    #[inline]
    pub const fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// True if `other` lies entirely inside `self` (shared edges allowed).
    #[inline]
    pub const fn contains_aabb(&self, other: &Aabb) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    /// True if the boxes touch or overlap once separated by at most `radius` pixels.
    #[inline]
    pub const fn overlaps_dilated(&self, other: &Aabb, radius: u32) -> bool {
        let r = radius as u64;
        (other.x_min as u64) <= self.x_max as u64 + r
            && (self.x_min as u64) <= other.x_max as u64 + r
            && (other.y_min as u64) <= self.y_max as u64 + r
            && (self.y_min as u64) <= other.y_max as u64 + r
    }
}
