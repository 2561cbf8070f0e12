use std::ops::{Index, IndexMut};
use std::slice;

/// Row-major 2D plane (label masks, intensity images, occupancy grids).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    /// Bounds-checked access with signed coordinates; `None` outside the plane.
    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<&T> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(&self.pixels[y as usize * self.width + x as usize])
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.pixels.iter()
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    /// Copies the `width x height` window starting at `(x0, y0)`, clipped to the plane.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Buffer2<T> {
        let x_end = (x0 + width).min(self.width);
        let y_end = (y0 + height).min(self.height);
        let w = x_end.saturating_sub(x0);
        let h = y_end.saturating_sub(y0);

        let mut pixels = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            let start = y * self.width + x0;
            pixels.extend_from_slice(&self.pixels[start..start + w]);
        }
        Buffer2::new(w, h, pixels)
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, T::default())
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<'a, T> IntoIterator for &'a Buffer2<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pixels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.len(), 6);
        assert!(!buf.is_empty());
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_and_index() {
        // row 0 = [10, 20, 30], row 1 = [40, 50, 60]
        let mut buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(*buf.get(2, 0), 30);
        assert_eq!(buf[(0, 1)], 40);
        buf[(1, 1)] = 7;
        assert_eq!(*buf.get(1, 1), 7);
        *buf.get_mut(0, 0) = 1;
        assert_eq!(buf.row(0), &[1, 20, 30]);
    }

    #[test]
    fn test_get_checked_outside_plane() {
        let buf = Buffer2::new_filled(2, 2, 1u8);
        assert_eq!(buf.get_checked(1, 1), Some(&1));
        assert_eq!(buf.get_checked(-1, 0), None);
        assert_eq!(buf.get_checked(0, 2), None);
    }

    #[test]
    fn test_crop_inside() {
        let buf = Buffer2::new(4, 3, (0..12).collect::<Vec<u32>>());
        let tile = buf.crop(1, 1, 2, 2);
        assert_eq!(tile.width(), 2);
        assert_eq!(tile.height(), 2);
        assert_eq!(tile.pixels(), &[5, 6, 9, 10]);
    }

    #[test]
    fn test_crop_clipped_at_border() {
        let buf = Buffer2::new(4, 3, (0..12).collect::<Vec<u32>>());
        let tile = buf.crop(3, 2, 4, 4);
        assert_eq!(tile.width(), 1);
        assert_eq!(tile.height(), 1);
        assert_eq!(tile.pixels(), &[11]);
    }

    #[test]
    fn test_new_default() {
        let buf: Buffer2<u32> = Buffer2::new_default(4, 3);
        assert_eq!(buf.len(), 12);
        assert!(buf.iter().all(|&v| v == 0));
    }
}
