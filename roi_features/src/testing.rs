//! Synthetic labeled images and pixel streams for tests.

use common::Buffer2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accumulator::RoiAccumulator;
use crate::loader::InMemoryImage;
use crate::types::{Label, PixIntens, Pixel};

/// Folds `pixels` into a fresh accumulator in the given order.
pub fn accumulate(label: Label, pixels: &[Pixel]) -> RoiAccumulator {
    let (first, rest) = pixels.split_first().expect("at least one pixel");
    let mut acc = RoiAccumulator::initialize(label, first.x, first.y, first.intensity);
    for p in rest {
        acc.update(p.x, p.y, p.intensity);
    }
    acc
}

/// Distinct random pixel positions inside `width x height` with random intensities.
pub fn random_pixels(
    seed: u64,
    count: usize,
    width: u32,
    height: u32,
    max_intensity: PixIntens,
) -> Vec<Pixel> {
    assert!(count as u64 <= width as u64 * height as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut taken = hashbrown::HashSet::new();
    let mut pixels = Vec::with_capacity(count);
    while pixels.len() < count {
        let x = rng.random_range(0..width);
        let y = rng.random_range(0..height);
        if taken.insert((x, y)) {
            pixels.push(Pixel::new(x, y, rng.random_range(0..=max_intensity)));
        }
    }
    pixels
}

/// Paintable label + intensity plane pair.
pub struct SyntheticPlate {
    pub labels: Buffer2<Label>,
    pub intensities: Buffer2<PixIntens>,
}

impl SyntheticPlate {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            labels: Buffer2::new_default(width, height),
            intensities: Buffer2::new_default(width, height),
        }
    }

    /// Fills every pixel with a seeded random intensity in `0..=max`.
    pub fn randomize_intensities(&mut self, seed: u64, max: PixIntens) -> &mut Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let (w, h) = (self.intensities.width(), self.intensities.height());
        for y in 0..h {
            for x in 0..w {
                self.intensities[(x, y)] = rng.random_range(0..=max);
            }
        }
        self
    }

    pub fn paint_rect(&mut self, label: Label, x0: usize, y0: usize, w: usize, h: usize) -> &mut Self {
        for y in y0..(y0 + h).min(self.labels.height()) {
            for x in x0..(x0 + w).min(self.labels.width()) {
                self.labels[(x, y)] = label;
            }
        }
        self
    }

    pub fn paint_disc(&mut self, label: Label, cx: i64, cy: i64, radius: i64) -> &mut Self {
        for y in cy - radius..=cy + radius {
            for x in cx - radius..=cx + radius {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                if x >= 0 && y >= 0 && (x as usize) < self.labels.width() && (y as usize) < self.labels.height() {
                    self.labels[(x as usize, y as usize)] = label;
                }
            }
        }
        self
    }

    pub fn set_intensity(&mut self, x: usize, y: usize, value: PixIntens) -> &mut Self {
        self.intensities[(x, y)] = value;
        self
    }

    pub fn image(&self, tile_width: usize, tile_height: usize) -> InMemoryImage {
        InMemoryImage::new(
            self.labels.clone(),
            self.intensities.clone(),
            tile_width,
            tile_height,
        )
    }
}

/// Pixels of a filled rectangle with constant intensity.
pub fn rect_pixels(x0: u32, y0: u32, w: u32, h: u32, intensity: PixIntens) -> Vec<Pixel> {
    (y0..y0 + h)
        .flat_map(|y| (x0..x0 + w).map(move |x| Pixel::new(x, y, intensity)))
        .collect()
}

/// Pixels of a filled disc centred on `(cx, cy)`; coordinates must stay non-negative.
pub fn disc_pixels(cx: u32, cy: u32, radius: u32, intensity: PixIntens) -> Vec<Pixel> {
    let r = radius as i64;
    let mut pixels = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                let x = (cx as i64 + dx) as u32;
                let y = (cy as i64 + dy) as u32;
                pixels.push(Pixel::new(x, y, intensity));
            }
        }
    }
    pixels
}
