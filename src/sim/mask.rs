//! Per-pixel opacity queries over a fixed raster
//!
//! The terrain mask and each creature's sprite mask are the same structure;
//! they differ only in what lies outside the raster. Terrain treats the
//! outside as rock so nothing drifts into undefined space, sprites treat it
//! as empty so hit-tests never land beyond the sprite's own bounds.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::{Result, SimError};

/// How coordinates outside the raster answer `is_solid_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfBounds {
    Solid,
    Clear,
}

/// Immutable alpha raster
#[derive(Debug, Clone)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    /// Row-major alpha values
    alpha: Vec<u8>,
    outside: OutOfBounds,
}

impl CollisionMask {
    /// Build from one alpha byte per pixel
    pub fn from_alpha(width: u32, height: u32, alpha: Vec<u8>, outside: OutOfBounds) -> Result<Self> {
        let expected = width as usize * height as usize;
        if alpha.len() != expected {
            return Err(SimError::MaskSizeMismatch {
                width,
                height,
                expected,
                actual: alpha.len(),
            });
        }
        Ok(Self {
            width,
            height,
            alpha,
            outside,
        })
    }

    /// Build from decoded RGBA8 image data, keeping only the alpha channel
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8], outside: OutOfBounds) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        let pixels: &[[u8; 4]] = match bytemuck::try_cast_slice(rgba) {
            Ok(pixels) if rgba.len() == expected => pixels,
            _ => {
                return Err(SimError::MaskSizeMismatch {
                    width,
                    height,
                    expected,
                    actual: rgba.len(),
                });
            }
        };
        let alpha = pixels.iter().map(|p| p[3]).collect();
        Self::from_alpha(width, height, alpha, outside)
    }

    /// A fully transparent raster
    pub fn empty(width: u32, height: u32, outside: OutOfBounds) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
            outside,
        }
    }

    /// A fully opaque raster (e.g. a solid rectangular sprite)
    pub fn filled(width: u32, height: u32, outside: OutOfBounds) -> Self {
        Self {
            width,
            height,
            alpha: vec![u8::MAX; width as usize * height as usize],
            outside,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn out_of_bounds(&self) -> OutOfBounds {
        self.outside
    }

    /// True if the pixel is opaque, or lies outside and the policy says solid
    pub fn is_solid_at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return self.outside == OutOfBounds::Solid;
        }
        self.alpha[y as usize * self.width as usize + x as usize] != 0
    }

    /// Same query with coordinates truncated toward zero
    #[inline]
    pub fn is_solid_at_f(&self, x: f64, y: f64) -> bool {
        self.is_solid_at(x as i32, y as i32)
    }

    fn paint_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32, value: u8) {
        let x1 = (x0 + w).min(self.width as i32);
        let y1 = (y0 + h).min(self.height as i32);
        for y in y0.max(0)..y1 {
            for x in x0.max(0)..x1 {
                self.alpha[y as usize * self.width as usize + x as usize] = value;
            }
        }
    }

    /// Paint an opaque filled rectangle (clipped to the raster)
    pub fn fill_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32) {
        self.paint_rect(x0, y0, w, h, u8::MAX);
    }

    /// Carve a transparent rectangle (clipped to the raster)
    pub fn clear_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32) {
        self.paint_rect(x0, y0, w, h, 0);
    }

    /// Paint an opaque filled disc (clipped to the raster)
    pub fn fill_disc(&mut self, cx: i32, cy: i32, r: i32) {
        for y in (cy - r).max(0)..(cy + r + 1).min(self.height as i32) {
            for x in (cx - r).max(0)..(cx + r + 1).min(self.width as i32) {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r * r {
                    self.alpha[y as usize * self.width as usize + x as usize] = u8::MAX;
                }
            }
        }
    }

    /// Procedural cavern terrain for headless runs and tests.
    ///
    /// Ceiling and floor follow a seeded random walk; a few rock pillars are
    /// scattered through the open band. Same seed, same cavern.
    pub fn generate_cavern(width: u32, height: u32, seed: u64) -> Self {
        let mut mask = Self::empty(width, height, OutOfBounds::Solid);
        if width == 0 || height == 0 {
            log::warn!("Empty {}x{} cavern requested", width, height);
            return mask;
        }
        let mut rng = Pcg32::seed_from_u64(seed);
        let (w, h) = (width as i32, height as i32);
        let band = (h / 8).max(1);

        let mut ceiling = band;
        let mut floor = h - band;
        for x in 0..w {
            ceiling = (ceiling + rng.random_range(-2..=2)).clamp(band / 2, band * 2);
            floor = (floor + rng.random_range(-2..=2)).clamp(h - band * 2, h - band / 2);
            mask.fill_rect(x, 0, 1, ceiling);
            mask.fill_rect(x, floor, 1, h - floor);
        }

        let pillars = (width / 400).max(1);
        for _ in 0..pillars {
            let cx = rng.random_range(0..w);
            let cy = rng.random_range(band * 2..(h - band * 2).max(band * 2 + 1));
            let r = rng.random_range(10..(band.max(11)));
            mask.fill_disc(cx, cy, r);
        }

        log::debug!("Generated {}x{} cavern (seed {}, {} pillars)", width, height, seed, pillars);
        mask
    }
}
