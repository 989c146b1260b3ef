//! Depth buffers and the depth sampling contract.
//!
//! Depth is stored in meters as the distance along the camera ray through the
//! pixel center. Zero, negative, and non-finite values mean "no data".

use std::path::Path;

use image::{ImageBuffer, Luma};
use patchcarve_core::{PatchError, Result};

/// Returns whether a sampled depth carries data.
#[inline]
pub fn is_valid_depth(depth: f32) -> bool {
    depth > 0.0 && depth.is_finite()
}

/// A read-only source of point-sampled depth.
///
/// Implemented by the host integration layer for whatever texture or buffer
/// the runtime exposes.
pub trait DepthSource {
    /// Returns `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Returns the depth at a pixel, with coordinates clamped to the buffer.
    ///
    /// Zero or negative means no data.
    fn sample_depth(&self, x: i32, y: i32) -> f32;

    /// Samples the pixel containing a continuous screen position.
    #[allow(clippy::cast_possible_truncation)]
    fn sample_nearest(&self, x: f32, y: f32) -> f32 {
        if !x.is_finite() || !y.is_finite() {
            return 0.0;
        }
        self.sample_depth(x.floor() as i32, y.floor() as i32)
    }
}

/// A single-channel depth image in meters, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    depths: Vec<f32>,
}

impl DepthBuffer {
    /// Creates a depth buffer from row-major data (`depths[y * width + x]`).
    pub fn new(width: u32, height: u32, depths: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PatchError::EmptyBuffer(width, height));
        }
        let expected = width as usize * height as usize;
        if depths.len() != expected {
            return Err(PatchError::SizeMismatch {
                expected,
                actual: depths.len(),
            });
        }
        Ok(Self {
            width,
            height,
            depths,
        })
    }

    /// Creates a buffer with every pixel at the same depth.
    pub fn filled(width: u32, height: u32, depth: f32) -> Result<Self> {
        Self::new(width, height, vec![depth; width as usize * height as usize])
    }

    /// Creates a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        let mut depths = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                depths.push(f(x, y));
            }
        }
        Self::new(width, height, depths)
    }

    /// Converts a 16-bit grayscale image, scaling each unit by `meters_per_unit`
    /// (e.g. `0.001` for millimeter depth maps).
    pub fn from_luma16(image: &ImageBuffer<Luma<u16>, Vec<u16>>, meters_per_unit: f32) -> Result<Self> {
        let depths = image
            .as_raw()
            .iter()
            .map(|&raw| f32::from(raw) * meters_per_unit)
            .collect();
        Self::new(image.width(), image.height(), depths)
    }

    /// Converts a 32-bit float grayscale image already in meters.
    pub fn from_luma32f(image: &ImageBuffer<Luma<f32>, Vec<f32>>) -> Result<Self> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }

    /// Loads a 16-bit depth image (PNG or any format `image` can decode).
    pub fn open(path: impl AsRef<Path>, meters_per_unit: f32) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|e| PatchError::ImageError(format!("{}: {e}", path.display())))?;
        let buffer = Self::from_luma16(&decoded.into_luma16(), meters_per_unit)?;
        log::debug!(
            "loaded {}x{} depth image from {}",
            buffer.width,
            buffer.height,
            path.display()
        );
        Ok(buffer)
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major depths.
    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    /// Gets the depth at a pixel, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.depths
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Overwrites the depth at a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, depth: f32) {
        if x < self.width && y < self.height {
            self.depths[y as usize * self.width as usize + x as usize] = depth;
        }
    }

    /// Fraction of pixels that carry depth data.
    #[allow(clippy::cast_precision_loss)]
    pub fn valid_fraction(&self) -> f32 {
        let valid = self.depths.iter().filter(|&&d| is_valid_depth(d)).count();
        valid as f32 / self.depths.len() as f32
    }
}

impl DepthSource for DepthBuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn sample_depth(&self, x: i32, y: i32) -> f32 {
        let cx = x.clamp(0, self.width as i32 - 1) as u32;
        let cy = y.clamp(0, self.height as i32 - 1) as u32;
        self.depths[cy as usize * self.width as usize + cx as usize]
    }
}
