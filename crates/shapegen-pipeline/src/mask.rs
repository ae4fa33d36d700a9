//! Label mask: one shape label per canvas pixel.
//!
//! The mask is backed by a [`GrayImage`] so it can be handed to any
//! `image`/`imageproc` consumer as-is. Labels come from
//! [`label`](crate::label); the noise stage never touches the mask.

use std::collections::BTreeSet;

use image::{GrayImage, Luma};

use crate::label::BACKGROUND_LABEL;

/// Per-pixel shape labels, pixel-aligned with a [`Canvas`](crate::Canvas).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// Create an all-background mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::from_pixel(
            width,
            height,
            Luma([BACKGROUND_LABEL]),
        ))
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Shape as `(height, width)`.
    #[must_use]
    pub fn shape(&self) -> (u32, u32) {
        (self.0.height(), self.0.width())
    }

    /// Label at column `x`, row `y`, or `None` outside the mask.
    #[must_use]
    pub fn label_at(&self, x: u32, y: u32) -> Option<u8> {
        self.0.get_pixel_checked(x, y).map(|p| p.0[0])
    }

    /// Overwrite the label at column `x`, row `y`. Out-of-bounds writes
    /// are ignored.
    pub fn set_label(&mut self, x: u32, y: u32, label: u8) {
        if let Some(pixel) = self.0.get_pixel_mut_checked(x, y) {
            *pixel = Luma([label]);
        }
    }

    /// Every label present in the mask, in ascending order.
    #[must_use]
    pub fn distinct_labels(&self) -> BTreeSet<u8> {
        self.0.as_raw().iter().copied().collect()
    }

    /// Number of pixels carrying `label`.
    #[must_use]
    pub fn count(&self, label: u8) -> u64 {
        self.0.as_raw().iter().map(|&l| u64::from(l == label)).sum()
    }

    /// Borrow the underlying label raster.
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }

    /// Consume the mask and return the underlying label raster.
    #[must_use]
    pub fn into_image(self) -> GrayImage {
        self.0
    }
}
