//! Canvas buffer and background initialization.
//!
//! A [`Canvas`] is an interleaved `height x width x channels` grid of
//! 8-bit intensities. Unlike the `image` crate's pixel types it supports
//! any channel count, so callers can synthesize single-channel,
//! multi-spectral, or RGB data from the same pipeline.
//!
//! [`initialize`] is the first pipeline stage: it fills every channel
//! plane with one random constant and returns an all-background mask.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use rand::Rng;

use crate::mask::Mask;
use crate::types::Dimensions;

/// Multi-channel 8-bit raster, stored row-major with interleaved channels.
///
/// Internally the buffer is a single-channel plane `width * channels`
/// pixels wide, which lets per-element stages reuse `imageproc` routines
/// written for [`GrayImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    dimensions: Dimensions,
    plane: GrayImage,
}

impl Canvas {
    /// Create a canvas where every pixel has the given per-channel color.
    ///
    /// The channel count is taken from `color.len()`.
    #[must_use]
    pub fn from_color(width: u32, height: u32, color: &[u8]) -> Self {
        let channels = u8::try_from(color.len()).unwrap_or(u8::MAX);
        let color = &color[..usize::from(channels)];
        let dimensions = Dimensions::new(width, height, channels);
        let pixels = usize::try_from(dimensions.pixel_count()).unwrap_or(0);
        let row_len = width.saturating_mul(u32::from(channels));
        let plane = GrayImage::from_raw(row_len, height, color.repeat(pixels))
            .unwrap_or_else(|| GrayImage::new(row_len, height));
        Self { dimensions, plane }
    }

    /// Wrap a raw interleaved buffer.
    ///
    /// Returns `None` if `data.len()` does not equal
    /// `width * height * channels`.
    #[must_use]
    pub fn from_raw(dimensions: Dimensions, data: Vec<u8>) -> Option<Self> {
        let expected = dimensions.pixel_count() * u64::from(dimensions.channels);
        if u64::try_from(data.len()).ok() != Some(expected) {
            return None;
        }
        let row_len = dimensions
            .width
            .checked_mul(u32::from(dimensions.channels))?;
        let plane = GrayImage::from_raw(row_len, dimensions.height, data)?;
        Some(Self { dimensions, plane })
    }

    /// Canvas dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Number of channels per pixel.
    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.dimensions.channels
    }

    /// Shape as `(height, width, channels)`.
    #[must_use]
    pub const fn shape(&self) -> (u32, u32, u8) {
        (
            self.dimensions.height,
            self.dimensions.width,
            self.dimensions.channels,
        )
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        let channels = usize::from(self.dimensions.channels);
        (y as usize * self.dimensions.width as usize + x as usize) * channels
    }

    /// All channel values of the pixel at column `x`, row `y`.
    ///
    /// Returns `None` outside the canvas.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let start = self.offset(x, y);
        self.plane
            .as_raw()
            .get(start..start + usize::from(self.dimensions.channels))
    }

    /// Overwrite the pixel at column `x`, row `y` with `color`.
    ///
    /// Out-of-bounds writes are ignored. Extra color components beyond the
    /// channel count are ignored; missing ones leave the channel unchanged.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: &[u8]) {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return;
        }
        let start = self.offset(x, y);
        let end = start + usize::from(self.dimensions.channels);
        let data: &mut [u8] = &mut self.plane;
        for (dst, &src) in data[start..end].iter_mut().zip(color) {
            *dst = src;
        }
    }

    /// The raw interleaved buffer.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.plane.as_raw()
    }

    /// Consume the canvas and return the raw interleaved buffer.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.plane.into_raw()
    }

    /// The interleaved buffer viewed as a `width * channels` wide
    /// single-channel plane, for in-place per-element stages.
    pub(crate) const fn plane_mut(&mut self) -> &mut GrayImage {
        &mut self.plane
    }

    /// Convert to an `image` crate image.
    ///
    /// Channel counts 1, 2, 3 and 4 map to Luma8, LumaA8, Rgb8 and Rgba8.
    /// Other channel counts have no `image` equivalent and return `None`.
    #[must_use]
    pub fn to_dynamic_image(&self) -> Option<DynamicImage> {
        let (w, h) = (self.dimensions.width, self.dimensions.height);
        let raw = self.plane.as_raw().clone();
        match self.dimensions.channels {
            1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            2 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
            _ => None,
        }
    }
}

/// Draw one uniform random value in `[0, 255]` per channel.
pub fn random_color<R: Rng + ?Sized>(channels: u8, rng: &mut R) -> Vec<u8> {
    (0..channels).map(|_| rng.gen_range(0..=u8::MAX)).collect()
}

/// Allocate a canvas with a random constant background and an
/// all-background mask.
///
/// Each channel plane holds one independently sampled value, constant
/// across every pixel. Draws exactly `channels` values from `rng`.
#[must_use = "returns the initialized canvas and mask"]
pub fn initialize<R: Rng + ?Sized>(dimensions: Dimensions, rng: &mut R) -> (Canvas, Mask) {
    let background = random_color(dimensions.channels, rng);
    log::debug!(
        "initializing {}x{}x{} canvas with background {background:?}",
        dimensions.height,
        dimensions.width,
        dimensions.channels,
    );
    let canvas = Canvas::from_color(dimensions.width, dimensions.height, &background);
    let mask = Mask::new(dimensions.width, dimensions.height);
    (canvas, mask)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::label::BACKGROUND_LABEL;

    #[test]
    fn initialize_produces_requested_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let (canvas, mask) = initialize(Dimensions::new(17, 9, 5), &mut rng);
        assert_eq!(canvas.shape(), (9, 17, 5));
        assert_eq!(canvas.as_raw().len(), 9 * 17 * 5);
        assert_eq!(mask.width(), 17);
        assert_eq!(mask.height(), 9);
    }

    #[test]
    fn background_is_constant_per_channel() {
        let mut rng = StdRng::seed_from_u64(7);
        let (canvas, _) = initialize(Dimensions::new(12, 8, 3), &mut rng);
        let first = canvas.pixel(0, 0).unwrap().to_vec();
        for y in 0..8 {
            for x in 0..12 {
                assert_eq!(canvas.pixel(x, y).unwrap(), first.as_slice());
            }
        }
    }

    #[test]
    fn mask_starts_as_background() {
        let mut rng = StdRng::seed_from_u64(3);
        let (_, mask) = initialize(Dimensions::new(10, 10, 1), &mut rng);
        assert_eq!(mask.count(BACKGROUND_LABEL), 100);
    }

    #[test]
    fn same_seed_same_background() {
        let dims = Dimensions::new(4, 4, 3);
        let (a, _) = initialize(dims, &mut StdRng::seed_from_u64(42));
        let (b, _) = initialize(dims, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let dims = Dimensions::new(2, 2, 3);
        assert!(Canvas::from_raw(dims, vec![0; 11]).is_none());
        assert!(Canvas::from_raw(dims, vec![0; 12]).is_some());
    }

    #[test]
    fn pixel_out_of_bounds_is_none() {
        let canvas = Canvas::from_color(3, 2, &[1, 2, 3]);
        assert!(canvas.pixel(3, 0).is_none());
        assert!(canvas.pixel(0, 2).is_none());
        assert_eq!(canvas.pixel(2, 1), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn put_pixel_writes_only_target() {
        let mut canvas = Canvas::from_color(3, 3, &[0, 0]);
        canvas.put_pixel(1, 2, &[9, 8]);
        canvas.put_pixel(5, 5, &[7, 7]);
        assert_eq!(canvas.pixel(1, 2), Some(&[9, 8][..]));
        let touched = canvas.as_raw().iter().filter(|&&v| v != 0).count();
        assert_eq!(touched, 2);
    }

    #[test]
    fn interleaved_layout_is_row_major() {
        let mut canvas = Canvas::from_color(2, 2, &[0, 0, 0]);
        canvas.put_pixel(1, 0, &[1, 2, 3]);
        assert_eq!(&canvas.as_raw()[3..6], &[1, 2, 3]);
    }

    #[test]
    fn rgb_canvas_converts_to_dynamic_image() {
        let canvas = Canvas::from_color(5, 4, &[10, 20, 30]);
        let img = canvas.to_dynamic_image().unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (5, 4));
        assert_eq!(img.get_pixel(4, 3).0, [10, 20, 30]);
    }

    #[test]
    fn exotic_channel_count_has_no_dynamic_image() {
        let canvas = Canvas::from_color(2, 2, &[1, 2, 3, 4, 5]);
        assert!(canvas.to_dynamic_image().is_none());
    }

    #[test]
    fn random_color_has_one_value_per_channel() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(random_color(7, &mut rng).len(), 7);
    }
}
