//! Shared types for the shapegen rendering pipeline.

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::label::ShapeKind;
use crate::mask::Mask;
use crate::sample::Interior;

/// A pixel position on the canvas.
///
/// `x` is the column (0 at the left edge), `y` is the row (0 at the top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Canvas dimensions: height, width, and channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of 8-bit channels per pixel.
    pub channels: u8,
}

impl Dimensions {
    /// Create a new set of dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32, channels: u8) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// How the half-size of a square or the radius of a circle is sampled.
///
/// Both policies draw uniformly up to the largest extent that keeps the
/// shape inside the padded interior; they differ in the lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentPolicy {
    /// Extent in `[min(pad / 2, max), max]`. Avoids single-pixel shapes
    /// whenever the sampled center leaves room for them.
    #[default]
    FromHalfPad,
    /// Extent in `[0, max]`. Zero-size shapes rasterize as one pixel.
    FromZero,
}

/// Configuration for a generation call.
///
/// # Validation
///
/// [`validate`](Self::validate) rejects zero-sized buffers and a padding
/// margin that leaves no interior to sample from. Every generation entry
/// point calls it before allocating or drawing random numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Canvas height in pixels.
    pub height: u32,

    /// Canvas width in pixels.
    pub width: u32,

    /// Number of 8-bit channels per pixel.
    pub channels: u8,

    /// Minimum margin in pixels between any shape and the canvas border.
    ///
    /// Must satisfy `2 * pad < min(height, width)`.
    pub pad: u32,

    /// Standard deviation of the Gaussian noise added to the canvas.
    /// Non-positive values disable the noise stage.
    pub noise_std: f64,

    /// How square half-sizes and circle radii are sampled.
    pub extent_policy: ExtentPolicy,

    /// Whether the label mask accompanies the canvas in the result.
    pub masked: bool,
}

impl GeneratorConfig {
    /// Default canvas height.
    pub const DEFAULT_HEIGHT: u32 = 128;
    /// Default canvas width.
    pub const DEFAULT_WIDTH: u32 = 128;
    /// Default channel count (RGB).
    pub const DEFAULT_CHANNELS: u8 = 3;
    /// Default padding margin.
    pub const DEFAULT_PAD: u32 = 10;
    /// Default noise standard deviation.
    pub const DEFAULT_NOISE_STD: f64 = 20.0;

    /// Canvas dimensions described by this config.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height, self.channels)
    }

    /// Check that buffers can be allocated and that the padded interior is
    /// non-empty, returning that interior.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidConfig`] if height, width, or
    /// channels is zero.
    /// Returns [`GeneratorError::DegenerateGeometryRange`] if
    /// `2 * pad >= min(height, width)`.
    pub fn validate(&self) -> Result<Interior, GeneratorError> {
        if self.width == 0 || self.height == 0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.channels == 0 {
            return Err(GeneratorError::InvalidConfig(
                "canvas must have at least one channel".to_owned(),
            ));
        }
        Interior::new(self.dimensions(), self.pad)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            channels: Self::DEFAULT_CHANNELS,
            pad: Self::DEFAULT_PAD,
            noise_std: Self::DEFAULT_NOISE_STD,
            extent_policy: ExtentPolicy::default(),
            masked: true,
        }
    }
}

/// Result of a generation call.
///
/// Carries the mask only when [`GeneratorConfig::masked`] was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// The canvas alone.
    Image(Canvas),
    /// The canvas and its pixel-aligned label mask.
    Masked(Canvas, Mask),
}

impl Generated {
    /// The generated canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        match self {
            Self::Image(canvas) | Self::Masked(canvas, _) => canvas,
        }
    }

    /// The label mask, if masked output was requested.
    #[must_use]
    pub const fn mask(&self) -> Option<&Mask> {
        match self {
            Self::Image(_) => None,
            Self::Masked(_, mask) => Some(mask),
        }
    }

    /// Consume the result and return the canvas with the optional mask.
    #[must_use]
    pub fn into_parts(self) -> (Canvas, Option<Mask>) {
        match self {
            Self::Image(canvas) => (canvas, None),
            Self::Masked(canvas, mask) => (canvas, Some(mask)),
        }
    }
}

/// Errors that can occur during generation.
///
/// All variants are raised before any buffer is allocated or any random
/// number is drawn, so a failed call has no side effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum GeneratorError {
    /// A requested shape kind is not in the label table.
    #[error("invalid shape kind {value:?}, expected one of: {valid}")]
    InvalidShapeKind {
        /// The offending name.
        value: String,
        /// Comma-separated list of supported names.
        valid: String,
    },

    /// The padding margin leaves no interior to sample geometry from.
    #[error("padding {pad} leaves no drawable interior in a {width}x{height} canvas (need 2 * pad < min(width, height))")]
    DegenerateGeometryRange {
        /// The requested padding margin.
        pad: u32,
        /// Canvas width.
        width: u32,
        /// Canvas height.
        height: u32,
    },

    /// Generator configuration is invalid.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),
}

/// One shape as it was sampled and drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnShape {
    /// Which kind of shape was drawn.
    pub kind: ShapeKind,
    /// The sampled geometry.
    pub geometry: crate::sample::Geometry,
    /// The sampled fill color, one value per channel.
    pub color: Vec<u8>,
}

/// Everything a staged run produced: the buffers, the shapes that were
/// drawn, and per-stage diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedResult {
    /// The final canvas.
    pub canvas: Canvas,
    /// The label mask, pixel-aligned with `canvas`.
    pub mask: Mask,
    /// Every shape drawn, in drawing order.
    pub shapes: Vec<DrawnShape>,
    /// Timing and metrics for each stage.
    pub diagnostics: crate::diagnostics::PipelineDiagnostics,
}

impl StagedResult {
    /// Drop the extras and keep the buffers, with or without the mask.
    #[must_use]
    pub fn into_generated(self, masked: bool) -> Generated {
        if masked {
            Generated::Masked(self.canvas, self.mask)
        } else {
            Generated::Image(self.canvas)
        }
    }
}
