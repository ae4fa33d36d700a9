//! Shape sampling: random geometry constrained to the padded interior.
//!
//! This module defines the [`ShapeSampler`] trait, implemented by
//! [`ShapeKind`], and the [`Interior`] region every sampler draws from.
//!
//! # Coordinates
//!
//! `x` is the column and `y` the row. Each coordinate is sampled against
//! its own axis, so on non-square canvases every shape keeps the full
//! padding margin on all four sides.
//!
//! # Extents
//!
//! Squares and circles first sample a center, then the largest extent
//! (half-size or radius) that keeps them inside the interior, then an
//! extent below that bound according to [`ExtentPolicy`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::label::ShapeKind;
use crate::types::{Dimensions, ExtentPolicy, GeneratorError, Point};

/// The inclusive pixel region shapes are sampled in: the canvas minus
/// `pad` pixels on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interior {
    /// Smallest allowed column.
    pub min_x: u32,
    /// Largest allowed column.
    pub max_x: u32,
    /// Smallest allowed row.
    pub min_y: u32,
    /// Largest allowed row.
    pub max_y: u32,
    pad: u32,
}

impl Interior {
    /// Compute the padded interior of a canvas.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::DegenerateGeometryRange`] if
    /// `2 * pad >= min(width, height)`, i.e. the interior is empty.
    pub fn new(dimensions: Dimensions, pad: u32) -> Result<Self, GeneratorError> {
        let fits = |extent: u32| pad.checked_mul(2).is_some_and(|margins| margins < extent);
        if !fits(dimensions.width) || !fits(dimensions.height) {
            return Err(GeneratorError::DegenerateGeometryRange {
                pad,
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        Ok(Self {
            min_x: pad,
            max_x: dimensions.width - 1 - pad,
            min_y: pad,
            max_y: dimensions.height - 1 - pad,
            pad,
        })
    }

    /// The padding margin this interior was built with.
    #[must_use]
    pub const fn pad(&self) -> u32 {
        self.pad
    }

    /// Whether `point` lies inside the interior.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Sample a point uniformly from the interior.
    pub fn sample_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let x = rng.gen_range(self.min_x..=self.max_x);
        let y = rng.gen_range(self.min_y..=self.max_y);
        Point::new(x, y)
    }

    /// Largest extent around `center` that stays inside the interior:
    /// the minimum distance from `center` to any of the four padded edges.
    ///
    /// Returns 0 for a center outside the interior.
    #[must_use]
    pub fn max_extent(&self, center: Point) -> u32 {
        if !self.contains(center) {
            return 0;
        }
        [
            center.x - self.min_x,
            self.max_x - center.x,
            center.y - self.min_y,
            self.max_y - center.y,
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

impl ExtentPolicy {
    /// Sample an extent in this policy's range, never exceeding `max`.
    pub fn sample<R: Rng + ?Sized>(self, max: u32, pad: u32, rng: &mut R) -> u32 {
        let min = match self {
            Self::FromHalfPad => (pad / 2).min(max),
            Self::FromZero => 0,
        };
        rng.gen_range(min..=max)
    }
}

/// Sampled geometry of one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Geometry {
    /// Axis-aligned rectangle between two corners, both inclusive.
    Rectangle {
        /// First corner.
        a: Point,
        /// Opposite corner.
        b: Point,
    },
    /// Axis-aligned square covering `[center - half, center + half]` on
    /// both axes.
    Square {
        /// Center pixel.
        center: Point,
        /// Half the side length, excluding the center pixel.
        half: u32,
    },
    /// Filled triangle. Collinear or repeated vertices are allowed.
    Triangle {
        /// The three vertices.
        vertices: [Point; 3],
    },
    /// Filled disk.
    Circle {
        /// Center pixel.
        center: Point,
        /// Radius in pixels.
        radius: u32,
    },
}

/// Inclusive pixel bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Smallest column.
    pub min_x: u32,
    /// Smallest row.
    pub min_y: u32,
    /// Largest column.
    pub max_x: u32,
    /// Largest row.
    pub max_y: u32,
}

impl BoundingBox {
    /// Whether the pixel at column `x`, row `y` lies inside the box.
    #[must_use]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl Geometry {
    /// The kind of shape this geometry describes.
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::Square { .. } => ShapeKind::Square,
            Self::Triangle { .. } => ShapeKind::Triangle,
            Self::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Inclusive bounding box of every pixel the shape can cover.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        match *self {
            Self::Rectangle { a, b } => BoundingBox {
                min_x: a.x.min(b.x),
                min_y: a.y.min(b.y),
                max_x: a.x.max(b.x),
                max_y: a.y.max(b.y),
            },
            Self::Square {
                center,
                half: extent,
            }
            | Self::Circle {
                center,
                radius: extent,
            } => BoundingBox {
                min_x: center.x.saturating_sub(extent),
                min_y: center.y.saturating_sub(extent),
                max_x: center.x.saturating_add(extent),
                max_y: center.y.saturating_add(extent),
            },
            Self::Triangle { vertices } => {
                let xs = vertices.map(|v| v.x);
                let ys = vertices.map(|v| v.y);
                BoundingBox {
                    min_x: xs.into_iter().min().unwrap_or(0),
                    min_y: ys.into_iter().min().unwrap_or(0),
                    max_x: xs.into_iter().max().unwrap_or(0),
                    max_y: ys.into_iter().max().unwrap_or(0),
                }
            }
        }
    }
}

/// Trait for shape sampling strategies.
///
/// Input: the padded interior, the extent policy, and a random source.
/// Output: geometry that lies entirely inside the interior.
pub trait ShapeSampler {
    /// Sample random geometry for this shape.
    fn sample<R: Rng + ?Sized>(
        &self,
        interior: &Interior,
        policy: ExtentPolicy,
        rng: &mut R,
    ) -> Geometry;
}

impl ShapeSampler for ShapeKind {
    fn sample<R: Rng + ?Sized>(
        &self,
        interior: &Interior,
        policy: ExtentPolicy,
        rng: &mut R,
    ) -> Geometry {
        match *self {
            Self::Rectangle => Geometry::Rectangle {
                a: interior.sample_point(rng),
                b: interior.sample_point(rng),
            },
            Self::Square => {
                let center = interior.sample_point(rng);
                let half = policy.sample(interior.max_extent(center), interior.pad(), rng);
                Geometry::Square { center, half }
            }
            Self::Triangle => Geometry::Triangle {
                vertices: [
                    interior.sample_point(rng),
                    interior.sample_point(rng),
                    interior.sample_point(rng),
                ],
            },
            Self::Circle => {
                let center = interior.sample_point(rng);
                let radius = policy.sample(interior.max_extent(center), interior.pad(), rng);
                Geometry::Circle { center, radius }
            }
        }
    }
}
