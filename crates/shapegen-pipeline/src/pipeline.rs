//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::generate`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use shapegen_pipeline::{GeneratorConfig, GeneratorError, Pipeline, ShapeKind};
//! # fn run() -> Result<(), GeneratorError> {
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let staged = Pipeline::new(GeneratorConfig::default(), vec![ShapeKind::Circle])?
//!     .initialize(&mut rng)
//!     .draw(&mut rng)
//!     .add_noise(&mut rng)
//!     .into_result();
//! assert_eq!(staged.shapes.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state,
//! carrying the canvas and mask forward. No state survives between
//! generation calls: every [`Pending`] owns its own buffers once
//! initialized, and [`Noised::into_result`] hands them to the caller.
//!
//! All validation happens in [`Pipeline::new`], before any buffer is
//! allocated or any random number is drawn.

use rand::Rng;
use web_time::Instant;

use crate::canvas::{self, Canvas};
use crate::diagnostics::{
    PipelineDiagnostics, PipelineSummary, ShapeCoverage, StageDiagnostics, StageMetrics,
};
use crate::label::ShapeKind;
use crate::mask::Mask;
use crate::raster::{self, Fill};
use crate::sample::{Interior, ShapeSampler};
use crate::types::{DrawnShape, GeneratorConfig, GeneratorError, StagedResult};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state after validation, before any buffer exists.
///
/// Call [`initialize`](Self::initialize) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .initialize() to continue"]
#[derive(Debug)]
pub struct Pending {
    config: GeneratorConfig,
    interior: Interior,
    shapes: Vec<ShapeKind>,
}

impl Pending {
    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The shapes that will be drawn, in order.
    #[must_use]
    pub fn shapes(&self) -> &[ShapeKind] {
        &self.shapes
    }

    /// The padded region shapes will be sampled from.
    #[must_use]
    pub const fn interior(&self) -> Interior {
        self.interior
    }

    /// Allocate the canvas and mask and paint the random background.
    pub fn initialize<R: Rng + ?Sized>(self, rng: &mut R) -> Initialized {
        let started = Instant::now();
        let (canvas, mask) = canvas::initialize(self.config.dimensions(), rng);
        let background = canvas.pixel(0, 0).map(<[u8]>::to_vec).unwrap_or_default();
        let stage = StageDiagnostics {
            duration: started.elapsed(),
            metrics: StageMetrics::Initialize {
                width: self.config.width,
                height: self.config.height,
                channels: self.config.channels,
                background,
            },
        };
        Initialized {
            config: self.config,
            interior: self.interior,
            shapes: self.shapes,
            canvas,
            mask,
            started,
            initialize: stage,
        }
    }
}

// ───────────────────────── Stage 1: Initialized ──────────────────────

/// Pipeline state after the background has been painted.
///
/// Call [`draw`](Self::draw) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .draw() to continue"]
#[derive(Debug)]
pub struct Initialized {
    config: GeneratorConfig,
    interior: Interior,
    shapes: Vec<ShapeKind>,
    canvas: Canvas,
    mask: Mask,
    started: Instant,
    initialize: StageDiagnostics,
}

impl Initialized {
    /// The background-only canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The all-background mask.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Sample and rasterize every requested shape in order.
    ///
    /// Each shape draws its color first, then its geometry. Later shapes
    /// overwrite earlier ones where they overlap.
    pub fn draw<R: Rng + ?Sized>(mut self, rng: &mut R) -> Drawn {
        let started = Instant::now();
        let mut drawn = Vec::with_capacity(self.shapes.len());
        let mut coverage = Vec::with_capacity(self.shapes.len());

        for &kind in &self.shapes {
            let color = canvas::random_color(self.config.channels, rng);
            let geometry = kind.sample(&self.interior, self.config.extent_policy, rng);
            let covered_pixels = raster::rasterize(
                &mut self.canvas,
                &mut self.mask,
                &geometry,
                Fill {
                    color: &color,
                    label: kind.label(),
                },
            );
            coverage.push(ShapeCoverage {
                kind,
                covered_pixels,
            });
            drawn.push(DrawnShape {
                kind,
                geometry,
                color,
            });
        }
        log::debug!("drew {} shape(s): {:?}", drawn.len(), self.shapes);

        let stage = StageDiagnostics {
            duration: started.elapsed(),
            metrics: StageMetrics::Draw {
                pad: self.config.pad,
                shapes: coverage,
            },
        };
        Drawn {
            config: self.config,
            canvas: self.canvas,
            mask: self.mask,
            drawn,
            started: self.started,
            initialize: self.initialize,
            draw: stage,
        }
    }
}

// ───────────────────────── Stage 2: Drawn ────────────────────────────

/// Pipeline state after every shape has been rasterized, before noise.
///
/// The mask is final at this point. Call [`add_noise`](Self::add_noise)
/// to advance to the last stage.
#[must_use = "pipeline stages are consumed by advancing; call .add_noise() to continue"]
#[derive(Debug)]
pub struct Drawn {
    config: GeneratorConfig,
    canvas: Canvas,
    mask: Mask,
    drawn: Vec<DrawnShape>,
    started: Instant,
    initialize: StageDiagnostics,
    draw: StageDiagnostics,
}

impl Drawn {
    /// The noise-free canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The final label mask.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Every shape drawn, in drawing order.
    #[must_use]
    pub fn shapes(&self) -> &[DrawnShape] {
        &self.drawn
    }

    /// Add Gaussian noise to the canvas once. The mask is not touched.
    ///
    /// Skipped entirely, with no diagnostics entry, when
    /// `config.noise_std` is not positive.
    pub fn add_noise<R: Rng + ?Sized>(mut self, rng: &mut R) -> Noised {
        let std = self.config.noise_std;
        let noise = if std.is_finite() && std > 0.0 {
            let started = Instant::now();
            let before = self.canvas.as_raw().to_vec();
            crate::noise::add_gaussian_noise(&mut self.canvas, std, rng);
            let changed_elements =
                crate::diagnostics::count_changed(&before, self.canvas.as_raw());
            Some(StageDiagnostics {
                duration: started.elapsed(),
                metrics: StageMetrics::Noise {
                    std,
                    changed_elements,
                    total_elements: u64::try_from(before.len()).unwrap_or(u64::MAX),
                },
            })
        } else {
            log::debug!("noise disabled (std {std})");
            None
        };
        Noised {
            config: self.config,
            canvas: self.canvas,
            mask: self.mask,
            drawn: self.drawn,
            started: self.started,
            initialize: self.initialize,
            draw: self.draw,
            noise,
        }
    }
}

// ───────────────────────── Stage 3: Noised ───────────────────────────

/// Pipeline state after noise injection, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`].
#[must_use = "call .into_result() to extract the StagedResult"]
#[derive(Debug)]
pub struct Noised {
    config: GeneratorConfig,
    canvas: Canvas,
    mask: Mask,
    drawn: Vec<DrawnShape>,
    started: Instant,
    initialize: StageDiagnostics,
    draw: StageDiagnostics,
    noise: Option<StageDiagnostics>,
}

impl Noised {
    /// The final canvas.
    #[must_use]
    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The final label mask.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Consume the pipeline and return the buffers, the drawn shapes, and
    /// the collected diagnostics.
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        let label_counts = self
            .mask
            .distinct_labels()
            .into_iter()
            .map(|label| (label, self.mask.count(label)))
            .collect();
        let summary = PipelineSummary {
            image_width: self.config.width,
            image_height: self.config.height,
            pixel_count: self.config.dimensions().pixel_count(),
            shape_count: self.drawn.len(),
            label_counts,
        };
        let diagnostics = PipelineDiagnostics {
            initialize: self.initialize,
            draw: self.draw,
            noise: self.noise,
            total_duration: self.started.elapsed(),
            summary,
        };
        StagedResult {
            canvas: self.canvas,
            mask: self.mask,
            shapes: self.drawn,
            diagnostics,
        }
    }
}

// ───────────────────────── Entry point ───────────────────────────────

/// Entry point for the staged pipeline.
///
/// Each stage method consumes the current state and returns the next,
/// making it a compile-time error to skip stages or call them out of
/// order.
pub struct Pipeline;

impl Pipeline {
    /// Validate `config` and store the shapes to draw.
    ///
    /// No buffer is allocated and no randomness is consumed. Call
    /// [`.initialize()`](Pending::initialize) to begin.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidConfig`] or
    /// [`GeneratorError::DegenerateGeometryRange`] if `config` fails
    /// [`GeneratorConfig::validate`].
    #[allow(clippy::new_ret_no_self)]
    pub fn new(config: GeneratorConfig, shapes: Vec<ShapeKind>) -> Result<Pending, GeneratorError> {
        let interior = config.validate()?;
        Ok(Pending {
            config,
            interior,
            shapes,
        })
    }

    /// Like [`new`](Self::new), but takes shape kinds by name.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::InvalidShapeKind`] for the first unknown
    /// name, checked before the config. Otherwise as [`new`](Self::new).
    pub fn from_names<S: AsRef<str>>(
        config: GeneratorConfig,
        names: &[S],
    ) -> Result<Pending, GeneratorError> {
        let shapes = ShapeKind::parse_all(names)?;
        Self::new(config, shapes)
    }
}
