//! shapegen-pipeline: synthetic shape images with pixel-aligned label masks
//! (sans-IO).
//!
//! Produces training data for segmentation models through:
//! random background -> shape sampling -> rasterization into canvas and
//! mask -> Gaussian noise on the canvas.
//!
//! This crate has **no I/O dependencies**: it builds in-memory buffers
//! and returns them. Encoding to files is left to the caller, e.g. via
//! [`Canvas::to_dynamic_image`].
//!
//! Randomness always comes from a caller-supplied [`rand::Rng`]. The
//! plain entry points use [`rand::thread_rng`]; the `*_with_rng`
//! variants take any source, so a seeded [`rand::rngs::StdRng`] makes a
//! run fully reproducible.

pub mod canvas;
pub mod diagnostics;
pub mod label;
pub mod mask;
pub mod noise;
pub mod pipeline;
pub mod raster;
pub mod sample;
pub mod types;

/// Re-export `GrayImage` so callers can use [`Mask::as_image`] without
/// depending on `image` directly.
pub use image::GrayImage;

pub use canvas::Canvas;
pub use diagnostics::PipelineDiagnostics;
pub use label::{BACKGROUND_LABEL, ShapeKind};
pub use mask::Mask;
pub use pipeline::Pipeline;
pub use sample::{Geometry, Interior, ShapeSampler};
pub use types::{
    Dimensions, DrawnShape, ExtentPolicy, Generated, GeneratorConfig, GeneratorError, Point,
    StagedResult,
};

use rand::Rng;

/// Generate one image containing the named shapes, drawn in order.
///
/// Uses the thread-local random source. See [`generate_with_rng`] for the
/// reproducible variant.
///
/// # Pipeline steps
///
/// 1. Validate every name against the label table
/// 2. Validate the config, including the padding margin
/// 3. Allocate the canvas with a random background and an empty mask
/// 4. For each shape: sample a color and geometry, rasterize into both
///    buffers
/// 5. Add Gaussian noise to the canvas
///
/// Returns [`Generated::Masked`] when `config.masked` is set, otherwise
/// [`Generated::Image`].
///
/// # Errors
///
/// Returns [`GeneratorError::InvalidShapeKind`] if any name is unknown.
/// Returns [`GeneratorError::InvalidConfig`] for a zero-sized canvas.
/// Returns [`GeneratorError::DegenerateGeometryRange`] if
/// `2 * pad >= min(height, width)`.
pub fn generate<S: AsRef<str>>(
    names: &[S],
    config: &GeneratorConfig,
) -> Result<Generated, GeneratorError> {
    generate_with_rng(names, config, &mut rand::thread_rng())
}

/// Like [`generate`], drawing all randomness from `rng`.
///
/// Validation runs before anything is drawn from `rng`, so a failed call
/// leaves the random source untouched.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_with_rng<S: AsRef<str>, R: Rng + ?Sized>(
    names: &[S],
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Generated, GeneratorError> {
    let kinds = ShapeKind::parse_all(names)?;
    generate_kinds(&kinds, config, rng)
}

/// Generate one image containing a single named shape.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_one(name: &str, config: &GeneratorConfig) -> Result<Generated, GeneratorError> {
    generate_one_with_rng(name, config, &mut rand::thread_rng())
}

/// Like [`generate_one`], drawing all randomness from `rng`.
///
/// # Errors
///
/// Same as [`generate`].
pub fn generate_one_with_rng<R: Rng + ?Sized>(
    name: &str,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Generated, GeneratorError> {
    generate_with_rng(&[name], config, rng)
}

/// Generate one image from already-parsed shape kinds.
///
/// # Errors
///
/// Returns [`GeneratorError::InvalidConfig`] or
/// [`GeneratorError::DegenerateGeometryRange`] if `config` is invalid.
pub fn generate_kinds<R: Rng + ?Sized>(
    kinds: &[ShapeKind],
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Generated, GeneratorError> {
    let masked = config.masked;
    let result = generate_staged(kinds, config, rng)?;
    Ok(result.into_generated(masked))
}

/// Run the full pipeline and keep everything it produced: both buffers,
/// the drawn shapes, and diagnostics.
///
/// Ignores `config.masked`; the mask is always returned.
///
/// # Errors
///
/// Same as [`generate_kinds`].
pub fn generate_staged<R: Rng + ?Sized>(
    kinds: &[ShapeKind],
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<StagedResult, GeneratorError> {
    let result = Pipeline::new(config.clone(), kinds.to_vec())?
        .initialize(rng)
        .draw(rng)
        .add_noise(rng)
        .into_result();
    log::debug!(
        "generated {}x{}x{} image with {} shape(s)",
        config.height,
        config.width,
        config.channels,
        result.shapes.len(),
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    /// Random source that counts every draw.
    struct CountingRng {
        inner: StdRng,
        draws: usize,
    }

    impl CountingRng {
        fn new(seed: u64) -> Self {
            Self {
                inner: StdRng::seed_from_u64(seed),
                draws: 0,
            }
        }
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            height: 48,
            width: 64,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn unknown_kind_is_rejected_without_drawing() {
        let mut rng = CountingRng::new(0);
        let result = generate_with_rng(&["circle", "hexagon"], &small_config(), &mut rng);
        assert_eq!(
            result,
            Err(GeneratorError::InvalidShapeKind {
                value: "hexagon".to_owned(),
                valid: "rectangle, square, triangle, circle".to_owned(),
            })
        );
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn kind_is_checked_before_padding() {
        let config = GeneratorConfig {
            pad: 1000,
            ..small_config()
        };
        let result = generate_one_with_rng("star", &config, &mut CountingRng::new(0));
        assert!(matches!(
            result,
            Err(GeneratorError::InvalidShapeKind { .. })
        ));
    }

    #[test]
    fn degenerate_padding_is_rejected_without_drawing() {
        let config = GeneratorConfig {
            pad: 24,
            ..small_config()
        };
        let mut rng = CountingRng::new(0);
        let result = generate_one_with_rng("square", &config, &mut rng);
        assert_eq!(
            result,
            Err(GeneratorError::DegenerateGeometryRange {
                pad: 24,
                width: 64,
                height: 48,
            })
        );
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn masked_flag_selects_output_variant() {
        let mut rng = StdRng::seed_from_u64(1);
        let masked = generate_one_with_rng("triangle", &small_config(), &mut rng).unwrap();
        assert!(matches!(masked, Generated::Masked(..)));
        assert!(masked.mask().is_some());

        let config = GeneratorConfig {
            masked: false,
            ..small_config()
        };
        let plain = generate_one_with_rng("triangle", &config, &mut rng).unwrap();
        assert!(matches!(plain, Generated::Image(_)));
        assert_eq!(plain.canvas().shape(), (48, 64, 3));
    }

    #[test]
    fn same_seed_same_output() {
        let names = ["rectangle", "circle", "square"];
        let a = generate_with_rng(&names, &small_config(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_with_rng(&names, &small_config(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generate_kinds_matches_named_variant() {
        let kinds = [ShapeKind::Square, ShapeKind::Circle];
        let a = generate_kinds(&kinds, &small_config(), &mut StdRng::seed_from_u64(4)).unwrap();
        let b = generate_with_rng(
            &["square", "circle"],
            &small_config(),
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn staged_result_always_carries_mask() {
        let config = GeneratorConfig {
            masked: false,
            ..small_config()
        };
        let staged =
            generate_staged(&[ShapeKind::Circle], &config, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(staged.mask.shape(), (48, 64));
        assert_eq!(staged.shapes.len(), 1);
    }

    #[test]
    fn thread_rng_entry_points_work() {
        let generated = generate(&["rectangle", "square"], &small_config()).unwrap();
        assert_eq!(generated.canvas().shape(), (48, 64, 3));
        let single = generate_one("circle", &small_config()).unwrap();
        let labels = single.mask().unwrap().distinct_labels();
        assert!(labels.iter().all(|&l| l == 0 || l == 4));
    }
}
