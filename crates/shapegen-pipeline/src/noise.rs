//! Gaussian noise injection.
//!
//! Wraps [`imageproc::noise::gaussian_noise_mut`] to add zero-mean noise
//! to every canvas element, rounded and clamped to `[0, 255]`. The mask
//! is never passed to this stage.
//!
//! The noise is independent per element, so the interleaved canvas buffer
//! is viewed as a single-channel image `width * channels` pixels wide for
//! the duration of the call.

use rand::Rng;

use crate::canvas::Canvas;

/// Add zero-mean Gaussian noise with standard deviation `std` to every
/// element of `canvas`, rounding and clamping to `[0, 255]`.
///
/// The noise seed is drawn from `rng`, so a seeded source reproduces the
/// same noise. Non-positive or non-finite `std` values leave the canvas
/// unchanged and draw nothing from `rng`, since `imageproc`'s underlying
/// function panics on an invalid standard deviation.
pub fn add_gaussian_noise<R: Rng + ?Sized>(canvas: &mut Canvas, std: f64, rng: &mut R) {
    if !std.is_finite() || std <= 0.0 {
        return;
    }

    let seed = rng.next_u64();
    // imageproc truncates toward zero when storing; the 0.5 mean makes
    // that a round-half-up so the noise stays zero-mean.
    imageproc::noise::gaussian_noise_mut(canvas.plane_mut(), 0.5, std, seed);
    log::debug!("added gaussian noise (std {std}) with seed {seed}");
}
