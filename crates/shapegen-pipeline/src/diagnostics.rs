//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Every staged run (see [`crate::pipeline`]) collects diagnostics
//! alongside the generated buffers. They are meant for inspecting what a
//! generation call actually drew: background color, per-shape coverage,
//! and how much of the canvas the noise stage touched.
//!
//! Duration measurements use [`std::time::Duration`]. Timestamps are
//! captured via the `web-time` crate, which uses `performance.now()` on
//! WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::label::{ShapeKind, label_name};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single generation run.
///
/// The noise stage is `None` when it was skipped (non-positive `noise_std`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: canvas and mask allocation with a random background.
    pub initialize: StageDiagnostics,
    /// Stage 2: shape sampling and rasterization.
    pub draw: StageDiagnostics,
    /// Stage 3: Gaussian noise (only when `noise_std > 0`).
    pub noise: Option<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Coverage of one drawn shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeCoverage {
    /// Which kind of shape was drawn.
    pub kind: ShapeKind,
    /// Pixels the shape covered when it was drawn, before any later shape
    /// overwrote part of it.
    pub covered_pixels: u64,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Canvas initialization metrics.
    Initialize {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
        /// Channels per pixel.
        channels: u8,
        /// Sampled background color, one value per channel.
        background: Vec<u8>,
    },
    /// Shape drawing metrics.
    Draw {
        /// Padding margin used for sampling.
        pad: u32,
        /// Each drawn shape, in drawing order.
        shapes: Vec<ShapeCoverage>,
    },
    /// Noise injection metrics.
    Noise {
        /// Standard deviation of the noise.
        std: f64,
        /// Number of canvas elements whose value changed.
        changed_elements: u64,
        /// Total number of canvas elements.
        total_elements: u64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Canvas width in pixels.
    pub image_width: u32,
    /// Canvas height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of shapes drawn.
    pub shape_count: usize,
    /// Final pixel count per label present in the mask, ascending by label.
    pub label_counts: Vec<(u8, u64)>,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Generation Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Canvas: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![("Initialize", &self.initialize), ("Draw", &self.draw)];
        if let Some(ref noise) = self.noise {
            stages.push(("Noise", noise));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        let labels = self
            .summary
            .label_counts
            .iter()
            .map(|(label, count)| format!("{}={count}", label_name(*label).unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            "Shapes: {}  |  Labels: {labels}",
            self.summary.shape_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Initialize {
            width,
            height,
            channels,
            background,
        } => format!("{height}x{width}x{channels} background={background:?}"),
        StageMetrics::Draw { pad, shapes } => {
            let drawn = shapes
                .iter()
                .map(|s| format!("{}({}px)", s.kind, s.covered_pixels))
                .collect::<Vec<_>>()
                .join(", ");
            format!("pad={pad} [{drawn}]")
        }
        StageMetrics::Noise {
            std,
            changed_elements,
            total_elements,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let ratio = if *total_elements > 0 {
                *changed_elements as f64 / *total_elements as f64 * 100.0
            } else {
                0.0
            };
            format!("std={std:.2} changed={changed_elements} ({ratio:.1}%)")
        }
    }
}

/// Count elements that differ between two equally sized buffers.
pub(crate) fn count_changed(before: &[u8], after: &[u8]) -> u64 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| u64::from(a != b))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_diagnostics() -> PipelineDiagnostics {
        PipelineDiagnostics {
            initialize: StageDiagnostics {
                duration: Duration::from_millis(2),
                metrics: StageMetrics::Initialize {
                    width: 64,
                    height: 32,
                    channels: 3,
                    background: vec![10, 20, 30],
                },
            },
            draw: StageDiagnostics {
                duration: Duration::from_millis(5),
                metrics: StageMetrics::Draw {
                    pad: 10,
                    shapes: vec![
                        ShapeCoverage {
                            kind: ShapeKind::Circle,
                            covered_pixels: 113,
                        },
                        ShapeCoverage {
                            kind: ShapeKind::Square,
                            covered_pixels: 49,
                        },
                    ],
                },
            },
            noise: Some(StageDiagnostics {
                duration: Duration::from_millis(3),
                metrics: StageMetrics::Noise {
                    std: 20.0,
                    changed_elements: 6000,
                    total_elements: 6144,
                },
            }),
            total_duration: Duration::from_millis(10),
            summary: PipelineSummary {
                image_width: 64,
                image_height: 32,
                pixel_count: 2048,
                shape_count: 2,
                label_counts: vec![(0, 1900), (2, 49), (4, 99)],
            },
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn count_changed_works() {
        assert_eq!(count_changed(&[1, 2, 3, 4], &[1, 0, 3, 0]), 2);
        assert_eq!(count_changed(&[], &[]), 0);
    }

    #[test]
    fn report_lists_every_stage_and_label() {
        let report = sample_diagnostics().report();
        assert!(report.contains("Generation Diagnostics Report"));
        assert!(report.contains("Initialize"));
        assert!(report.contains("circle(113px)"));
        assert!(report.contains("Noise"));
        assert!(report.contains("background=1900"));
        assert!(report.contains("square=49"));
    }

    #[test]
    fn report_omits_skipped_noise_stage() {
        let mut diag = sample_diagnostics();
        diag.noise = None;
        let report = diag.report();
        assert!(!report.contains("std="));
    }

    #[test]
    fn serde_roundtrip_preserves_durations() {
        let diag = sample_diagnostics();
        let json = serde_json::to_string(&diag).ok();
        let back: Option<PipelineDiagnostics> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(back, Some(diag));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let json = r#"{"duration": -1.0, "metrics": {"Draw": {"pad": 0, "shapes": []}}}"#;
        assert!(serde_json::from_str::<StageDiagnostics>(json).is_err());
    }
}
