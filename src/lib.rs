/*!
# Particle tracker - histogram-based visual tracking

Rust implementation of a particle filter that follows the position and scale
of one object through a sequence of intensity frames.

## Features

- Second-order autoregressive motion model with per-particle history rings
- Observation model comparing intensity histograms by squared-Hellinger distance
- Deterministic weight-ordered resampling that keeps the particle count fixed
- Histogram engine with joint frequencies and Crutchfield sensor distances
- Optional parallel evaluation of particles (`rayon` feature)

## Modules

- [`filter`] - Particle filters: generic loop, position tracker, configuration
- [`histogram`] - Intensity histograms, conditional entropy, Crutchfield distance
- [`image`] - Intensity frames and rectangles
- [`common`] - Distance metrics, autoregression, RNG, weight utilities
- [`reporter`] - Step observability hooks

## Example

```rust
use particle_tracker_rs::{GrayImage, PositionParticleFilter, Rect, TrackerConfig};

let mut frame = GrayImage::filled(120, 90, 15);
let target = Rect::new(40, 30, 60, 50);
frame.fill_rect(&target, 200);

let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
tracker.init_from_image(&frame, target, 150).unwrap();

for _ in 0..3 {
    tracker.tick(&frame, 1).unwrap();
}
let best = tracker.best().unwrap();
assert!((best.center().0 - 50).abs() <= 10);
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Particle filters and the position tracker
pub mod filter;

/// Per-pixel intensity histograms and entropy-based sensor distances
pub mod histogram;

/// Intensity frames and rectangles
pub mod image;

/// Step observability hooks
pub mod reporter;

/// Low-level utilities (metrics, autoregression, RNG, weights)
pub mod common;

/// Benchmark utilities (synthetic scenarios, scenario runner)
pub mod bench_utils;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Filters
pub use filter::{
    Particle, ParticleFilter, ParticleModel, ParticleSet, PositionModel, PositionParticleFilter,
    PositionState, ResampleSummary, TrackerConfig,
};

// Errors
pub use filter::{FilterError, HistogramError};

// Histograms
pub use histogram::crutchfield::{Crutchfield, DistanceSource};
pub use histogram::Histogram;

// Frames
pub use image::{GrayImage, IntensityMatrix, Rect, RegionSize};

// Reporters
pub use reporter::{CompositeReporter, DebugReporter, LoggingReporter, NoOpReporter, StepReporter};

// Utilities
pub use common::metrics::{DistanceMetric, SetDistanceMetric};
pub use common::rng::SimpleRng;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
