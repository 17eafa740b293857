//! Benchmark utilities shared between Criterion benchmarks, the
//! benchmark_single binary and the integration tests.
//!
//! This module provides:
//! - JSON schema for synthetic scenario files
//! - Frame rendering and ground truth for a moving rectangle
//! - A complete tracking run with per-frame error

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;

use crate::common::rng::{Rng, SimpleRng};
use crate::filter::{FilterError, PositionParticleFilter, TrackerConfig};
use crate::image::{GrayImage, Rect};

// =============================================================================
// JSON Schema for Scenario Files
// =============================================================================

/// Size of the tracked object in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectJson {
    pub width: f64,
    pub height: f64,
}

/// A bright rectangle moving at constant velocity over a flat background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioJson {
    pub width: usize,
    pub height: usize,
    pub background: u8,
    pub foreground: u8,
    pub object: ObjectJson,
    /// Centre in the first frame
    pub start: [f64; 2],
    /// Centre displacement per frame
    pub velocity: [f64; 2],
    pub frames: usize,
    /// Amplitude of uniform per-pixel noise added to every frame
    #[serde(default)]
    pub noise: u8,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

impl ScenarioJson {
    /// Built-in scenario: a 20×20 object crossing a 160×120 frame diagonally.
    pub fn linear() -> Self {
        Self {
            width: 160,
            height: 120,
            background: 30,
            foreground: 210,
            object: ObjectJson {
                width: 20.0,
                height: 20.0,
            },
            start: [40.0, 40.0],
            velocity: [1.0, 0.5],
            frames: 40,
            noise: 0,
            tracker: TrackerConfig::default(),
        }
    }

    /// Object rectangle in frame `step`
    pub fn truth(&self, step: usize) -> Rect {
        let t = step as f64;
        Rect::centered(
            self.start[0] + self.velocity[0] * t,
            self.start[1] + self.velocity[1] * t,
            self.object.width,
            self.object.height,
        )
    }

    /// Render frame `step`. Noise is seeded by the step, so frames are reproducible.
    pub fn render_frame(&self, step: usize) -> GrayImage {
        let mut frame = GrayImage::filled(self.width, self.height, self.background);
        frame.fill_rect(&self.truth(step), self.foreground);
        if self.noise > 0 {
            let mut rng = SimpleRng::new(step as u64 + 1);
            let amplitude = self.noise as f64;
            for y in 0..self.height {
                for x in 0..self.width {
                    let offset = (rng.rand() * 2.0 - 1.0) * amplitude;
                    let value = (frame.get(x, y) as f64 + offset).round().clamp(0.0, 255.0);
                    frame.set(x, y, value as u8);
                }
            }
        }
        frame
    }
}

/// Load a scenario from a JSON file
pub fn load_scenario(path: &str) -> Result<ScenarioJson, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

// =============================================================================
// Scenario Runner
// =============================================================================

/// Outcome of tracking a scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRun {
    /// Best rectangle after every frame
    pub estimates: Vec<Rect>,
    /// Distance between estimated and true centre per frame
    pub center_errors: Vec<f64>,
}

impl ScenarioRun {
    /// Mean of the per-frame centre errors
    pub fn mean_error(&self) -> f64 {
        if self.center_errors.is_empty() {
            return 0.0;
        }
        self.center_errors.iter().sum::<f64>() / self.center_errors.len() as f64
    }
}

/// Track the scenario's object, initialising on its first-frame rectangle.
pub fn run_scenario(
    scenario: &ScenarioJson,
    particles: usize,
    subticks: usize,
) -> Result<ScenarioRun, FilterError> {
    let mut tracker = PositionParticleFilter::new(scenario.tracker.clone())?;
    tracker.init_from_image(&scenario.render_frame(0), scenario.truth(0), particles)?;

    let mut estimates = Vec::with_capacity(scenario.frames);
    let mut center_errors = Vec::with_capacity(scenario.frames);
    for step in 1..=scenario.frames {
        let frame = scenario.render_frame(step);
        tracker.tick(&frame, subticks)?;
        let best = tracker.best().ok_or(FilterError::NotInitialized)?;
        let (ex, ey) = best.center();
        let (tx, ty) = scenario.truth(step).center();
        center_errors.push((((ex - tx).pow(2) + (ey - ty).pow(2)) as f64).sqrt());
        estimates.push(best);
    }
    Ok(ScenarioRun {
        estimates,
        center_errors,
    })
}
