//! Observability for particle filter execution.
//!
//! This module provides the [`StepReporter`] trait for debugging and research
//! instrumentation. Reporters receive callbacks at the phase boundaries of
//! every filter step without polluting the core algorithm logic.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Use Cases
//!
//! - **Debugging**: Capture particle sets after each phase
//! - **Research**: Follow lineage and effective sample size over time
//! - **Logging**: Emit structured events for monitoring
//!
//! # Example
//!
//! ```
//! use particle_tracker_rs::reporter::{DebugReporter, StepReporter};
//!
//! let mut reporter: DebugReporter<f64> = DebugReporter::new();
//! reporter.on_transition(&[]);
//! assert_eq!(reporter.transition_events().len(), 1);
//! ```

use crate::filter::particle::{Particle, ResampleSummary};

// ============================================================================
// StepReporter Trait
// ============================================================================

/// Observability trait for filter step execution.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// # Thread Safety
///
/// Reporters use `&mut self` for callbacks and are only ever called from the
/// thread driving the filter, also when the `rayon` feature is enabled.
///
/// # Performance
///
/// Callbacks receive references to avoid cloning overhead. If you need
/// to store the data, clone it within your callback implementation.
pub trait StepReporter<S> {
    /// Called after every particle has been moved by the transition model.
    ///
    /// Weights still hold the scores of the previous step.
    fn on_transition(&mut self, _particles: &[Particle<S>]) {}

    /// Called after every particle has been scored against the observation.
    fn on_likelihood(&mut self, _particles: &[Particle<S>]) {}

    /// Called after resampling with the summary and the new particle set.
    fn on_resample(&mut self, _summary: &ResampleSummary, _particles: &[Particle<S>]) {}

    /// Called once a full transition, likelihood and resample cycle is done.
    ///
    /// `tick` counts completed cycles since the filter was initialised,
    /// starting at one.
    fn on_tick_complete(&mut self, _tick: usize, _particles: &[Particle<S>]) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
///
/// This is the default reporter used when no observability is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl<S> StepReporter<S> for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// # Memory Usage
///
/// Every event stores a clone of the full particle set. Use it on short
/// runs or small sets only.
#[derive(Debug, Clone)]
pub struct DebugReporter<S> {
    transitions: Vec<Vec<Particle<S>>>,
    likelihoods: Vec<Vec<Particle<S>>>,
    resamples: Vec<(ResampleSummary, Vec<Particle<S>>)>,
    ticks: Vec<(usize, Vec<Particle<S>>)>,
}

impl<S> Default for DebugReporter<S> {
    fn default() -> Self {
        Self {
            transitions: Vec::new(),
            likelihoods: Vec::new(),
            resamples: Vec::new(),
            ticks: Vec::new(),
        }
    }
}

impl<S: Clone> DebugReporter<S> {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.likelihoods.clear();
        self.resamples.clear();
        self.ticks.clear();
    }

    /// Get captured transition events.
    pub fn transition_events(&self) -> &[Vec<Particle<S>>] {
        &self.transitions
    }

    /// Get captured likelihood events.
    pub fn likelihood_events(&self) -> &[Vec<Particle<S>>] {
        &self.likelihoods
    }

    /// Get captured resample events.
    pub fn resample_events(&self) -> &[(ResampleSummary, Vec<Particle<S>>)] {
        &self.resamples
    }

    /// Get captured tick completion events.
    pub fn tick_events(&self) -> &[(usize, Vec<Particle<S>>)] {
        &self.ticks
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.transitions.len() + self.likelihoods.len() + self.resamples.len() + self.ticks.len()
    }
}

impl<S: Clone> StepReporter<S> for DebugReporter<S> {
    fn on_transition(&mut self, particles: &[Particle<S>]) {
        self.transitions.push(particles.to_vec());
    }

    fn on_likelihood(&mut self, particles: &[Particle<S>]) {
        self.likelihoods.push(particles.to_vec());
    }

    fn on_resample(&mut self, summary: &ResampleSummary, particles: &[Particle<S>]) {
        self.resamples.push((*summary, particles.to_vec()));
    }

    fn on_tick_complete(&mut self, tick: usize, particles: &[Particle<S>]) {
        self.ticks.push((tick, particles.to_vec()));
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// # Log Levels
///
/// - `on_tick_complete`: INFO
/// - `on_resample`: DEBUG
/// - `on_transition`, `on_likelihood`: TRACE
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    /// Whether to include per-particle details in log messages
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes particle details.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl<S> StepReporter<S> for LoggingReporter {
    fn on_transition(&mut self, particles: &[Particle<S>]) {
        log::trace!("Transition complete: {} particles", particles.len());
    }

    fn on_likelihood(&mut self, particles: &[Particle<S>]) {
        let max = particles.iter().map(|p| p.weight).fold(0.0, f64::max);
        log::trace!(
            "Likelihood complete: {} particles, max likelihood {:.4}",
            particles.len(),
            max
        );
        if self.verbose {
            for p in particles {
                log::trace!("  Particle {} (ancestor {}): {:.6}", p.id, p.ancestor, p.weight);
            }
        }
    }

    fn on_resample(&mut self, summary: &ResampleSummary, _particles: &[Particle<S>]) {
        log::debug!(
            "Resample: {} particles from {} parents, ESS={:.2}{}",
            summary.particle_count,
            summary.distinct_parents,
            summary.effective_sample_size,
            if summary.degenerate { " (degenerate)" } else { "" }
        );
    }

    fn on_tick_complete(&mut self, tick: usize, particles: &[Particle<S>]) {
        log::info!("Tick {} complete: {} particles", tick, particles.len());
    }
}

// ============================================================================
// CompositeReporter
// ============================================================================

/// Reporter that forwards events to two child reporters.
#[derive(Debug, Clone)]
pub struct CompositeReporter<A, B> {
    first: A,
    second: B,
}

impl<A, B> CompositeReporter<A, B> {
    /// Create a new composite reporter.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Get a reference to the first reporter.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a reference to the second reporter.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Consume and return both reporters.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<S, A: StepReporter<S>, B: StepReporter<S>> StepReporter<S> for CompositeReporter<A, B> {
    fn on_transition(&mut self, particles: &[Particle<S>]) {
        self.first.on_transition(particles);
        self.second.on_transition(particles);
    }

    fn on_likelihood(&mut self, particles: &[Particle<S>]) {
        self.first.on_likelihood(particles);
        self.second.on_likelihood(particles);
    }

    fn on_resample(&mut self, summary: &ResampleSummary, particles: &[Particle<S>]) {
        self.first.on_resample(summary, particles);
        self.second.on_resample(summary, particles);
    }

    fn on_tick_complete(&mut self, tick: usize, particles: &[Particle<S>]) {
        self.first.on_tick_complete(tick, particles);
        self.second.on_tick_complete(tick, particles);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ResampleSummary {
        ResampleSummary {
            particle_count: 1,
            distinct_parents: 1,
            effective_sample_size: 1.0,
            degenerate: false,
        }
    }

    fn particle(state: f64) -> Particle<f64> {
        Particle {
            state,
            weight: 0.5,
            id: 7,
            ancestor: 2,
        }
    }

    #[test]
    fn test_noop_reporter() {
        let mut reporter = NoOpReporter::new();
        StepReporter::<f64>::on_transition(&mut reporter, &[]);
        StepReporter::<f64>::on_tick_complete(&mut reporter, 1, &[]);
    }

    #[test]
    fn test_debug_reporter_captures_events() {
        let mut reporter: DebugReporter<f64> = DebugReporter::new();
        assert_eq!(reporter.total_events(), 0);

        reporter.on_transition(&[particle(1.0)]);
        reporter.on_likelihood(&[particle(1.0)]);
        reporter.on_resample(&summary(), &[particle(2.0)]);
        reporter.on_tick_complete(1, &[particle(2.0)]);
        reporter.on_tick_complete(2, &[]);

        assert_eq!(reporter.transition_events().len(), 1);
        assert_eq!(reporter.likelihood_events().len(), 1);
        assert_eq!(reporter.resample_events().len(), 1);
        assert_eq!(reporter.tick_events().len(), 2);
        assert_eq!(reporter.total_events(), 5);
        assert_eq!(reporter.resample_events()[0].1[0].state, 2.0);
        assert_eq!(reporter.tick_events()[1].0, 2);

        reporter.clear();
        assert_eq!(reporter.total_events(), 0);
    }

    #[test]
    fn test_logging_reporter() {
        // Just verify it doesn't panic without a logger installed
        let mut reporter = LoggingReporter::new();
        reporter.on_likelihood(&[particle(0.0)]);
        reporter.on_resample(&summary(), &[particle(0.0)]);

        let mut verbose = LoggingReporter::verbose();
        verbose.on_likelihood(&[particle(0.0)]);
    }

    #[test]
    fn test_composite_reporter() {
        let mut composite =
            CompositeReporter::new(DebugReporter::<f64>::new(), LoggingReporter::new());
        composite.on_transition(&[particle(3.0)]);
        composite.on_tick_complete(1, &[]);

        assert_eq!(composite.first().transition_events().len(), 1);
        let (debug, _logging) = composite.into_parts();
        assert_eq!(debug.tick_events().len(), 1);
    }

    #[test]
    fn test_reporter_default_implementations() {
        struct MinimalReporter;
        impl StepReporter<f64> for MinimalReporter {}

        let mut reporter = MinimalReporter;
        reporter.on_transition(&[]);
        reporter.on_likelihood(&[]);
        reporter.on_resample(&summary(), &[]);
        reporter.on_tick_complete(1, &[]);
    }
}
