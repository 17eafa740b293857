//! Core traits for particle filters
//!
//! A particle filter is split into a generic loop
//! ([`ParticleFilter`](super::core::ParticleFilter)) and a domain model that
//! only knows how to move one hypothesis forward and how to score it.

/// Transition and observation model of a particle filter.
///
/// Both operations act on a single particle and must not depend on other
/// particles, so the filter is free to evaluate them in any order or in
/// parallel.
///
/// # Type Parameters
/// - `State` - Per-particle hypothesis (e.g. position and scale histories)
/// - `Observation` - What one tick is conditioned on (e.g. an image frame)
pub trait ParticleModel: Sync {
    /// Per-particle hypothesis
    type State: Clone + Send + Sync;

    /// Evidence consumed by one tick
    type Observation: ?Sized + Sync;

    /// Predict the next state of one particle.
    ///
    /// The observation is available for bounds only (e.g. clamping to the
    /// frame); the prediction itself must not score the evidence.
    fn transition<R: rand::Rng + ?Sized>(
        &self,
        state: &Self::State,
        observation: &Self::Observation,
        rng: &mut R,
    ) -> Self::State;

    /// Non-negative score of how well `state` explains `observation`.
    fn likelihood(&self, state: &Self::State, observation: &Self::Observation) -> f64;
}
