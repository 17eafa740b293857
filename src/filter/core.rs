//! Generic particle filter loop
//!
//! One step is strictly transition → likelihood → resample over the whole
//! set. Transition and likelihood touch one particle at a time and run in
//! parallel with the `rayon` feature; every particle draws from its own
//! generator derived from a per-step base seed, so the result does not
//! depend on evaluation order.

use rand::RngCore;

use super::errors::FilterError;
use super::particle::{ParticleSet, ResampleSummary};
use super::traits::ParticleModel;
use crate::common::rng::SimpleRng;
use crate::reporter::{NoOpReporter, StepReporter};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Number of top particles written to the trace log after scoring
const TRACE_TOP: usize = 10;

/// Particle filter driving a [`ParticleModel`].
#[derive(Debug, Clone)]
pub struct ParticleFilter<M: ParticleModel> {
    model: M,
    particles: ParticleSet<M::State>,
    rng: SimpleRng,
    ticks: usize,
}

impl<M: ParticleModel> ParticleFilter<M> {
    /// Filter without particles; call [`ParticleFilter::reset`] before stepping.
    pub fn new(model: M, seed: u64) -> Self {
        Self {
            model,
            particles: ParticleSet::new(),
            rng: SimpleRng::new(seed),
            ticks: 0,
        }
    }

    /// Replace the particle set and restart the tick counter.
    pub fn reset<I: IntoIterator<Item = M::State>>(&mut self, states: I) {
        self.particles = ParticleSet::from_states(states);
        self.ticks = 0;
    }

    /// The model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Current particles
    pub fn particles(&self) -> &ParticleSet<M::State> {
        &self.particles
    }

    /// Completed steps since the last reset
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Run one transition, likelihood and resample cycle.
    pub fn step(&mut self, observation: &M::Observation) -> Result<ResampleSummary, FilterError> {
        self.step_with_reporter(observation, &mut NoOpReporter)
    }

    /// [`ParticleFilter::step`] with reporter callbacks after every phase.
    pub fn step_with_reporter<Rep: StepReporter<M::State>>(
        &mut self,
        observation: &M::Observation,
        reporter: &mut Rep,
    ) -> Result<ResampleSummary, FilterError> {
        if self.particles.is_empty() {
            return Err(FilterError::NotInitialized);
        }

        let base_seed = self.rng.next_u64();
        self.transition_all(observation, base_seed);
        log::debug!("Transition: {} particles", self.particles.len());
        reporter.on_transition(self.particles.particles());

        self.likelihood_all(observation);
        if log::log_enabled!(log::Level::Trace) {
            let top: Vec<String> = self
                .particles
                .ranked()
                .iter()
                .take(TRACE_TOP)
                .map(|p| format!("{}:{:.4}", p.id, p.weight))
                .collect();
            log::trace!("Best likelihoods: {}", top.join(" "));
        }
        reporter.on_likelihood(self.particles.particles());

        let summary = self.particles.resample()?;
        log::debug!(
            "Resample: {} parents, ESS={:.2}",
            summary.distinct_parents,
            summary.effective_sample_size
        );
        reporter.on_resample(&summary, self.particles.particles());

        self.ticks += 1;
        reporter.on_tick_complete(self.ticks, self.particles.particles());
        Ok(summary)
    }

    fn transition_all(&mut self, observation: &M::Observation, base_seed: u64) {
        let model = &self.model;

        #[cfg(feature = "rayon")]
        self.particles
            .particles_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| {
                let mut rng = SimpleRng::derive(base_seed, i);
                p.state = model.transition(&p.state, observation, &mut rng);
            });

        #[cfg(not(feature = "rayon"))]
        for (i, p) in self.particles.particles_mut().iter_mut().enumerate() {
            let mut rng = SimpleRng::derive(base_seed, i);
            p.state = model.transition(&p.state, observation, &mut rng);
        }
    }

    fn likelihood_all(&mut self, observation: &M::Observation) {
        let model = &self.model;

        #[cfg(feature = "rayon")]
        self.particles
            .particles_mut()
            .par_iter_mut()
            .for_each(|p| p.weight = model.likelihood(&p.state, observation));

        #[cfg(not(feature = "rayon"))]
        for p in self.particles.particles_mut() {
            p.weight = model.likelihood(&p.state, observation);
        }
    }
}
