//! Particles, particle sets and deterministic resampling
//!
//! Resampling is deterministic given the weights: particles are visited in
//! descending weight order and each contributes `round(w·N)` clones until
//! `N` clones exist. A rounding shortfall is padded with clones of the best
//! particle, so the set size never changes.

use serde::Serialize;

use super::errors::FilterError;
use crate::common::utils::{effective_sample_size, normalize_weights, rank_descending, Normalization};

/// One weighted hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle<S> {
    /// Hypothesised state
    pub state: S,
    /// Last observation score. Normalised by resampling; zero on fresh clones.
    pub weight: f64,
    /// Diagnostic identity, unique within a set; clones get a new one
    pub id: u64,
    /// Identity of the initial particle this one descends from
    pub ancestor: u64,
}

/// Statistics of one resampling pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResampleSummary {
    /// Number of particles after resampling (always the set size)
    pub particle_count: usize,
    /// Number of particles that produced at least one clone
    pub distinct_parents: usize,
    /// Effective sample size `1 / Σ w²` of the normalised weights
    pub effective_sample_size: f64,
    /// All weights were zero and were replaced by uniform weights
    pub degenerate: bool,
}

/// Ordered collection of particles with a fixed size.
#[derive(Debug, Clone)]
pub struct ParticleSet<S> {
    particles: Vec<Particle<S>>,
    next_id: u64,
}

impl<S> Default for ParticleSet<S> {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            next_id: 0,
        }
    }
}

impl<S: Clone> ParticleSet<S> {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// One particle per state, each its own ancestor, all with zero weight.
    pub fn from_states<I: IntoIterator<Item = S>>(states: I) -> Self {
        let particles: Vec<Particle<S>> = states
            .into_iter()
            .enumerate()
            .map(|(i, state)| Particle {
                state,
                weight: 0.0,
                id: i as u64,
                ancestor: i as u64,
            })
            .collect();
        let next_id = particles.len() as u64;
        Self { particles, next_id }
    }

    /// Number of particles
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the set holds no particles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in set order
    #[inline]
    pub fn particles(&self) -> &[Particle<S>] {
        &self.particles
    }

    /// Mutable access for per-particle updates. The set size cannot change.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut [Particle<S>] {
        &mut self.particles
    }

    /// Iterate over particles in set order
    pub fn iter(&self) -> std::slice::Iter<'_, Particle<S>> {
        self.particles.iter()
    }

    /// Current weights in set order
    pub fn weights(&self) -> Vec<f64> {
        self.particles.iter().map(|p| p.weight).collect()
    }

    /// Particles by descending weight; ties keep set order.
    pub fn ranked(&self) -> Vec<&Particle<S>> {
        rank_descending(&self.weights())
            .into_iter()
            .map(|i| &self.particles[i])
            .collect()
    }

    /// Highest-weight particle (first in set order on ties)
    pub fn best(&self) -> Option<&Particle<S>> {
        self.ranked().into_iter().next()
    }

    fn clone_particle(&mut self, index: usize) -> Particle<S> {
        let parent = &self.particles[index];
        let clone = Particle {
            state: parent.state.clone(),
            weight: 0.0,
            id: self.next_id,
            ancestor: parent.ancestor,
        };
        self.next_id += 1;
        clone
    }

    /// Replace the set by weight-proportional clones of its members.
    ///
    /// 1. Normalise weights to sum to one. An all-zero set falls back to
    ///    uniform weights.
    /// 2. Visit particles by descending weight (stable), appending
    ///    `round(w·N)` clones each and stopping at exactly `N`.
    /// 3. Pad a shortfall with clones of the highest-weight particle.
    ///
    /// Clones receive a new id and zero weight and keep their ancestor.
    ///
    /// # Errors
    /// `NotInitialized` for an empty set, `NumericalInstability` if any
    /// weight is negative or not finite. The set is unchanged on error.
    pub fn resample(&mut self) -> Result<ResampleSummary, FilterError> {
        let n = self.particles.len();
        if n == 0 {
            return Err(FilterError::NotInitialized);
        }

        let mut weights = self.weights();
        let degenerate = match normalize_weights(&mut weights) {
            Some(Normalization::Proportional) => false,
            Some(Normalization::UniformFallback) => {
                log::warn!(
                    "All {} particle weights are zero; resampling with uniform weights",
                    n
                );
                true
            }
            None => {
                return Err(FilterError::NumericalInstability {
                    description: "particle weights must be finite and non-negative".to_string(),
                })
            }
        };
        for (particle, &w) in self.particles.iter_mut().zip(&weights) {
            particle.weight = w;
        }

        let order = rank_descending(&weights);
        let mut resampled = Vec::with_capacity(n);
        let mut is_parent = vec![false; n];

        'outer: for &i in &order {
            let copies = (weights[i] * n as f64).round() as usize;
            for _ in 0..copies {
                if resampled.len() == n {
                    break 'outer;
                }
                resampled.push(self.clone_particle(i));
                is_parent[i] = true;
            }
        }

        let best = order[0];
        while resampled.len() < n {
            resampled.push(self.clone_particle(best));
            is_parent[best] = true;
        }

        let summary = ResampleSummary {
            particle_count: n,
            distinct_parents: is_parent.iter().filter(|&&p| p).count(),
            effective_sample_size: effective_sample_size(&weights),
            degenerate,
        };
        self.particles = resampled;
        Ok(summary)
    }
}
