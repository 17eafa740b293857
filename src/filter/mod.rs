//! Particle filter implementations
//!
//! This module provides the generic filter and its position-tracking
//! specialisation:
//!
//! - [`ParticleModel`] - Transition and likelihood contract of a domain model
//! - [`ParticleSet`] / [`Particle`] - Weighted hypotheses and deterministic resampling
//! - [`ParticleFilter`] - Transition → likelihood → resample loop over any model
//! - [`PositionParticleFilter`] - Position and scale tracker on intensity frames
//! - [`TrackerConfig`] - Serialisable tunables of the tracker

pub mod config;
pub mod core;
pub mod errors;
pub mod particle;
pub mod position;
pub mod traits;

pub use self::core::ParticleFilter;
pub use config::TrackerConfig;
pub use errors::{FilterError, HistogramError};
pub use particle::{Particle, ParticleSet, ResampleSummary};
pub use position::{PositionModel, PositionParticleFilter, PositionState};
pub use traits::ParticleModel;
