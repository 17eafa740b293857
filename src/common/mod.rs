//! Common utilities shared by the histogram engine and the particle filters.
//!
//! This module contains distance metrics, the autoregressive predictor,
//! the deterministic RNG and weight helpers.

pub mod autoregression;
pub mod metrics;
pub mod rng;
pub mod utils;
