//! Configuration for the position tracker
//!
//! All tunables of the transition and observation models live in one
//! serialisable struct so a tracking run can be reproduced from its JSON
//! snapshot.

use serde::{Deserialize, Serialize};

use super::errors::FilterError;

/// Default number of intensity bins
pub const DEFAULT_BINS: usize = 16;
/// Default seed of the filter's random generator
pub const DEFAULT_SEED: u64 = 234789;
/// Default steepness `k` of `exp(-k·d)`
pub const DEFAULT_LIKELIHOOD_STEEPNESS: f64 = 20.0;

/// Tunables of the position tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Number of intensity bins of every histogram
    pub bins: usize,
    /// Seed of the filter's random generator
    pub seed: u64,
    /// AR coefficients for x and y, most recent first
    pub position_coefficients: Vec<f64>,
    /// AR coefficients for the scale, most recent first
    pub scale_coefficients: Vec<f64>,
    /// Noise variance of the position prediction
    pub position_noise_variance: f64,
    /// Noise variance of the scale prediction
    pub scale_noise_variance: f64,
    /// Constant term of both predictors
    pub ar_constant: f64,
    /// Steepness `k` mapping a histogram distance `d` to `exp(-k·d)`
    pub likelihood_steepness: f64,
    /// Lower bound on predicted scale.
    ///
    /// Sub-rectangles of a uniform object match its reference perfectly, so
    /// on such targets the scale sinks towards this bound. Raise it when the
    /// object size is known not to shrink much.
    pub min_scale: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            seed: DEFAULT_SEED,
            position_coefficients: vec![2.0, -1.0],
            scale_coefficients: vec![2.0, -1.0],
            position_noise_variance: 1.0,
            scale_noise_variance: 0.001,
            ar_constant: 0.0,
            likelihood_steepness: DEFAULT_LIKELIHOOD_STEEPNESS,
            min_scale: 0.1,
        }
    }
}

impl TrackerConfig {
    /// Configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of bins
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the AR coefficients of position and scale together
    pub fn with_coefficients(mut self, coefficients: Vec<f64>) -> Self {
        self.scale_coefficients = coefficients.clone();
        self.position_coefficients = coefficients;
        self
    }

    /// Set both noise variances
    pub fn with_noise(mut self, position_variance: f64, scale_variance: f64) -> Self {
        self.position_noise_variance = position_variance;
        self.scale_noise_variance = scale_variance;
        self
    }

    /// Set the likelihood steepness
    pub fn with_likelihood_steepness(mut self, steepness: f64) -> Self {
        self.likelihood_steepness = steepness;
        self
    }

    /// Set the minimum scale
    pub fn with_min_scale(mut self, min_scale: f64) -> Self {
        self.min_scale = min_scale;
        self
    }

    /// Length of every particle's history window
    #[inline]
    pub fn history_len(&self) -> usize {
        self.position_coefficients.len()
    }

    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), FilterError> {
        let fail = |description: String| Err(FilterError::Configuration { description });

        if self.bins == 0 || self.bins > 256 {
            return fail(format!("bins must be within 1..=256, got {}", self.bins));
        }
        if self.position_coefficients.is_empty() {
            return fail("position_coefficients must not be empty".to_string());
        }
        if self.position_coefficients.len() != self.scale_coefficients.len() {
            return fail(format!(
                "position and scale coefficient counts differ ({} vs {})",
                self.position_coefficients.len(),
                self.scale_coefficients.len()
            ));
        }
        if self
            .position_coefficients
            .iter()
            .chain(&self.scale_coefficients)
            .any(|c| !c.is_finite())
        {
            return fail("AR coefficients must be finite".to_string());
        }
        for (name, variance) in [
            ("position_noise_variance", self.position_noise_variance),
            ("scale_noise_variance", self.scale_noise_variance),
        ] {
            if !variance.is_finite() || variance < 0.0 {
                return fail(format!("{} must be finite and >= 0, got {}", name, variance));
            }
        }
        if !self.ar_constant.is_finite() {
            return fail("ar_constant must be finite".to_string());
        }
        if !(self.likelihood_steepness.is_finite() && self.likelihood_steepness > 0.0) {
            return fail(format!(
                "likelihood_steepness must be positive, got {}",
                self.likelihood_steepness
            ));
        }
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return fail(format!("min_scale must be positive, got {}", self.min_scale));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let config: Self = serde_json::from_str(json).map_err(|e| FilterError::Configuration {
            description: format!("invalid JSON: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
