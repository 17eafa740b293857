//! Position and scale tracker over intensity frames
//!
//! Every particle hypothesises the centre `(x, y)` and the scale of a
//! rectangle of fixed logical size. Centre and scale evolve with separate
//! autoregressive predictors. A hypothesis is scored by comparing the
//! intensity histogram under its rectangle with a reference histogram taken
//! from the initial selection:
//!
//! ```text
//! weight = exp(-k · squared_hellinger(h_candidate, h_reference))
//! ```
//!
//! which is `1` for a perfect match and decays quickly with distance.

use nalgebra::DMatrix;

use super::config::TrackerConfig;
use super::core::ParticleFilter;
use super::errors::{FilterError, HistogramError};
use super::particle::{ParticleSet, ResampleSummary};
use super::traits::ParticleModel;
use crate::common::autoregression::{predict, HistoryRing};
use crate::common::metrics::{distance, DistanceMetric};
use crate::histogram::normalized_histogram;
use crate::image::{GrayImage, Rect, RegionSize};
use crate::reporter::{NoOpReporter, StepReporter};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

// ============================================================================
// State
// ============================================================================

/// Hypothesis of one particle: centre and scale histories plus the logical
/// size of the tracked object at scale one.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    x: HistoryRing,
    y: HistoryRing,
    scale: HistoryRing,
    width: f64,
    height: f64,
}

impl PositionState {
    /// State resting at `(x, y)` with scale one and a window of
    /// `history_len` identical entries.
    ///
    /// # Panics
    /// If `history_len` is zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64, history_len: usize) -> Self {
        Self {
            x: HistoryRing::filled(history_len, x),
            y: HistoryRing::filled(history_len, y),
            scale: HistoryRing::filled(history_len, 1.0),
            width,
            height,
        }
    }

    /// State with explicit histories, most recent first.
    ///
    /// # Panics
    /// If a history is empty or the lengths differ.
    pub fn with_history(x: &[f64], y: &[f64], scale: &[f64], width: f64, height: f64) -> Self {
        assert!(
            x.len() == y.len() && y.len() == scale.len(),
            "history lengths differ: {} / {} / {}",
            x.len(),
            y.len(),
            scale.len()
        );
        Self {
            x: HistoryRing::from_recent_first(x),
            y: HistoryRing::from_recent_first(y),
            scale: HistoryRing::from_recent_first(scale),
            width,
            height,
        }
    }

    /// Current centre column
    #[inline]
    pub fn x(&self) -> f64 {
        self.x.front()
    }

    /// Current centre row
    #[inline]
    pub fn y(&self) -> f64 {
        self.y.front()
    }

    /// Current scale
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale.front()
    }

    /// Logical width at scale one
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Logical height at scale one
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Centre column history, most recent first
    pub fn x_history(&self) -> &HistoryRing {
        &self.x
    }

    /// Centre row history, most recent first
    pub fn y_history(&self) -> &HistoryRing {
        &self.y
    }

    /// Scale history, most recent first
    pub fn scale_history(&self) -> &HistoryRing {
        &self.scale
    }

    /// Rectangle covered by this hypothesis
    pub fn rect(&self) -> Rect {
        let s = self.scale();
        Rect::centered(self.x(), self.y(), s * self.width, s * self.height)
    }
}

// ============================================================================
// Model
// ============================================================================

/// Autoregressive motion plus histogram observation model.
#[derive(Debug, Clone)]
pub struct PositionModel {
    config: TrackerConfig,
    reference: Vec<f64>,
}

impl PositionModel {
    /// Model comparing against `reference`, a normalised histogram with
    /// `config.bins` entries.
    pub fn new(config: TrackerConfig, reference: Vec<f64>) -> Self {
        Self { config, reference }
    }

    /// Configuration
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Reference histogram
    pub fn reference(&self) -> &[f64] {
        &self.reference
    }

    /// Score of the pixels under `rect` against the reference histogram.
    ///
    /// The histogram always covers the whole rectangle. Pixels outside the
    /// frame count as intensity 0, so hypotheses hanging off the border are
    /// penalised.
    pub fn score_region(&self, image: &GrayImage, rect: &Rect) -> f64 {
        let region = image.pixel_region_padded(rect);
        match normalized_histogram(&region, self.config.bins) {
            Ok(histogram) => {
                let d = distance(&histogram, &self.reference, DistanceMetric::SquaredHellinger);
                (-self.config.likelihood_steepness * d).exp()
            }
            Err(_) => 0.0,
        }
    }
}

impl ParticleModel for PositionModel {
    type State = PositionState;
    type Observation = GrayImage;

    fn transition<R: rand::Rng + ?Sized>(
        &self,
        state: &PositionState,
        image: &GrayImage,
        rng: &mut R,
    ) -> PositionState {
        let c = &self.config;
        let max_x = image.width().saturating_sub(1) as f64;
        let max_y = image.height().saturating_sub(1) as f64;

        let x = predict(
            state.x.iter(),
            &c.position_coefficients,
            c.ar_constant,
            c.position_noise_variance,
            rng,
        )
        .clamp(0.0, max_x);
        let y = predict(
            state.y.iter(),
            &c.position_coefficients,
            c.ar_constant,
            c.position_noise_variance,
            rng,
        )
        .clamp(0.0, max_y);
        let scale = predict(
            state.scale.iter(),
            &c.scale_coefficients,
            c.ar_constant,
            c.scale_noise_variance,
            rng,
        )
        .max(c.min_scale);

        let mut next = state.clone();
        next.x.push_pop(x);
        next.y.push_pop(y);
        next.scale.push_pop(scale);
        next
    }

    fn likelihood(&self, state: &PositionState, image: &GrayImage) -> f64 {
        self.score_region(image, &state.rect())
    }
}

// ============================================================================
// PositionParticleFilter
// ============================================================================

/// Tracks the position and scale of one object through a frame sequence.
///
/// # Example
///
/// ```
/// use particle_tracker_rs::filter::{PositionParticleFilter, TrackerConfig};
/// use particle_tracker_rs::image::{GrayImage, Rect};
///
/// let mut frame = GrayImage::filled(80, 60, 10);
/// let target = Rect::new(30, 20, 44, 34);
/// frame.fill_rect(&target, 220);
///
/// let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
/// tracker.init_from_image(&frame, target, 100).unwrap();
/// tracker.tick(&frame, 1).unwrap();
///
/// let coordinates = tracker.get_particle_coordinates();
/// assert_eq!(coordinates.len(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct PositionParticleFilter {
    filter: ParticleFilter<PositionModel>,
}

impl PositionParticleFilter {
    /// Tracker with a validated configuration. Call an `init` method before ticking.
    pub fn new(config: TrackerConfig) -> Result<Self, FilterError> {
        config.validate()?;
        let seed = config.seed;
        Ok(Self {
            filter: ParticleFilter::new(PositionModel::new(config, Vec::new()), seed),
        })
    }

    /// Configuration
    pub fn config(&self) -> &TrackerConfig {
        self.filter.model().config()
    }

    /// Normalised histogram of the pixels under `rect`.
    pub fn reference_histogram(image: &GrayImage, rect: &Rect, bins: usize) -> Result<Vec<f64>, FilterError> {
        let region = image.pixel_region(rect);
        if region.is_empty() {
            return Err(FilterError::Configuration {
                description: format!("reference rectangle {:?} lies outside the frame", rect),
            });
        }
        Ok(normalized_histogram(&region, bins)?)
    }

    /// Seed `particle_count` particles at the centre of `rect`.
    ///
    /// Every particle starts with identical histories of the configured
    /// window length and scale one. `reference` must have one entry per bin;
    /// it is normalised before use.
    pub fn init(&mut self, reference: Vec<f64>, rect: Rect, particle_count: usize) -> Result<(), FilterError> {
        let config = self.config().clone();
        if particle_count == 0 {
            return Err(FilterError::Configuration {
                description: "particle count must be positive".to_string(),
            });
        }
        if reference.len() != config.bins {
            return Err(FilterError::DimensionMismatch {
                expected: config.bins,
                actual: reference.len(),
                context: "reference histogram bins".to_string(),
            });
        }
        if reference.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(FilterError::NumericalInstability {
                description: "reference histogram must be finite and non-negative".to_string(),
            });
        }
        let total: f64 = reference.iter().sum();
        if total <= 0.0 {
            return Err(FilterError::NumericalInstability {
                description: "reference histogram is empty".to_string(),
            });
        }
        if rect.width() <= 0 || rect.height() <= 0 {
            return Err(FilterError::Configuration {
                description: format!("initial rectangle {:?} has no area", rect),
            });
        }

        let reference = reference.into_iter().map(|v| v / total).collect();
        let (cx, cy) = rect.center();
        let (width, height) = (rect.width() as f64, rect.height() as f64);
        let history_len = config.history_len();

        log::debug!(
            "Init: {}x{} region centred at ({}, {}), {} particles, {} bins",
            rect.width(),
            rect.height(),
            cx,
            cy,
            particle_count,
            config.bins
        );

        *self.filter.model_mut() = PositionModel::new(config, reference);
        self.filter.reset(
            (0..particle_count)
                .map(|_| PositionState::new(cx as f64, cy as f64, width, height, history_len)),
        );
        Ok(())
    }

    /// [`PositionParticleFilter::init`] with the reference histogram taken
    /// from `rect` in `image`.
    pub fn init_from_image(&mut self, image: &GrayImage, rect: Rect, particle_count: usize) -> Result<(), FilterError> {
        let reference = Self::reference_histogram(image, &rect, self.config().bins)?;
        self.init(reference, rect, particle_count)
    }

    /// True once an `init` call succeeded
    pub fn is_initialized(&self) -> bool {
        !self.filter.particles().is_empty()
    }

    /// Run `subticks` transition, likelihood and resample cycles on `image`.
    ///
    /// Returns the summary of the last resampling pass.
    pub fn tick(&mut self, image: &GrayImage, subticks: usize) -> Result<ResampleSummary, FilterError> {
        self.tick_with_reporter(image, subticks, &mut NoOpReporter)
    }

    /// [`PositionParticleFilter::tick`] with reporter callbacks.
    pub fn tick_with_reporter<Rep: StepReporter<PositionState>>(
        &mut self,
        image: &GrayImage,
        subticks: usize,
        reporter: &mut Rep,
    ) -> Result<ResampleSummary, FilterError> {
        if !self.is_initialized() {
            return Err(FilterError::NotInitialized);
        }
        if subticks == 0 {
            return Err(FilterError::Configuration {
                description: "subticks must be at least 1".to_string(),
            });
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(HistogramError::EmptyFrame {
                width: image.width(),
                height: image.height(),
            }
            .into());
        }

        let mut summary = self.filter.step_with_reporter(image, reporter)?;
        for _ in 1..subticks {
            summary = self.filter.step_with_reporter(image, reporter)?;
        }
        Ok(summary)
    }

    /// Completed cycles since `init`
    pub fn ticks(&self) -> usize {
        self.filter.ticks()
    }

    /// Current particles
    pub fn particles(&self) -> &ParticleSet<PositionState> {
        self.filter.particles()
    }

    /// Rectangles of all particles, best hypothesis first.
    pub fn get_particle_coordinates(&self) -> Vec<Rect> {
        self.filter
            .particles()
            .ranked()
            .into_iter()
            .map(|p| p.state.rect())
            .collect()
    }

    /// Rectangle of the best hypothesis
    pub fn best(&self) -> Option<Rect> {
        self.filter.particles().best().map(|p| p.state.rect())
    }

    /// Weighted mean centre of all particles.
    ///
    /// Right after resampling all weights are zero and every particle
    /// counts equally.
    pub fn mean_position(&self) -> Option<(f64, f64)> {
        let particles = self.filter.particles().particles();
        if particles.is_empty() {
            return None;
        }
        let total: f64 = particles.iter().map(|p| p.weight).sum();
        let (sx, sy, sw) = if total > 0.0 {
            particles.iter().fold((0.0, 0.0, 0.0), |(sx, sy, sw), p| {
                (sx + p.weight * p.state.x(), sy + p.weight * p.state.y(), sw + p.weight)
            })
        } else {
            particles
                .iter()
                .fold((0.0, 0.0, 0.0), |(sx, sy, sw), p| (sx + p.state.x(), sy + p.state.y(), sw + 1.0))
        };
        Some((sx / sw, sy / sw))
    }

    /// Likelihood of a `region`-sized object centred at every
    /// `block_size`-th pixel of `image`.
    ///
    /// Centres closer than one region size to the border are skipped. Each
    /// evaluated centre paints a `block_size` square of the result; the rest
    /// stays zero. The result has the shape of the frame
    /// (`rows = height`) with values in `[0, 1]`.
    pub fn likelihood_map(
        &self,
        image: &GrayImage,
        region: RegionSize,
        block_size: usize,
    ) -> Result<DMatrix<f64>, FilterError> {
        if !self.is_initialized() {
            return Err(FilterError::NotInitialized);
        }
        if block_size == 0 {
            return Err(FilterError::Configuration {
                description: "block size must be at least 1".to_string(),
            });
        }
        if region.width == 0 || region.height == 0 {
            return Err(FilterError::Configuration {
                description: format!("region {}x{} has no area", region.width, region.height),
            });
        }

        let (w, h) = (image.width(), image.height());
        let centres: Vec<(usize, usize)> = (region.height..h.saturating_sub(region.height))
            .step_by(block_size)
            .flat_map(|j| {
                (region.width..w.saturating_sub(region.width))
                    .step_by(block_size)
                    .map(move |i| (i, j))
            })
            .collect();

        let model = self.filter.model();
        let score = |&(i, j): &(usize, usize)| {
            let rect = Rect::centered(i as f64, j as f64, region.width as f64, region.height as f64);
            model.score_region(image, &rect)
        };

        #[cfg(feature = "rayon")]
        let scores: Vec<f64> = centres.par_iter().map(score).collect();
        #[cfg(not(feature = "rayon"))]
        let scores: Vec<f64> = centres.iter().map(score).collect();

        log::debug!(
            "Likelihood map: {} centres on a {}x{} frame, block {}",
            centres.len(),
            w,
            h,
            block_size
        );

        let mut map = DMatrix::zeros(h, w);
        let half = block_size / 2;
        for (&(i, j), &value) in centres.iter().zip(&scores) {
            let (x0, x1) = (i.saturating_sub(half), (i + half).min(w - 1));
            let (y0, y1) = (j.saturating_sub(half), (j + half).min(h - 1));
            for y in y0..=y1 {
                for x in x0..=x1 {
                    map[(y, x)] = value;
                }
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::rng::SimpleRng;

    fn frame_with_square(width: usize, height: usize, square: &Rect) -> GrayImage {
        let mut frame = GrayImage::filled(width, height, 20);
        frame.fill_rect(square, 200);
        frame
    }

    fn deterministic() -> TrackerConfig {
        TrackerConfig::default().with_noise(0.0, 0.0)
    }

    #[test]
    fn test_transition_extrapolates_velocity() {
        let model = PositionModel::new(deterministic(), vec![1.0 / 16.0; 16]);
        let image = GrayImage::filled(100, 100, 0);
        let state = PositionState::with_history(&[12.0, 10.0], &[50.0, 50.0], &[1.0, 1.0], 20.0, 20.0);
        let mut rng = SimpleRng::new(1);

        let next = model.transition(&state, &image, &mut rng);
        assert_eq!(next.x(), 14.0);
        assert_eq!(next.y(), 50.0);
        assert_eq!(next.scale(), 1.0);
        assert_eq!(next.x_history().to_vec(), vec![14.0, 12.0]);
    }

    #[test]
    fn test_transition_clamps_to_frame_and_min_scale() {
        let model = PositionModel::new(deterministic(), vec![1.0 / 16.0; 16]);
        let image = GrayImage::filled(100, 80, 0);
        let state = PositionState::with_history(&[95.0, 80.0], &[2.0, 10.0], &[0.2, 0.5], 20.0, 20.0);
        let mut rng = SimpleRng::new(1);

        let next = model.transition(&state, &image, &mut rng);
        assert_eq!(next.x(), 99.0);
        assert_eq!(next.y(), 0.0);
        assert_eq!(next.scale(), 0.1);
    }

    #[test]
    fn test_likelihood_is_one_on_reference_region() {
        let square = Rect::new(20, 20, 40, 40);
        let image = frame_with_square(60, 60, &square);
        let reference = PositionParticleFilter::reference_histogram(&image, &square, 16).unwrap();
        let model = PositionModel::new(TrackerConfig::default(), reference);

        let on_target = PositionState::new(30.0, 30.0, 20.0, 20.0, 2);
        assert!((model.likelihood(&on_target, &image) - 1.0).abs() < 1e-12);

        let off_target = PositionState::new(35.0, 30.0, 20.0, 20.0, 2);
        let w = model.likelihood(&off_target, &image);
        assert!(w > 0.0 && w < 0.5);

        // Entirely outside the frame: all zero-filled, nothing in common with the reference
        let outside = model.score_region(&image, &Rect::new(100, 100, 120, 120));
        assert!(outside < 1e-8, "outside score {}", outside);
    }

    #[test]
    fn test_likelihood_maps_squared_hellinger_through_exponential() {
        // Background 20 lands in bin 1, the square's 200 in bin 12
        let square = Rect::new(20, 20, 40, 40);
        let image = frame_with_square(60, 60, &square);
        let reference = PositionParticleFilter::reference_histogram(&image, &square, 16).unwrap();
        assert_eq!(reference[12], 1.0);

        // Columns 25..=45: 16 inside the square, 5 on the background
        let shifted = PositionState::new(35.0, 30.0, 20.0, 20.0, 2);
        assert_eq!(shifted.rect(), Rect::new(25, 20, 45, 40));
        let d = (1.0 - (16.0f64 / 21.0).sqrt()).sqrt();

        for k in [20.0, 5.0] {
            let config = TrackerConfig::default().with_likelihood_steepness(k);
            let model = PositionModel::new(config, reference.clone());
            let w = model.likelihood(&shifted, &image);
            assert!((w - (-k * d).exp()).abs() < 1e-12, "k = {}: {} vs {}", k, w, (-k * d).exp());
        }
    }

    #[test]
    fn test_corner_hypothesis_scores_below_target() {
        let object = Rect::new(0, 0, 20, 20);
        let image = frame_with_square(60, 60, &object);
        let reference = PositionParticleFilter::reference_histogram(&image, &object, 16).unwrap();
        let model = PositionModel::new(TrackerConfig::default(), reference);

        let on_target = model.likelihood(&PositionState::new(10.0, 10.0, 20.0, 20.0, 2), &image);
        assert!((on_target - 1.0).abs() < 1e-12);

        // Rect (-10, -10, 10, 10): 11×11 of 21×21 pixels lie on the object
        let corner = PositionState::new(0.0, 0.0, 20.0, 20.0, 2);
        assert_eq!(corner.rect(), Rect::new(-10, -10, 10, 10));
        let w = model.likelihood(&corner, &image);
        let expected = (-20.0 * (1.0 - (121.0f64 / 441.0).sqrt()).sqrt()).exp();
        assert!(w < on_target);
        assert!((w - expected).abs() < 1e-12, "corner score {} vs {}", w, expected);
    }

    #[test]
    fn test_init_validation() {
        let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
        let rect = Rect::new(10, 10, 30, 30);
        let uniform = vec![1.0 / 16.0; 16];

        assert!(matches!(
            tracker.init(uniform.clone(), rect, 0),
            Err(FilterError::Configuration { .. })
        ));
        assert!(matches!(
            tracker.init(vec![1.0; 4], rect, 10),
            Err(FilterError::DimensionMismatch { expected: 16, actual: 4, .. })
        ));
        assert!(matches!(
            tracker.init(vec![0.0; 16], rect, 10),
            Err(FilterError::NumericalInstability { .. })
        ));
        assert!(matches!(
            tracker.init(uniform.clone(), Rect::new(10, 10, 10, 30), 10),
            Err(FilterError::Configuration { .. })
        ));
        assert!(!tracker.is_initialized());

        let image = GrayImage::filled(50, 50, 0);
        assert_eq!(tracker.tick(&image, 1), Err(FilterError::NotInitialized));

        tracker.init(uniform, rect, 10).unwrap();
        assert!(matches!(
            tracker.tick(&image, 0),
            Err(FilterError::Configuration { .. })
        ));
        assert!(matches!(
            tracker.tick(&GrayImage::filled(0, 0, 0), 1),
            Err(FilterError::Histogram(HistogramError::EmptyFrame { .. }))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(PositionParticleFilter::new(TrackerConfig::default().with_bins(0)).is_err());
    }

    #[test]
    fn test_init_places_every_particle_on_the_rectangle() {
        let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
        let rect = Rect::new(10, 10, 30, 30);
        tracker.init(vec![1.0; 16], rect, 25).unwrap();

        let coordinates = tracker.get_particle_coordinates();
        assert_eq!(coordinates.len(), 25);
        assert!(coordinates.iter().all(|r| *r == rect));
        assert_eq!(tracker.mean_position(), Some((20.0, 20.0)));
        assert!(tracker
            .particles()
            .iter()
            .all(|p| p.state.x_history().len() == 2 && p.state.x_history().to_vec() == vec![20.0, 20.0]));
    }

    #[test]
    fn test_stationary_target_stays_tracked() {
        let square = Rect::new(40, 30, 60, 50);
        let image = frame_with_square(100, 80, &square);
        let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
        tracker.init_from_image(&image, square, 200).unwrap();

        for _ in 0..5 {
            let summary = tracker.tick(&image, 1).unwrap();
            assert_eq!(summary.particle_count, 200);
        }
        assert_eq!(tracker.ticks(), 5);

        let best = tracker.best().unwrap();
        let (bx, by) = best.center();
        assert!((bx - 50).abs() <= 10, "best centre x {} off target", bx);
        assert!((by - 40).abs() <= 10, "best centre y {} off target", by);
        assert_eq!(tracker.get_particle_coordinates()[0], best);
    }

    #[test]
    fn test_subticks_run_multiple_cycles() {
        let square = Rect::new(10, 10, 20, 20);
        let image = frame_with_square(40, 40, &square);
        let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
        tracker.init_from_image(&image, square, 20).unwrap();
        tracker.tick(&image, 3).unwrap();
        assert_eq!(tracker.ticks(), 3);
    }

    #[test]
    fn test_likelihood_map() {
        let square = Rect::new(20, 20, 40, 40);
        let image = frame_with_square(60, 60, &square);
        let mut tracker = PositionParticleFilter::new(TrackerConfig::default()).unwrap();
        tracker.init_from_image(&image, square, 10).unwrap();

        let region = RegionSize { width: 20, height: 20 };
        let map = tracker.likelihood_map(&image, region, 1).unwrap();
        assert_eq!(map.nrows(), 60);
        assert_eq!(map.ncols(), 60);
        assert!((map[(30, 30)] - 1.0).abs() < 1e-12);
        assert!(map[(20, 20)] < map[(30, 30)]);
        assert_eq!(map[(0, 0)], 0.0);
        assert!(map.iter().all(|&v| (0.0..=1.0).contains(&v)));

        assert!(tracker.likelihood_map(&image, region, 0).is_err());
    }
}
