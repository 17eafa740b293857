//! Intensity histograms over one or more frames
//!
//! A [`Histogram`] bins the intensity of every pixel position across a batch
//! of equally shaped frames. Each pixel position acts as a separate sensor:
//! `frequency(p, b)` counts the frames in which pixel `p` fell into bin `b`.
//! Optionally it also counts how often two pixels fell into a pair of bins
//! together, which feeds the entropy based sensor distance in
//! [`crutchfield`].
//!
//! Tables are rebuilt from scratch by every call to
//! [`Histogram::calc_probabilities`]. Querying before that call is a
//! programming error and panics.
//!
//! Pixel positions are numbered row-major: `p = row * width + col`.

pub mod crutchfield;

use crate::filter::errors::HistogramError;
use crate::image::IntensityMatrix;

/// Number of distinct 8-bit intensities
const INTENSITY_LEVELS: usize = 256;

/// Bin of an 8-bit intensity: `floor(value * bins / 256)`
#[inline]
pub fn value_to_bin(value: u8, bins: usize) -> usize {
    value as usize * bins / INTENSITY_LEVELS
}

fn check_bins(bins: usize) -> Result<(), HistogramError> {
    if bins == 0 || bins > INTENSITY_LEVELS {
        return Err(HistogramError::InvalidBins { bins });
    }
    Ok(())
}

fn zeroed_table(len: usize) -> Result<Vec<u32>, HistogramError> {
    let mut table = Vec::new();
    table
        .try_reserve_exact(len)
        .map_err(|_| HistogramError::AllocationFailed { requested: len })?;
    table.resize(len, 0);
    Ok(table)
}

/// Normalised intensity distribution of a single region.
///
/// Equivalent to computing a one-frame [`Histogram`] over `region` and
/// reading [`Histogram::probabilities`], without materialising the
/// per-pixel table. This is what the tracker's observation model uses.
pub fn normalized_histogram(region: &IntensityMatrix, bins: usize) -> Result<Vec<f64>, HistogramError> {
    check_bins(bins)?;
    if region.is_empty() {
        return Err(HistogramError::EmptyFrame {
            width: region.ncols(),
            height: region.nrows(),
        });
    }
    let mut counts = vec![0u64; bins];
    for &value in region.iter() {
        counts[value_to_bin(value, bins)] += 1;
    }
    let total = region.len() as f64;
    Ok(counts.into_iter().map(|c| c as f64 / total).collect())
}

/// Frequency tables computed by the last `calc_probabilities` call
#[derive(Debug, Clone)]
struct FrequencyTables {
    /// `freq[p * bins + bin]`
    freq: Vec<u32>,
    /// Strict lower triangle of pixel pairs (`p0 > p1`), `bins²` entries each
    joint_freq: Option<Vec<u32>>,
    frame_count: usize,
}

/// Per-pixel (and optionally pairwise) intensity histogram over a batch of frames.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: usize,
    width: usize,
    height: usize,
    with_joint: bool,
    tables: Option<FrequencyTables>,
}

impl Histogram {
    /// Histogram with `bins` bins for frames of `width × height` pixels.
    pub fn new(bins: usize, width: usize, height: usize) -> Result<Self, HistogramError> {
        check_bins(bins)?;
        if width == 0 || height == 0 {
            return Err(HistogramError::EmptyFrame { width, height });
        }
        Ok(Self {
            bins,
            width,
            height,
            with_joint: false,
            tables: None,
        })
    }

    /// Also count joint frequencies of pixel pairs.
    ///
    /// Memory grows with `(width·height)² · bins²`; only use on small frames.
    pub fn with_joint_frequencies(mut self, enabled: bool) -> Self {
        self.with_joint = enabled;
        self.tables = None;
        self
    }

    /// Number of bins
    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Frame width
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixel positions ("sensors") per frame
    #[inline]
    pub fn sensor_count(&self) -> usize {
        self.width * self.height
    }

    /// Whether tables from a previous `calc_probabilities` are available
    #[inline]
    pub fn is_computed(&self) -> bool {
        self.tables.is_some()
    }

    /// Whether joint frequencies are counted
    #[inline]
    pub fn has_joint_frequencies(&self) -> bool {
        self.with_joint
    }

    /// Count bin occurrences for every pixel position over `frames`.
    ///
    /// Previous tables are discarded first, also when this call fails.
    pub fn calc_probabilities(&mut self, frames: &[IntensityMatrix]) -> Result<(), HistogramError> {
        self.tables = None;
        if frames.is_empty() {
            return Err(HistogramError::NoFrames);
        }
        for (t, frame) in frames.iter().enumerate() {
            if frame.nrows() != self.height || frame.ncols() != self.width {
                return Err(HistogramError::DimensionMismatch {
                    expected: self.sensor_count(),
                    actual: frame.len(),
                    context: format!(
                        "frame {} ({}x{}, expected {}x{})",
                        t,
                        frame.ncols(),
                        frame.nrows(),
                        self.width,
                        self.height
                    ),
                });
            }
        }

        let p_size = self.sensor_count();
        let bins = self.bins;
        let freq_len = p_size
            .checked_mul(bins)
            .ok_or(HistogramError::AllocationFailed { requested: usize::MAX })?;
        let mut freq = zeroed_table(freq_len)?;

        // Per-frame bin of every pixel, row-major
        let binned: Vec<Vec<usize>> = frames
            .iter()
            .map(|frame| {
                let mut out = Vec::with_capacity(p_size);
                for row in 0..self.height {
                    for col in 0..self.width {
                        out.push(value_to_bin(frame[(row, col)], bins));
                    }
                }
                out
            })
            .collect();

        for frame_bins in &binned {
            for (p, &bin) in frame_bins.iter().enumerate() {
                freq[p * bins + bin] += 1;
            }
        }

        let joint_freq = if self.with_joint {
            let bins_squared = bins * bins;
            let len = (p_size * p_size.saturating_sub(1) / 2)
                .checked_mul(bins_squared)
                .ok_or(HistogramError::AllocationFailed { requested: usize::MAX })?;
            let mut joint = zeroed_table(len)?;
            for frame_bins in &binned {
                for p0 in 1..p_size {
                    let row_offset = p0 * (p0 - 1) / 2;
                    for p1 in 0..p0 {
                        let m = (row_offset + p1) * bins_squared;
                        joint[m + frame_bins[p0] * bins + frame_bins[p1]] += 1;
                    }
                }
            }
            Some(joint)
        } else {
            None
        };

        log::trace!(
            "Histogram over {} frames: {} pixels x {} bins{}",
            frames.len(),
            p_size,
            bins,
            if self.with_joint { " (with joint table)" } else { "" }
        );

        self.tables = Some(FrequencyTables {
            freq,
            joint_freq,
            frame_count: frames.len(),
        });
        Ok(())
    }

    fn tables(&self) -> &FrequencyTables {
        match &self.tables {
            Some(tables) => tables,
            None => panic!("histogram queried before calc_probabilities"),
        }
    }

    /// Number of frames in the last computation.
    ///
    /// # Panics
    /// If nothing has been computed yet.
    pub fn frame_count(&self) -> usize {
        self.tables().frame_count
    }

    /// Number of frames in which pixel `p` fell into `bin`.
    ///
    /// # Panics
    /// If nothing has been computed yet or an index is out of range.
    pub fn frequency(&self, p: usize, bin: usize) -> u32 {
        assert!(p < self.sensor_count() && bin < self.bins, "index out of range");
        self.tables().freq[p * self.bins + bin]
    }

    /// `frequency(p, bin) / frame_count`
    ///
    /// # Panics
    /// As [`Histogram::frequency`].
    pub fn probability(&self, p: usize, bin: usize) -> f64 {
        let frame_count = self.tables().frame_count;
        assert!(frame_count > 0, "probability with zero frame count");
        self.frequency(p, bin) as f64 / frame_count as f64
    }

    /// Number of frames in which pixel `p0` fell into `bin0` and pixel `p1`
    /// into `bin1`. Symmetric in the two (pixel, bin) pairs.
    ///
    /// # Panics
    /// If nothing has been computed, joint frequencies were not requested,
    /// or an index is out of range.
    pub fn joint_frequency(&self, p0: usize, bin0: usize, p1: usize, bin1: usize) -> u32 {
        assert!(
            p0 < self.sensor_count() && p1 < self.sensor_count(),
            "pixel index out of range"
        );
        assert!(bin0 < self.bins && bin1 < self.bins, "bin index out of range");
        let tables = self.tables();
        let joint = match &tables.joint_freq {
            Some(joint) => joint,
            None => panic!("joint frequencies were not computed; use with_joint_frequencies(true)"),
        };
        if p0 == p1 {
            return if bin0 == bin1 { self.frequency(p0, bin0) } else { 0 };
        }
        // Only the lower triangle is stored
        let (p0, bin0, p1, bin1) = if p0 > p1 {
            (p0, bin0, p1, bin1)
        } else {
            (p1, bin1, p0, bin0)
        };
        let m = (p0 * (p0 - 1) / 2 + p1) * self.bins * self.bins;
        joint[m + bin0 * self.bins + bin1]
    }

    /// `joint_frequency / frame_count`
    ///
    /// # Panics
    /// As [`Histogram::joint_frequency`].
    pub fn joint_probability(&self, p0: usize, bin0: usize, p1: usize, bin1: usize) -> f64 {
        self.joint_frequency(p0, bin0, p1, bin1) as f64 / self.frame_count() as f64
    }

    /// Frequencies summed over all pixel positions, one entry per bin.
    ///
    /// # Panics
    /// If nothing has been computed yet.
    pub fn frequencies(&self) -> Vec<u64> {
        let freq = &self.tables().freq;
        let mut result = vec![0u64; self.bins];
        for pixel in freq.chunks_exact(self.bins) {
            for (total, &f) in result.iter_mut().zip(pixel) {
                *total += f as u64;
            }
        }
        result
    }

    /// Total number of counted samples (pixels × frames).
    ///
    /// # Panics
    /// If nothing has been computed yet.
    pub fn samples(&self) -> u64 {
        self.tables().freq.iter().map(|&f| f as u64).sum()
    }

    /// Aggregate frequencies normalised to a probability distribution over bins.
    ///
    /// # Panics
    /// If nothing has been computed yet.
    pub fn probabilities(&self) -> Vec<f64> {
        let frequencies = self.frequencies();
        let total: u64 = frequencies.iter().sum();
        assert!(total != 0, "histogram without samples");
        frequencies
            .into_iter()
            .map(|f| f as f64 / total as f64)
            .collect()
    }

    /// Conditional entropy `H(P1 | P0)` in bits over the computed frames.
    ///
    /// `H = Σ_{b0,b1} p(b0,b1) · log2(p(b0) / p(b0,b1))`, skipping empty cells.
    ///
    /// # Panics
    /// If joint frequencies are not available.
    pub fn conditional_entropy(&self, p0: usize, p1: usize) -> f64 {
        let frame_count = self.frame_count() as f64;
        if p0 == p1 {
            return 0.0;
        }
        let mut sum = 0.0;
        for b0 in 0..self.bins {
            let f0 = self.frequency(p0, b0) as f64;
            if f0 == 0.0 {
                continue;
            }
            for b1 in 0..self.bins {
                let f01 = self.joint_frequency(p0, b0, p1, b1) as f64;
                if f01 == 0.0 {
                    continue;
                }
                sum += (f01 / frame_count) * (f0 / f01).log2();
            }
        }
        sum
    }
}
