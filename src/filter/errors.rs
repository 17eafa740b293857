//! Error types for the histogram engine and the filters
//!
//! Recoverable conditions (bad configuration, unusable input, allocation
//! failure) are reported through these types. Violated preconditions that
//! can only result from a programming error panic at the call site instead.

use std::fmt;

/// Errors that can occur during filtering
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Dimension mismatch between expected and actual
    DimensionMismatch {
        /// What was expected
        expected: usize,
        /// What was received
        actual: usize,
        /// Context (e.g., "reference histogram bins")
        context: String,
    },

    /// Numerical instability detected
    NumericalInstability {
        /// Description of the issue
        description: String,
    },

    /// The filter was stepped before it was initialised
    NotInitialized,

    /// Histogram computation failed
    Histogram(HistogramError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            FilterError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {}, got {}",
                    context, expected, actual
                )
            }
            FilterError::NumericalInstability { description } => {
                write!(f, "Numerical instability: {}", description)
            }
            FilterError::NotInitialized => write!(f, "Filter has no particles; call init first"),
            FilterError::Histogram(e) => write!(f, "Histogram failed: {}", e),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Histogram(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HistogramError> for FilterError {
    fn from(e: HistogramError) -> Self {
        FilterError::Histogram(e)
    }
}

/// Errors that can occur while building a histogram
#[derive(Debug, Clone, PartialEq)]
pub enum HistogramError {
    /// Bin count outside `1..=256`
    InvalidBins {
        /// Requested number of bins
        bins: usize,
    },

    /// A frame without pixels
    EmptyFrame {
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
    },

    /// No frames were supplied
    NoFrames,

    /// A frame does not have the configured shape
    DimensionMismatch {
        /// Expected pixel count
        expected: usize,
        /// Pixel count received
        actual: usize,
        /// Context (e.g., "frame 3")
        context: String,
    },

    /// A frequency table could not be allocated
    AllocationFailed {
        /// Number of table entries requested
        requested: usize,
    },
}

impl fmt::Display for HistogramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistogramError::InvalidBins { bins } => {
                write!(f, "Invalid bin count {} (must be within 1..=256)", bins)
            }
            HistogramError::EmptyFrame { width, height } => {
                write!(f, "Empty frame of size {}x{}", width, height)
            }
            HistogramError::NoFrames => write!(f, "No frames supplied"),
            HistogramError::DimensionMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Dimension mismatch for {}: expected {} pixels, got {}",
                    context, expected, actual
                )
            }
            HistogramError::AllocationFailed { requested } => {
                write!(
                    f,
                    "Frequency table of {} entries could not be allocated",
                    requested
                )
            }
        }
    }
}

impl std::error::Error for HistogramError {}
