use crate::misc::bessel::BesselError;
use crate::misc::InterpError;
use rayon::ThreadPoolBuildError;
use std::fmt;

/// Errors from kernel construction and covariance evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// The number of tasks disagrees with the data or parameters supplied
    ConfigurationMismatch {
        /// What was counted
        what: &'static str,
        /// Count implied by the configuration
        expected: usize,
        /// Count actually supplied
        given: usize,
    },
    /// The smoothness parameter does not describe a supported kernel
    UnsupportedSmoothness(String),
    /// Length-scale bounds must satisfy 0 < lower < upper
    InvalidBounds {
        /// Index of the offending task
        task: usize,
        lower: f64,
        upper: f64,
    },
    /// Length scales of basis functions must be positive and finite
    InvalidLengthScale(f64),
    /// The precompute grid or quadrature settings are unusable
    InvalidGrid(String),
    /// A basis function evaluated to NaN or infinity
    NonFinite {
        /// Lag at which the basis was evaluated
        lag: f64,
        /// Length scale of the basis
        length_scale: f64,
    },
    /// A special function could not be evaluated
    SpecialFunction(BesselError),
    /// A pair grid's quadrature error exceeded the configured threshold
    QuadratureImprecision {
        pair: (usize, usize),
        max_abs_err: f64,
        threshold: f64,
    },
    /// A grid point could not be integrated, aborting the pair's grid
    WorkerFailure {
        pair: (usize, usize),
        lag: f64,
        l1: f64,
        l2: f64,
        source: Box<KernelError>,
    },
    /// No precomputed kernel or lag matrix is held for the ordered pair
    MissingPair((usize, usize)),
    /// The worker pool could not be created
    ThreadPool(String),
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SpecialFunction(e) => Some(e),
            Self::WorkerFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationMismatch {
                what,
                expected,
                given,
            } => write!(
                f,
                "configuration expects {} {} but {} were given",
                expected, what, given
            ),
            Self::UnsupportedSmoothness(nu) => {
                write!(f, "unsupported smoothness nu = {}", nu)
            }
            Self::InvalidBounds { task, lower, upper } => write!(
                f,
                "length-scale bounds of task {} are not in order: ({}, {})",
                task, lower, upper
            ),
            Self::InvalidLengthScale(l) => {
                write!(f, "length scale must be positive, given: {}", l)
            }
            Self::InvalidGrid(msg) => write!(f, "invalid grid: {}", msg),
            Self::NonFinite { lag, length_scale } => write!(
                f,
                "basis function is not finite at lag {} (length scale {})",
                lag, length_scale
            ),
            Self::SpecialFunction(e) => {
                write!(f, "special function failed: {}", e)
            }
            Self::QuadratureImprecision {
                pair,
                max_abs_err,
                threshold,
            } => write!(
                f,
                "grid for pair {:?} has quadrature error {:e} above {:e}",
                pair, max_abs_err, threshold
            ),
            Self::WorkerFailure {
                pair,
                lag,
                l1,
                l2,
                source,
            } => write!(
                f,
                "grid for pair {:?} failed at (lag = {}, l1 = {}, l2 = {}): {}",
                pair, lag, l1, l2, source
            ),
            Self::MissingPair(pair) => {
                write!(f, "no precomputed kernel for pair {:?}", pair)
            }
            Self::ThreadPool(msg) => {
                write!(f, "could not build worker pool: {}", msg)
            }
        }
    }
}

impl From<BesselError> for KernelError {
    fn from(e: BesselError) -> Self {
        Self::SpecialFunction(e)
    }
}

impl From<InterpError> for KernelError {
    fn from(e: InterpError) -> Self {
        Self::InvalidGrid(e.to_string())
    }
}

impl From<ThreadPoolBuildError> for KernelError {
    fn from(e: ThreadPoolBuildError) -> Self {
        Self::ThreadPool(e.to_string())
    }
}
