//! Typed configuration of a multi-task kernel
use crate::kernel::{KernelError, Smoothness};
use crate::misc::QuadTolerance;
use crate::result::Result;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Per-task kernel settings
///
/// The bounds `(l_min, l_max)` only size the precompute grid; length scales
/// outside them are extrapolated at evaluation time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct TaskDescriptor {
    pub smoothness: Smoothness,
    pub l_min: f64,
    pub l_max: f64,
}

impl TaskDescriptor {
    pub fn new(smoothness: Smoothness, l_min: f64, l_max: f64) -> Self {
        Self {
            smoothness,
            l_min,
            l_max,
        }
    }

    /// A squared-exponential task
    pub fn squared_exponential(l_min: f64, l_max: f64) -> Self {
        Self::new(Smoothness::SquaredExponential, l_min, l_max)
    }

    fn validate(&self, task: usize) -> Result<()> {
        self.smoothness.validate()?;
        let ordered = self.l_min.is_finite()
            && self.l_max.is_finite()
            && 0.0 < self.l_min
            && self.l_min < self.l_max;
        if ordered {
            Ok(())
        } else {
            Err(KernelError::InvalidBounds {
                task,
                lower: self.l_min,
                upper: self.l_max,
            })
        }
    }
}

/// Configuration of a [`MultiTaskKernel`](crate::kernel::MultiTaskKernel)
///
/// # Example
///
/// ```
/// use mtgp::prelude::*;
///
/// let config = KernelConfig::new(
///     vec![
///         TaskDescriptor::squared_exponential(0.1, 5.0),
///         TaskDescriptor::new(Smoothness::Matern52, 0.5, 2.0),
///     ],
///     30,
/// )
/// .with_n_threads(2)
/// .with_max_quad_error(1E-6);
///
/// assert_eq!(config.n_tasks(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct KernelConfig {
    pub tasks: Vec<TaskDescriptor>,
    /// Number of grid nodes along each of the lag, l1 and l2 axes
    pub n_points: usize,
    /// Reserved for a shared length-scale mode; carried but not evaluated
    #[cfg_attr(feature = "serde1", serde(default))]
    pub self_scale: bool,
    #[cfg_attr(feature = "serde1", serde(default))]
    pub tolerance: QuadTolerance,
    /// Worker count for grid construction; one per logical CPU if `None`
    #[cfg_attr(feature = "serde1", serde(default))]
    pub n_threads: Option<usize>,
    /// If set, setup fails when any grid's largest quadrature error
    /// estimate exceeds this value
    #[cfg_attr(feature = "serde1", serde(default))]
    pub max_quad_error: Option<f64>,
}

impl KernelConfig {
    pub fn new(tasks: Vec<TaskDescriptor>, n_points: usize) -> Self {
        Self {
            tasks,
            n_points,
            self_scale: false,
            tolerance: QuadTolerance::default(),
            n_threads: None,
            max_quad_error: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: QuadTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = Some(n_threads);
        self
    }

    pub fn with_max_quad_error(mut self, max_quad_error: f64) -> Self {
        self.max_quad_error = Some(max_quad_error);
        self
    }

    pub fn with_self_scale(mut self, self_scale: bool) -> Self {
        self.self_scale = self_scale;
        self
    }

    pub fn n_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Check every setting that would otherwise fail partway through setup
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(KernelError::InvalidGrid(
                "at least one task is required".into(),
            ));
        }
        if self.n_points < 2 {
            return Err(KernelError::InvalidGrid(format!(
                "n_points must be at least 2, given {}",
                self.n_points
            )));
        }
        if self.n_threads == Some(0) {
            return Err(KernelError::ThreadPool(
                "n_threads must be positive".into(),
            ));
        }

        let tol = &self.tolerance;
        let tol_ok = tol.eps_abs >= 0.0
            && tol.eps_rel >= 0.0
            && (tol.eps_abs > 0.0 || tol.eps_rel > 0.0)
            && tol.max_subdivisions > 0;
        if !tol_ok {
            return Err(KernelError::InvalidGrid(format!(
                "unusable quadrature tolerance: {:?}",
                tol
            )));
        }

        if let Some(threshold) = self.max_quad_error {
            if !(threshold >= 0.0) {
                return Err(KernelError::InvalidGrid(format!(
                    "max_quad_error must be non-negative, given {}",
                    threshold
                )));
            }
        }

        self.tasks
            .iter()
            .enumerate()
            .try_for_each(|(ix, task)| task.validate(ix))
    }
}
