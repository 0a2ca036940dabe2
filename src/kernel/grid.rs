use super::{ConvolutionIntegrator, KernelError};
use crate::config::TaskDescriptor;
use crate::consts::{LAG_MAX, LAG_MIN};
use crate::misc::{linspace, try_par_map, QuadTolerance};
use itertools::iproduct;
use log::{debug, warn};
use rayon::ThreadPool;
use std::time::Instant;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

/// Coordinate axes of a pair grid
///
/// The grid is stored row-major over (lag, l2, l1): l1 varies fastest.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GridAxes {
    pub lags: Vec<f64>,
    pub l2s: Vec<f64>,
    pub l1s: Vec<f64>,
}

impl GridAxes {
    /// Axes for the pair (first, second) with `n_points` nodes on each axis.
    ///
    /// The lag axis spans the fixed lag domain with uniform spacing and
    /// always contains zero lag, so that variances are never interpolated
    /// along it; an even `n_points` therefore gives `n_points + 1` lag nodes. The length-scale
    /// axes span each task's configured bounds.
    pub fn for_pair(
        first: &TaskDescriptor,
        second: &TaskDescriptor,
        n_points: usize,
    ) -> Result<Self, KernelError> {
        if n_points < 2 {
            return Err(KernelError::InvalidGrid(format!(
                "n_points must be at least 2, given {}",
                n_points
            )));
        }
        Ok(Self {
            lags: lag_axis(n_points),
            l2s: linspace(second.l_min, second.l_max, n_points),
            l1s: linspace(first.l_min, first.l_max, n_points),
        })
    }

    /// Total number of grid nodes
    pub fn len(&self) -> usize {
        self.lags.len() * self.l2s.len() * self.l1s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every (lag, l2, l1) node in storage order
    pub fn nodes(&self) -> Vec<(f64, f64, f64)> {
        iproduct!(
            self.lags.iter().copied(),
            self.l2s.iter().copied(),
            self.l1s.iter().copied()
        )
        .collect()
    }
}

/// Evenly spaced lags over the symmetric lag domain with zero as a node.
///
/// An even `n_points` cannot put a node on zero, so one node is added. The
/// spacing stays uniform: linear interpolation of a positive-definite kernel
/// is only positive-definite on a uniform lattice through the origin.
fn lag_axis(n_points: usize) -> Vec<f64> {
    let n_nodes = n_points + (1 - n_points % 2);
    let mut lags = linspace(LAG_MIN, LAG_MAX, n_nodes);
    lags[n_nodes / 2] = 0.0;
    lags
}

/// Summary of the quadrature error over a pair grid
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct GridDiagnostics {
    /// Number of grid nodes
    pub n_points: usize,
    /// Number of nodes whose quadrature did not reach tolerance
    pub n_unconverged: usize,
    /// Largest absolute error estimate over the grid
    pub max_abs_err: f64,
    /// Mean absolute error estimate over the grid
    pub mean_abs_err: f64,
}

impl GridDiagnostics {
    fn from_errors(abs_errs: &[f64], n_unconverged: usize) -> Self {
        let n_points = abs_errs.len();
        let max_abs_err = abs_errs.iter().copied().fold(0.0, f64::max);
        let mean_abs_err = if n_points == 0 {
            0.0
        } else {
            abs_errs.iter().sum::<f64>() / n_points as f64
        };
        Self {
            n_points,
            n_unconverged,
            max_abs_err,
            mean_abs_err,
        }
    }
}

/// The precomputed convolution integrals of one task pair
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct PairGrid {
    pair: (usize, usize),
    axes: GridAxes,
    values: Vec<f64>,
    abs_errs: Vec<f64>,
    diagnostics: GridDiagnostics,
}

impl PairGrid {
    /// The task indices (i, j), i ≤ j
    pub fn pair(&self) -> (usize, usize) {
        self.pair
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    /// Integral values, row-major over (lag, l2, l1)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Quadrature error estimates in the same layout as `values`
    pub fn abs_errs(&self) -> &[f64] {
        &self.abs_errs
    }

    pub fn diagnostics(&self) -> &GridDiagnostics {
        &self.diagnostics
    }

    /// Value at the node with the given axis indices
    pub fn value_at(&self, i_lag: usize, i_l2: usize, i_l1: usize) -> f64 {
        let n_l2 = self.axes.l2s.len();
        let n_l1 = self.axes.l1s.len();
        self.values[(i_lag * n_l2 + i_l2) * n_l1 + i_l1]
    }

    pub(crate) fn into_parts(self) -> (GridAxes, Vec<f64>, GridDiagnostics) {
        (self.axes, self.values, self.diagnostics)
    }
}

/// Evaluates pair grids on a shared worker pool
pub struct KernelGridBuilder<'a> {
    pool: &'a ThreadPool,
    tolerance: QuadTolerance,
}

impl<'a> KernelGridBuilder<'a> {
    pub fn new(pool: &'a ThreadPool, tolerance: QuadTolerance) -> Self {
        Self { pool, tolerance }
    }

    /// Integrate every node of `axes` for the pair (first, second).
    ///
    /// Blocks until every node is done. Any node that fails aborts the
    /// whole grid with a [`KernelError::WorkerFailure`] naming the node.
    pub fn build(
        &self,
        pair: (usize, usize),
        first: &TaskDescriptor,
        second: &TaskDescriptor,
        axes: GridAxes,
    ) -> Result<PairGrid, KernelError> {
        let conv = ConvolutionIntegrator::new(
            first.smoothness,
            second.smoothness,
            self.tolerance,
        );
        let nodes = axes.nodes();
        let start = Instant::now();

        let estimates = try_par_map(self.pool, &nodes, |&(lag, l2, l1)| {
            conv.integrate(lag, l1, l2).map_err(|e| {
                KernelError::WorkerFailure {
                    pair,
                    lag,
                    l1,
                    l2,
                    source: Box::new(e),
                }
            })
        })?;

        let n_unconverged = estimates.iter().filter(|q| !q.converged).count();
        let (values, abs_errs): (Vec<f64>, Vec<f64>) =
            estimates.iter().map(|q| (q.value, q.abs_err)).unzip();
        let diagnostics = GridDiagnostics::from_errors(&abs_errs, n_unconverged);

        debug!(
            "built grid for pair {:?} ({} x {}) with {} nodes in {:?}: {:?}",
            pair,
            first.smoothness,
            second.smoothness,
            nodes.len(),
            start.elapsed(),
            diagnostics
        );
        if n_unconverged > 0 {
            warn!(
                "{} of {} quadratures for pair {:?} did not converge \
                 (max abs err {:e})",
                n_unconverged,
                nodes.len(),
                pair,
                diagnostics.max_abs_err
            );
        }

        Ok(PairGrid {
            pair,
            axes,
            values,
            abs_errs,
            diagnostics,
        })
    }
}
