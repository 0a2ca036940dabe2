use super::{
    lag_matrices, GridAxes, GridDiagnostics, InterpolatedKernel, KernelError,
    KernelGridBuilder, OrientedKernel,
};
use crate::config::KernelConfig;
use crate::misc::build_pool;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::time::Instant;

/// A callable joint covariance over several tasks
///
/// `params` has one row per task holding (amplitude, length scale).
pub trait MultiTaskCovariance {
    /// Number of tasks
    fn n_tasks(&self) -> usize;

    /// Total number of observations over all tasks
    fn n_observations(&self) -> usize;

    /// The joint covariance matrix at the given parameters
    fn covariance(
        &self,
        params: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError>;
}

/// Multi-task convolved-Matérn covariance with precomputed pair kernels
///
/// Construction integrates one grid per unordered task pair and is the
/// expensive step. Afterwards the kernel is immutable, and
/// [`covariance`](MultiTaskCovariance::covariance) only interpolates.
///
/// # Example
///
/// ```
/// use mtgp::prelude::*;
/// use nalgebra::{DMatrix, DVector};
///
/// let config = KernelConfig::new(
///     vec![
///         TaskDescriptor::squared_exponential(0.5, 2.0),
///         TaskDescriptor::squared_exponential(0.5, 2.0),
///     ],
///     11,
/// );
/// let data = vec![
///     DVector::from_vec(vec![0.0, 1.0, 2.0]),
///     DVector::from_vec(vec![0.5, 1.5]),
/// ];
///
/// let kernel = MultiTaskKernel::new(data, config).unwrap();
/// // Rows of (amplitude, length scale); 1.1 is a grid node
/// let params = DMatrix::from_row_slice(2, 2, &[1.0, 1.1, 2.0, 1.1]);
/// let cov = kernel.covariance(&params).unwrap();
///
/// assert_eq!(cov.shape(), (5, 5));
/// assert!((cov[(4, 4)] - 4.0).abs() < 1E-6);
/// ```
#[derive(Clone, Debug)]
pub struct MultiTaskKernel {
    config: KernelConfig,
    data: Vec<DVector<f64>>,
    /// Row offset of each task's block; the last entry is the total size
    offsets: Vec<usize>,
    /// Kernels of the pairs (i, j) with i ≤ j
    kernels: BTreeMap<(usize, usize), InterpolatedKernel>,
    lags: BTreeMap<(usize, usize), DMatrix<f64>>,
}

impl MultiTaskKernel {
    /// Precompute every pair kernel for the observation points `data`, one
    /// vector per task.
    pub fn new(
        data: Vec<DVector<f64>>,
        config: KernelConfig,
    ) -> Result<Self, KernelError> {
        if data.len() != config.n_tasks() {
            return Err(KernelError::ConfigurationMismatch {
                what: "data arrays",
                expected: config.n_tasks(),
                given: data.len(),
            });
        }
        config.validate()?;

        let n_tasks = config.n_tasks();
        let n_pairs = n_tasks * (n_tasks + 1) / 2;
        info!(
            "building {} pair grids for {} tasks with {} points per axis",
            n_pairs,
            n_tasks,
            config.n_points
        );
        let start = Instant::now();

        let pool = build_pool(config.n_threads)?;
        let builder = KernelGridBuilder::new(&pool, config.tolerance);

        let mut kernels = BTreeMap::new();
        for (i, first) in config.tasks.iter().enumerate() {
            for (j, second) in config.tasks.iter().enumerate().skip(i) {
                let axes = GridAxes::for_pair(first, second, config.n_points)?;
                let grid = builder.build((i, j), first, second, axes)?;

                if let Some(threshold) = config.max_quad_error {
                    let max_abs_err = grid.diagnostics().max_abs_err;
                    if max_abs_err > threshold {
                        warn!(
                            "pair ({}, {}) quadrature error {:e} exceeds {:e}",
                            i, j, max_abs_err, threshold
                        );
                        return Err(KernelError::QuadratureImprecision {
                            pair: (i, j),
                            max_abs_err,
                            threshold,
                        });
                    }
                }
                kernels.insert((i, j), InterpolatedKernel::from_grid(grid)?);
            }
        }

        let lags = lag_matrices(&data);
        let offsets = std::iter::once(0)
            .chain(data.iter().scan(0, |acc, x| {
                *acc += x.len();
                Some(*acc)
            }))
            .collect();

        info!(
            "built {} pair grids in {:?}",
            kernels.len(),
            start.elapsed()
        );

        Ok(Self {
            config,
            data,
            offsets,
            kernels,
            lags,
        })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Observation points of every task
    pub fn data(&self) -> &[DVector<f64>] {
        &self.data
    }

    /// Lag matrix of the ordered pair (i, j)
    pub fn lag_matrix(&self, i: usize, j: usize) -> Option<&DMatrix<f64>> {
        self.lags.get(&(i, j))
    }

    /// The pair kernel viewed from (i, j), for either order of i and j
    pub fn kernel(&self, i: usize, j: usize) -> Option<OrientedKernel<'_>> {
        if i <= j {
            self.kernels.get(&(i, j)).map(|k| k.oriented(false))
        } else {
            self.kernels.get(&(j, i)).map(|k| k.oriented(true))
        }
    }

    /// Quadrature diagnostics of the grid shared by (i, j) and (j, i)
    pub fn diagnostics(&self, i: usize, j: usize) -> Option<&GridDiagnostics> {
        self.kernels
            .get(&(i.min(j), i.max(j)))
            .map(InterpolatedKernel::diagnostics)
    }

    fn check_params(&self, params: &DMatrix<f64>) -> Result<(), KernelError> {
        if params.nrows() != self.n_tasks() {
            return Err(KernelError::ConfigurationMismatch {
                what: "parameter rows",
                expected: self.n_tasks(),
                given: params.nrows(),
            });
        }
        if params.ncols() != 2 {
            return Err(KernelError::ConfigurationMismatch {
                what: "parameter columns",
                expected: 2,
                given: params.ncols(),
            });
        }
        Ok(())
    }

    fn check_task(&self, task: usize) -> Result<(), KernelError> {
        if task < self.n_tasks() {
            Ok(())
        } else {
            Err(KernelError::ConfigurationMismatch {
                what: "tasks",
                expected: self.n_tasks(),
                given: task + 1,
            })
        }
    }

    /// Block (i, j) of the joint covariance: Cov(f_i(x_i), f_j(x_j))
    pub fn block(
        &self,
        i: usize,
        j: usize,
        params: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        self.check_params(params)?;
        self.check_task(i)?;
        self.check_task(j)?;
        self.pair_block(i, j, params)
    }

    /// Block (i, j) for task indices and parameters already checked
    fn pair_block(
        &self,
        i: usize,
        j: usize,
        params: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        let kernel = self
            .kernel(i, j)
            .ok_or(KernelError::MissingPair((i.min(j), i.max(j))))?;
        let lags = self
            .lags
            .get(&(i, j))
            .ok_or(KernelError::MissingPair((i, j)))?;

        let scale = params[(i, 0)] * params[(j, 0)];
        let profile = kernel.profile(params[(i, 1)], params[(j, 1)]);
        if i != j {
            return Ok(lags.map(|lag| scale * profile.eval(lag)));
        }

        // The grid is only even in lag up to quadrature noise; evaluate the
        // upper triangle and mirror it
        let n = lags.nrows();
        let mut block = DMatrix::zeros(n, n);
        for a in 0..n {
            for b in a..n {
                let k = scale * profile.eval(lags[(a, b)]);
                block[(a, b)] = k;
                block[(b, a)] = k;
            }
        }
        Ok(block)
    }
}

impl MultiTaskCovariance for MultiTaskKernel {
    fn n_tasks(&self) -> usize {
        self.config.n_tasks()
    }

    fn n_observations(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Blocks with i ≤ j are interpolated and the lower blocks mirrored, so
    /// the result is exactly symmetric.
    fn covariance(
        &self,
        params: &DMatrix<f64>,
    ) -> Result<DMatrix<f64>, KernelError> {
        self.check_params(params)?;

        let n = self.n_observations();
        let mut cov = DMatrix::zeros(n, n);
        for i in 0..self.n_tasks() {
            for j in i..self.n_tasks() {
                let block = self.pair_block(i, j, params)?;
                let (r, c) = (self.offsets[i], self.offsets[j]);
                let shape = block.shape();
                cov.view_mut((r, c), shape).copy_from(&block);
                if i != j {
                    cov.view_mut((c, r), (shape.1, shape.0))
                        .copy_from(&block.transpose());
                }
            }
        }
        Ok(cov)
    }
}
